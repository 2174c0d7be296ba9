use std::collections::BTreeMap;

/// One `ORDER BY` clause: a column name (a dimension name, `uuid`, `title`,
/// `created_at`, `updated_at`, or `simple_id`) plus direction.
#[derive(Debug, Clone)]
pub struct OrderClause {
    pub column: String,
    pub descending: bool,
}

impl OrderClause {
    pub fn asc(column: impl Into<String>) -> Self {
        OrderClause { column: column.into(), descending: false }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        OrderClause { column: column.into(), descending: true }
    }
}

/// The parameters of a List call: equality filters (ANDed), an optional
/// substring search over title/body, ordering, and pagination.
///
/// Filter keys are dimension names, `uuid`, or the hierarchical ref field
/// name (an empty-string value there selects root documents).
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub filters: BTreeMap<String, String>,
    pub search: Option<String>,
    pub order_by: Vec<OrderClause>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(query.into());
        self
    }

    pub fn with_order(mut self, clause: OrderClause) -> Self {
        self.order_by.push(clause);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}
