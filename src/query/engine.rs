use std::cmp::Ordering;

use uuid::Uuid;

use crate::core::config::{Config, DimensionKind};
use crate::core::error::{Error, Result};
use crate::core::types::Document;
use crate::id::generator::{self, Canonicalization};
use crate::id::prefix_table::PrefixTable;
use crate::query::filter::ListQuery;

/// A document as returned from List: the record plus the short ID it
/// currently resolves to.
#[derive(Debug, Clone)]
pub struct ListedDocument {
    pub document: Document,
    pub simple_id: String,
}

/// Run a List query against a snapshot. `documents` must be the *full*
/// snapshot -- short IDs are always computed against it, then filtering,
/// ordering, and pagination are applied on top; numbering a pre-filtered
/// subset would make hierarchical IDs incoherent (see `id::generator`).
pub fn list(documents: &[Document], config: &Config, prefixes: &PrefixTable, query: &ListQuery) -> Result<Vec<ListedDocument>> {
    validate_filters(config, query)?;

    let canon = generator::canonicalize(documents, config, prefixes);

    let mut matched: Vec<&Document> = documents
        .iter()
        .filter(|doc| matches_filters(doc, config, &query.filters) && matches_search(doc, &query.search))
        .collect();

    // An empty order-by still needs a deterministic, canonical result order
    // -- snapshot (insertion) order carries no meaning per the spec's data
    // model, so "no ORDER BY" means "by simple_id", not "whatever order the
    // file happened to hold documents in". Any explicit order-by clauses
    // take precedence; canonical rank is always the final tiebreaker.
    matched.sort_by(|a, b| compare(a, b, config, &canon, &query.order_by));

    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(usize::MAX);

    Ok(matched
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|doc| ListedDocument {
            document: doc.clone(),
            simple_id: canon.simple_id(&doc.uuid).unwrap_or_default().to_string(),
        })
        .collect())
}

fn validate_filters(config: &Config, query: &ListQuery) -> Result<()> {
    let ref_field = config.ref_field();
    for (key, value) in &query.filters {
        if key == "uuid" {
            continue;
        }
        if Some(key.as_str()) == ref_field {
            continue;
        }
        match config.dimension(key) {
            None => return Err(Error::config(format!("unknown dimension '{}'", key))),
            Some(dim) => {
                if let DimensionKind::Enumerated { values, .. } = &dim.kind {
                    if !values.contains(value) {
                        return Err(Error::config(format!(
                            "'{}' is not a valid value for dimension '{}'",
                            value, key
                        )));
                    }
                }
            }
        }
    }
    Ok(())
}

fn default_value(config: &Config, dim_name: &str) -> String {
    match config.dimension(dim_name).map(|d| &d.kind) {
        Some(DimensionKind::Enumerated { default, .. }) => default.clone().unwrap_or_default(),
        _ => String::new(),
    }
}

fn effective(doc: &Document, config: &Config, dim_name: &str) -> String {
    doc.dimension(dim_name)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| default_value(config, dim_name))
}

fn matches_filters(doc: &Document, config: &Config, filters: &std::collections::BTreeMap<String, String>) -> bool {
    filters.iter().all(|(key, value)| {
        if key == "uuid" {
            doc.uuid.to_string() == *value
        } else {
            effective(doc, config, key) == *value
        }
    })
}

fn matches_search(doc: &Document, search: &Option<String>) -> bool {
    match search {
        None => true,
        Some(query) => {
            let query = query.to_lowercase();
            doc.title.to_lowercase().contains(&query) || doc.body.to_lowercase().contains(&query)
        }
    }
}

fn compare(
    a: &Document,
    b: &Document,
    config: &Config,
    canon: &Canonicalization,
    order_by: &[crate::query::filter::OrderClause],
) -> Ordering {
    for clause in order_by {
        let ord = compare_column(a, b, config, canon, &clause.column);
        let ord = if clause.descending { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    // Canonical order is always the final tiebreaker -- with no order-by
    // clauses at all this is the entire sort; with clauses that leave ties
    // (e.g. ORDER BY title where two documents share a title) it keeps the
    // result deterministic rather than falling back to snapshot order.
    compare_rank(a.uuid, b.uuid, canon)
}

fn compare_column(a: &Document, b: &Document, config: &Config, canon: &Canonicalization, column: &str) -> Ordering {
    match column {
        "title" => a.title.cmp(&b.title),
        "uuid" => a.uuid.to_string().cmp(&b.uuid.to_string()),
        "created_at" => a.created_at.cmp(&b.created_at),
        "updated_at" => a.updated_at.cmp(&b.updated_at),
        "simple_id" => compare_rank(a.uuid, b.uuid, canon),
        dim => effective(a, config, dim).cmp(&effective(b, config, dim)),
    }
}

fn compare_rank(a: Uuid, b: Uuid, canon: &Canonicalization) -> Ordering {
    match (canon.rank(&a), canon.rank(&b)) {
        (Some(ra), Some(rb)) => ra.cmp(&rb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
