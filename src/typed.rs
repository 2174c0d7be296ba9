//! The Typed Mapping Facade (C10): a tag-driven projection between a
//! caller's own record type and the dimension map, plus a small query
//! builder that compiles typed constraints into the Query Engine's filter
//! map. This layer carries no state of its own and never bypasses
//! validation -- `marshal` only produces a [`DimensionMap`]; it's still
//! [`Store::add`](crate::core::store::Store::add) / `update` that enforces
//! the schema.

use crate::core::types::{DimensionMap, Document};
use crate::query::filter::ListQuery;

/// One tagged field: which struct field it is, which dimension it maps to,
/// its declared default (used to elide it on marshal and to fill it on
/// unmarshal), and whether it's the hierarchical reference.
#[derive(Debug, Clone, Copy)]
pub struct DimensionField {
    pub field_name: &'static str,
    pub dimension: &'static str,
    pub default: Option<&'static str>,
    pub is_ref: bool,
}

impl DimensionField {
    pub const fn new(field_name: &'static str, dimension: &'static str) -> Self {
        DimensionField { field_name, dimension, default: None, is_ref: false }
    }

    pub const fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn as_ref_field(mut self) -> Self {
        self.is_ref = true;
        self
    }
}

/// Implemented by a caller's own record type. `FIELDS` is the tag table
/// (conventionally built once as a `const`); `get_field`/`set_field` move a
/// single field in and out of its string representation so `marshal`/
/// `unmarshal` stay generic over any record shape without reflection.
pub trait Projection: Sized {
    const FIELDS: &'static [DimensionField];

    fn get_field(&self, field_name: &str) -> Option<String>;
    fn set_field(&mut self, field_name: &str, value: Option<String>);
    fn blank() -> Self;
}

/// Record -> dimension-patch map, omitting any field that's still at its
/// declared default.
pub fn marshal<T: Projection>(record: &T) -> DimensionMap {
    let mut map = DimensionMap::new();
    for field in T::FIELDS {
        if let Some(value) = record.get_field(field.field_name) {
            if Some(value.as_str()) != field.default {
                map.insert(field.dimension.to_string(), value.into());
            }
        }
    }
    map
}

/// Document -> record, filling any dimension the document doesn't carry
/// from the field's declared default.
pub fn unmarshal<T: Projection>(doc: &Document) -> T {
    let mut record = T::blank();
    for field in T::FIELDS {
        let value = doc
            .dimension(field.dimension)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .or_else(|| field.default.map(|d| d.to_string()));
        record.set_field(field.field_name, value);
    }
    record
}

/// A small builder that compiles typed field/value constraints into a
/// [`ListQuery`], looking up each field's dimension name from `T::FIELDS`
/// so callers never have to spell out the underlying dimension names.
pub struct TypedQuery<T: Projection> {
    query: ListQuery,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Projection> TypedQuery<T> {
    pub fn new() -> Self {
        TypedQuery { query: ListQuery::new(), _marker: std::marker::PhantomData }
    }

    /// Filter by a tagged field's name. A field name not present in
    /// `T::FIELDS` is silently ignored -- this mirrors a typo in a
    /// hand-written struct literal, not a runtime condition worth a panic.
    pub fn eq(mut self, field_name: &str, value: impl Into<String>) -> Self {
        if let Some(field) = T::FIELDS.iter().find(|f| f.field_name == field_name) {
            self.query = self.query.with_filter(field.dimension, value.into());
        }
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.query = self.query.with_search(text);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query = self.query.with_limit(limit);
        self
    }

    pub fn build(self) -> ListQuery {
        self.query
    }
}

impl<T: Projection> Default for TypedQuery<T> {
    fn default() -> Self {
        Self::new()
    }
}
