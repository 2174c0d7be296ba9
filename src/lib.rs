//! An embedded document store whose defining feature is dynamic,
//! query-context-dependent identifiers: callers address documents by short,
//! human-friendly strings (`1`, `1.2`, `h2.1`, ...) that are never stored --
//! they're derived at list time from each document's durable UUID and its
//! placement within a hierarchical/categorical dimension schema. The same
//! document can be `1.2` in one view and `d1.c1` in another.
//!
//! [`core::store::Store`] is the facade everything else hangs off of:
//! [`core::config`] validates the dimension schema once at construction,
//! [`id`] generates and resolves the short IDs, [`query`] filters/orders/
//! paginates, [`mutation`] is Add/Update/Delete and their bulk variants,
//! [`storage`] is the single-file JSON persistence layer with cross-process
//! exclusion, and [`importexport`]/[`typed`] are the two external-facing
//! boundaries (archive packaging, and a tag-driven struct projection).

pub mod core;
pub mod id;
pub mod importexport;
pub mod mutation;
pub mod query;
pub mod storage;
pub mod typed;

pub use core::config::{Config, Dimension, DimensionKind};
pub use core::error::{Error, ErrorKind, Result};
pub use core::store::Store;
pub use core::types::{Document, DimensionMap, DimensionValue, UpdateRequest};
pub use importexport::formats::ExportFormat;
pub use mutation::where_ast::WhereExpr;
pub use query::filter::{ListQuery, OrderClause};
