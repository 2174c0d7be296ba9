//! The Mutation Engine (C8): Add/Update/Delete plus their bulk variants.
//! Every path here goes through [`validate`] for dimension invariants, and
//! every bulk variant funnels single-document changes through the same
//! `apply_to_uuids`/`delete_uuids` helpers so there is exactly one place
//! that applies a patch or removes a subtree.

pub mod add;
pub mod bulk;
pub mod delete;
pub mod update;
pub mod validate;
pub mod where_ast;
