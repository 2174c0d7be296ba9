//! Dimension validation shared by Add and Update (C8). Every path that can
//! change a document's dimension map funnels through here so the invariants
//! in the spec's data model -- enumerated values in range, hierarchical
//! references resolving to a real document, no cycles -- are enforced in
//! exactly one place.

use uuid::Uuid;

use crate::core::config::{Config, DimensionKind};
use crate::core::error::{Error, Result};
use crate::core::types::{Document, DimensionMap, DimensionValue};

/// Validate a full or partial dimension map against the schema. `self_uuid`
/// is `None` for Add (the document doesn't exist yet, so it can't be its own
/// ancestor) and `Some(uuid)` for Update (used for the cycle walk).
pub fn validate_patch(
    patch: &DimensionMap,
    config: &Config,
    documents: &[Document],
    self_uuid: Option<Uuid>,
) -> Result<()> {
    for (name, value) in patch {
        let dim = config
            .dimension(name)
            .ok_or_else(|| Error::config(format!("unknown dimension '{}'", name)))?;

        match &dim.kind {
            DimensionKind::Enumerated { values, .. } => {
                let text = value
                    .as_str()
                    .ok_or_else(|| Error::config(format!("dimension '{}' requires a string value", name)))?;
                if !values.iter().any(|v| v == text) {
                    return Err(Error::config(format!(
                        "'{}' is not a valid value for dimension '{}'",
                        text, name
                    )));
                }
            }
            DimensionKind::Hierarchical => {
                let text = value
                    .as_str()
                    .ok_or_else(|| Error::config(format!("dimension '{}' requires a string value", name)))?;
                validate_parent(text, name, documents, self_uuid)?;
            }
        }
    }
    Ok(())
}

fn validate_parent(parent: &str, ref_field: &str, documents: &[Document], self_uuid: Option<Uuid>) -> Result<()> {
    if parent.is_empty() {
        return Ok(());
    }

    let parent_uuid = Uuid::parse_str(parent)
        .map_err(|_| Error::not_found(format!("'{}' under '{}' is not a valid document reference", parent, ref_field)))?;

    if !documents.iter().any(|d| d.uuid == parent_uuid) {
        return Err(Error::not_found(format!(
            "'{}' under '{}' does not reference an existing document",
            parent, ref_field
        )));
    }

    if let Some(self_uuid) = self_uuid {
        if parent_uuid == self_uuid {
            return Err(Error::conflict(format!("document '{}' cannot be its own parent", self_uuid)));
        }
        if walks_to(parent_uuid, self_uuid, documents, ref_field) {
            return Err(Error::conflict(format!(
                "setting '{}' to '{}' would make '{}' its own ancestor",
                ref_field, parent, self_uuid
            )));
        }
    }

    Ok(())
}

/// Walk from `start` up through `ref_field` ancestors; true if `target` is
/// among them. O(depth) by design -- no graph library needed for a simple
/// parent-pointer chain.
fn walks_to(start: Uuid, target: Uuid, documents: &[Document], ref_field: &str) -> bool {
    let mut current = start;
    let mut steps = 0;
    loop {
        if current == target {
            return true;
        }
        steps += 1;
        if steps > documents.len() {
            // A cycle already exists among *other* documents; don't spin
            // forever chasing it. That corruption isn't this call's to fix.
            return false;
        }
        let doc = match documents.iter().find(|d| d.uuid == current) {
            Some(doc) => doc,
            None => return false,
        };
        let next = match doc.dimension(ref_field).and_then(DimensionValue::as_str) {
            Some(s) if !s.is_empty() => s,
            _ => return false,
        };
        current = match Uuid::parse_str(next) {
            Ok(u) => u,
            Err(_) => return false,
        };
    }
}

/// Fill in defaults for every enumerated dimension the caller didn't supply.
/// Only used by Add -- Update treats a missing patch key as "leave alone",
/// not "reset to default".
pub fn fill_defaults(mut dimensions: DimensionMap, config: &Config) -> DimensionMap {
    for dim in config.enumerated_dimensions() {
        if dimensions.contains_key(&dim.name) {
            continue;
        }
        if let DimensionKind::Enumerated { default: Some(default), .. } = &dim.kind {
            dimensions.insert(dim.name.clone(), DimensionValue::Text(default.clone()));
        }
    }
    dimensions
}
