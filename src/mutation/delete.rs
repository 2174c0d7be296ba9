use std::collections::HashSet;

use uuid::Uuid;

use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::types::{Document, DimensionValue};
use crate::id::prefix_table::PrefixTable;
use crate::id::resolver;

/// Delete the document `id` resolves to. Without `cascade`, fails with
/// `Conflict` if it has children and leaves the snapshot unchanged; with
/// `cascade`, the whole subtree is removed in this one call.
pub fn delete(documents: &mut Vec<Document>, config: &Config, prefixes: &PrefixTable, id: &str, cascade: bool) -> Result<Uuid> {
    let uuid = resolver::resolve_id(id, documents, config, prefixes)?;
    delete_uuids(documents, config, &[uuid], cascade)?;
    Ok(uuid)
}

/// Shared by [`delete`] and the bulk delete variants: remove every document
/// in `roots`, plus (if `cascade`) their full descendant subtrees, in a
/// single pass over the snapshot.
pub fn delete_uuids(documents: &mut Vec<Document>, config: &Config, roots: &[Uuid], cascade: bool) -> Result<usize> {
    let Some(ref_field) = config.ref_field() else {
        let before = documents.len();
        documents.retain(|d| !roots.contains(&d.uuid));
        return Ok(before - documents.len());
    };

    let to_remove = if cascade {
        collect_subtrees(documents, ref_field, roots)
    } else {
        let roots_set: HashSet<Uuid> = roots.iter().copied().collect();
        for doc in documents.iter() {
            if let Some(parent) = doc.dimension(ref_field).and_then(DimensionValue::as_str) {
                if let Ok(parent_uuid) = Uuid::parse_str(parent) {
                    if roots_set.contains(&parent_uuid) && !roots_set.contains(&doc.uuid) {
                        tracing::debug!(parent = %parent_uuid, "non-cascading delete refused: parent has children");
                        return Err(Error::conflict(format!(
                            "document '{}' has children; pass cascade=true to remove the subtree",
                            parent_uuid
                        )));
                    }
                }
            }
        }
        roots_set
    };

    let before = documents.len();
    documents.retain(|d| !to_remove.contains(&d.uuid));
    Ok(before - documents.len())
}

fn collect_subtrees(documents: &[Document], ref_field: &str, roots: &[Uuid]) -> HashSet<Uuid> {
    let mut result: HashSet<Uuid> = roots.iter().copied().collect();
    loop {
        let mut grew = false;
        for doc in documents {
            if result.contains(&doc.uuid) {
                continue;
            }
            if let Some(parent) = doc.dimension(ref_field).and_then(DimensionValue::as_str) {
                if let Ok(parent_uuid) = Uuid::parse_str(parent) {
                    if result.contains(&parent_uuid) {
                        result.insert(doc.uuid);
                        grew = true;
                    }
                }
            }
        }
        if !grew {
            break;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Dimension;
    use crate::core::types::UpdateRequest;
    use crate::id::prefix_table::PrefixTable;
    use crate::mutation::add::add;
    use crate::mutation::update::update;

    fn config() -> Config {
        Config::new("unused").with_dimension(Dimension::hierarchical("parent_id"))
    }

    #[test]
    fn non_cascading_delete_fails_on_non_empty_parent() {
        let config = config();
        let prefixes = PrefixTable::build(&config).unwrap();
        let mut docs = Vec::new();
        let parent = add(&mut docs, &config, "A".into(), "".into(), Default::default()).unwrap();
        add(
            &mut docs,
            &config,
            "A/X".into(),
            "".into(),
            [("parent_id".to_string(), parent.uuid.to_string().into())].into_iter().collect(),
        )
        .unwrap();

        let before = docs.clone();
        let err = delete(&mut docs, &config, &prefixes, &parent.uuid.to_string(), false).unwrap_err();
        assert!(matches!(err.kind, crate::core::error::ErrorKind::Conflict));
        assert_eq!(docs.len(), before.len());
    }

    #[test]
    fn cascade_removes_whole_subtree() {
        let config = config();
        let prefixes = PrefixTable::build(&config).unwrap();
        let mut docs = Vec::new();
        let parent = add(&mut docs, &config, "A".into(), "".into(), Default::default()).unwrap();
        let child = add(
            &mut docs,
            &config,
            "A/X".into(),
            "".into(),
            [("parent_id".to_string(), parent.uuid.to_string().into())].into_iter().collect(),
        )
        .unwrap();
        add(
            &mut docs,
            &config,
            "A/X/Y".into(),
            "".into(),
            [("parent_id".to_string(), child.uuid.to_string().into())].into_iter().collect(),
        )
        .unwrap();

        let removed = delete(&mut docs, &config, &prefixes, &parent.uuid.to_string(), true).unwrap();
        assert_eq!(removed, parent.uuid);
        assert!(docs.is_empty());
    }

    #[test]
    fn reparenting_rejects_self_cycle() {
        let config = config();
        let prefixes = PrefixTable::build(&config).unwrap();
        let mut docs = Vec::new();
        let a = add(&mut docs, &config, "A".into(), "".into(), Default::default()).unwrap();
        let req = UpdateRequest::new().with_dimension("parent_id", a.uuid.to_string());
        assert!(update(&mut docs, &config, &prefixes, &a.uuid.to_string(), req).is_err());
    }
}
