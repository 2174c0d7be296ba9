use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::types::{Document, UpdateRequest};
use crate::id::prefix_table::PrefixTable;
use crate::id::resolver;
use crate::mutation::validate;

/// Apply an update request to the document `id` resolves to (short ID or
/// UUID, see [`resolver::resolve_id`]). Unset fields are preserved; an
/// entirely-empty request is a valid no-op that still bumps `updated_at`.
/// An unknown dimension or out-of-range value in the patch rejects the
/// whole update -- nothing is applied.
pub fn update(documents: &mut Vec<Document>, config: &Config, prefixes: &PrefixTable, id: &str, request: UpdateRequest) -> Result<Document> {
    let uuid = resolver::resolve_id(id, documents, config, prefixes)?;

    if let Some(patch) = &request.dimensions {
        validate::validate_patch(patch, config, documents, Some(uuid))?;
    }

    let doc = documents
        .iter_mut()
        .find(|d| d.uuid == uuid)
        .ok_or_else(|| Error::not_found(format!("uuid '{}' does not exist", uuid)))?;

    if let Some(title) = request.title {
        doc.title = title;
    }
    if let Some(body) = request.body {
        doc.body = body;
    }
    if let Some(patch) = request.dimensions {
        doc.dimensions.extend(patch);
    }
    doc.touch();

    Ok(doc.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Dimension;
    use crate::id::prefix_table::PrefixTable;
    use crate::mutation::add::add;

    fn config() -> Config {
        Config::new("unused").with_dimension(
            Dimension::enumerated("status", vec!["pending".into(), "completed".into()])
                .with_default("pending")
                .with_prefix("completed", 'c'),
        )
    }

    #[test]
    fn empty_update_is_a_noop_that_still_touches() {
        let config = config();
        let prefixes = PrefixTable::build(&config).unwrap();
        let mut docs = Vec::new();
        let doc = add(&mut docs, &config, "Task".into(), "".into(), Default::default()).unwrap();
        let before = doc.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(2));
        let updated = update(&mut docs, &config, &prefixes, &doc.uuid.to_string(), UpdateRequest::new()).unwrap();
        assert_eq!(updated.title, "Task");
        assert!(updated.updated_at >= before);
    }

    #[test]
    fn atomic_rejection_leaves_document_untouched() {
        let config = config();
        let prefixes = PrefixTable::build(&config).unwrap();
        let mut docs = Vec::new();
        let doc = add(&mut docs, &config, "Task".into(), "".into(), Default::default()).unwrap();
        let bad = UpdateRequest::new().with_dimension("status", "archived");
        assert!(update(&mut docs, &config, &prefixes, &doc.uuid.to_string(), bad).is_err());
        assert_eq!(docs[0].dimension("status").and_then(|v| v.as_str()), Some("pending"));
    }
}
