use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::types::{Document, DimensionMap};
use crate::mutation::validate;

/// Add a new document: generate its UUID, fill missing enumerated
/// dimensions with their configured defaults, validate the result, stamp
/// timestamps, and append it to the snapshot.
pub fn add(documents: &mut Vec<Document>, config: &Config, title: String, body: String, dimensions: DimensionMap) -> Result<Document> {
    let dimensions = validate::fill_defaults(dimensions, config);
    validate::validate_patch(&dimensions, config, documents, None)?;

    let mut doc = Document::new(title);
    doc.body = body;
    doc.dimensions = dimensions;
    documents.push(doc.clone());
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Dimension;

    fn config() -> Config {
        Config::new("unused")
            .with_dimension(
                Dimension::enumerated("status", vec!["pending".into(), "completed".into()]).with_default("pending"),
            )
            .with_dimension(Dimension::hierarchical("parent_id"))
    }

    #[test]
    fn fills_default_status() {
        let config = config();
        let mut docs = Vec::new();
        let doc = add(&mut docs, &config, "Buy milk".into(), "".into(), DimensionMap::new()).unwrap();
        assert_eq!(doc.dimension("status").and_then(|v| v.as_str()), Some("pending"));
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn rejects_unknown_dimension() {
        let config = config();
        let mut docs = Vec::new();
        let mut dims = DimensionMap::new();
        dims.insert("nope".into(), "x".into());
        assert!(add(&mut docs, &config, "x".into(), "".into(), dims).is_err());
    }

    #[test]
    fn rejects_out_of_range_value() {
        let config = config();
        let mut docs = Vec::new();
        let mut dims = DimensionMap::new();
        dims.insert("status".into(), "archived".into());
        assert!(add(&mut docs, &config, "x".into(), "".into(), dims).is_err());
    }

    #[test]
    fn rejects_dangling_parent() {
        let config = config();
        let mut docs = Vec::new();
        let mut dims = DimensionMap::new();
        dims.insert("parent_id".into(), uuid::Uuid::new_v4().to_string().into());
        assert!(add(&mut docs, &config, "x".into(), "".into(), dims).is_err());
    }
}
