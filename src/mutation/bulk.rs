use std::collections::HashSet;

use uuid::Uuid;

use crate::core::config::{Config, DimensionKind};
use crate::core::error::{Error, Result};
use crate::core::types::{Document, DimensionValue, UpdateRequest};
use crate::id::prefix_table::PrefixTable;
use crate::id::resolver;
use crate::mutation::delete::delete_uuids;
use crate::mutation::validate;
use crate::mutation::where_ast::{self, WhereExpr};

fn effective(doc: &Document, config: &Config, dim_name: &str) -> String {
    doc.dimension(dim_name)
        .and_then(DimensionValue::as_str)
        .map(|s| s.to_string())
        .unwrap_or_else(|| match config.dimension(dim_name).map(|d| &d.kind) {
            Some(DimensionKind::Enumerated { default, .. }) => default.clone().unwrap_or_default(),
            _ => String::new(),
        })
}

fn check_dimension_value(config: &Config, dimension: &str, value: &str) -> Result<()> {
    match config.dimension(dimension) {
        None => Err(Error::config(format!("unknown dimension '{}'", dimension))),
        Some(dim) => match &dim.kind {
            DimensionKind::Enumerated { values, .. } => {
                if values.iter().any(|v| v == value) {
                    Ok(())
                } else {
                    Err(Error::config(format!("'{}' is not a valid value for dimension '{}'", value, dimension)))
                }
            }
            DimensionKind::Hierarchical => Ok(()),
        },
    }
}

/// Apply `request` to every document whose `dimension` currently equals
/// `value` (default-aware). Returns the number of documents changed.
pub fn update_by_dimension(documents: &mut Vec<Document>, config: &Config, dimension: &str, value: &str, request: UpdateRequest) -> Result<usize> {
    check_dimension_value(config, dimension, value)?;
    let targets: Vec<Uuid> = documents
        .iter()
        .filter(|d| effective(d, config, dimension) == value)
        .map(|d| d.uuid)
        .collect();
    apply_to_uuids(documents, config, &targets, request)
}

pub fn delete_by_dimension(documents: &mut Vec<Document>, config: &Config, dimension: &str, value: &str, cascade: bool) -> Result<usize> {
    check_dimension_value(config, dimension, value)?;
    let targets: Vec<Uuid> = documents
        .iter()
        .filter(|d| effective(d, config, dimension) == value)
        .map(|d| d.uuid)
        .collect();
    delete_uuids(documents, config, &targets, cascade)
}

/// Apply `request` to exactly the given UUIDs. Callers performing a batch
/// operation must resolve any short IDs to UUIDs *before* this call --
/// resolving one-by-one interleaved with mutation would be incorrect
/// because a mutation can renumber the very IDs not yet resolved.
pub fn update_by_uuids(documents: &mut Vec<Document>, config: &Config, _prefixes: &PrefixTable, uuids: &[Uuid], request: UpdateRequest) -> Result<usize> {
    apply_to_uuids(documents, config, uuids, request)
}

pub fn delete_by_uuids(documents: &mut Vec<Document>, config: &Config, _prefixes: &PrefixTable, uuids: &[Uuid], cascade: bool) -> Result<usize> {
    delete_uuids(documents, config, uuids, cascade)
}

fn apply_to_uuids(documents: &mut Vec<Document>, config: &Config, uuids: &[Uuid], request: UpdateRequest) -> Result<usize> {
    if let Some(patch) = &request.dimensions {
        for uuid in uuids {
            validate::validate_patch(patch, config, documents, Some(*uuid))?;
        }
    }

    let targets: HashSet<Uuid> = uuids.iter().copied().collect();
    let mut count = 0;
    for doc in documents.iter_mut() {
        if !targets.contains(&doc.uuid) {
            continue;
        }
        if let Some(title) = &request.title {
            doc.title = title.clone();
        }
        if let Some(body) = &request.body {
            doc.body = body.clone();
        }
        if let Some(patch) = &request.dimensions {
            doc.dimensions.extend(patch.clone());
        }
        doc.touch();
        count += 1;
    }
    Ok(count)
}

fn matching_uuids(documents: &[Document], config: &Config, expr: &WhereExpr, params: &[String]) -> Result<Vec<Uuid>> {
    where_ast::validate(expr, config, params.len())?;
    Ok(documents
        .iter()
        .filter(|d| where_ast::eval(expr, d, config, params))
        .map(|d| d.uuid)
        .collect())
}

pub fn update_where(documents: &mut Vec<Document>, config: &Config, expr: &WhereExpr, params: &[String], request: UpdateRequest) -> Result<usize> {
    let targets = matching_uuids(documents, config, expr, params)?;
    apply_to_uuids(documents, config, &targets, request)
}

pub fn delete_where(documents: &mut Vec<Document>, config: &Config, _prefixes: &PrefixTable, expr: &WhereExpr, params: &[String], cascade: bool) -> Result<usize> {
    let targets = matching_uuids(documents, config, expr, params)?;
    delete_uuids(documents, config, &targets, cascade)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Dimension;
    use crate::mutation::add::add;
    use crate::mutation::where_ast::parse;

    fn config() -> Config {
        Config::new("unused").with_dimension(
            Dimension::enumerated("status", vec!["pending".into(), "completed".into()])
                .with_default("pending")
                .with_prefix("completed", 'c'),
        )
    }

    #[test]
    fn update_by_uuids_matches_scenario_5() {
        let config = config();
        let prefixes = PrefixTable::build(&config).unwrap();
        let mut docs = Vec::new();
        let u1 = add(&mut docs, &config, "1".into(), "".into(), Default::default()).unwrap();
        add(&mut docs, &config, "2".into(), "".into(), Default::default()).unwrap();
        let u3 = add(&mut docs, &config, "3".into(), "".into(), Default::default()).unwrap();

        let request = UpdateRequest::new().with_dimension("status", "completed");
        let count = update_by_uuids(&mut docs, &config, &prefixes, &[u1.uuid, u3.uuid], request).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn delete_where_removes_matching_documents() {
        let config = config();
        let prefixes = PrefixTable::build(&config).unwrap();
        let mut docs = Vec::new();
        add(&mut docs, &config, "Keep".into(), "".into(), Default::default()).unwrap();
        let mut completed = std::collections::BTreeMap::new();
        completed.insert("status".to_string(), "completed".into());
        add(&mut docs, &config, "Drop".into(), "".into(), completed).unwrap();

        let expr = parse("status = ?").unwrap();
        let removed = delete_where(&mut docs, &config, &prefixes, &expr, &["completed".to_string()], false).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "Keep");
    }
}
