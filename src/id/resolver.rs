use uuid::Uuid;

use crate::core::config::{Config, DimensionKind};
use crate::core::error::{Error, Result};
use crate::core::types::Document;
use crate::id::generator::{build_children, partition_key, sort_siblings, PartitionKey};
use crate::id::prefix_table::PrefixTable;

const ILLEGAL_CHARS: &[char] = &['\'', '"', '`', ';', '\\'];

/// One parsed `<prefix letters><digits>` level of a short ID.
struct ParsedLevel {
    tuple: PartitionKey,
    offset: usize, // 0-based
}

/// Parse and resolve a short ID against a snapshot, returning the UUID it
/// currently denotes. Each level is resolved against the siblings of the
/// previously resolved parent (roots, for the first level), so the whole
/// chain must exist for resolution to succeed.
pub fn resolve_short_id(input: &str, documents: &[Document], config: &Config, prefixes: &PrefixTable) -> Result<Uuid> {
    if input.is_empty() {
        return Err(Error::input("short id is empty"));
    }
    if input.chars().any(|c| ILLEGAL_CHARS.contains(&c)) {
        return Err(Error::input(format!("short id '{}' contains illegal characters", input)));
    }

    let children = build_children(documents, config);
    let mut current_parent: Option<Uuid> = None;
    let mut current: Option<Uuid> = None;

    for level_str in input.split('.') {
        let level = parse_level(level_str, config, prefixes)?;

        let siblings = children.get(&current_parent).cloned().unwrap_or_default();
        let mut matching: Vec<&Document> = siblings
            .into_iter()
            .filter(|doc| partition_key(doc, config) == level.tuple)
            .collect();
        sort_siblings(&mut matching);

        if matching.is_empty() {
            return Err(Error::not_found(format!(
                "short id '{}': no documents in the addressed partition",
                input
            )));
        }
        if level.offset >= matching.len() {
            return Err(Error::not_found(format!(
                "short id '{}': index {} is beyond the partition (size {})",
                input,
                level.offset + 1,
                matching.len()
            )));
        }

        let doc = matching[level.offset];
        current = Some(doc.uuid);
        current_parent = Some(doc.uuid);
    }

    current.ok_or_else(|| Error::input(format!("short id '{}' has no levels", input)))
}

fn parse_level(level_str: &str, config: &Config, prefixes: &PrefixTable) -> Result<ParsedLevel> {
    let split_at = level_str
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| Error::input(format!("short id level '{}' has an empty numeric part", level_str)))?;
    let (letters, digits) = level_str.split_at(split_at);

    if !letters.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(Error::input(format!("short id level '{}' has an invalid prefix", level_str)));
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::input(format!("short id level '{}' has a malformed numeric part", level_str)));
    }

    let n: usize = digits
        .parse()
        .map_err(|_| Error::input(format!("short id level '{}' has an invalid numeric part", level_str)))?;
    if n == 0 {
        return Err(Error::input(format!("short id level '{}' must have a positive index", level_str)));
    }

    let mut dims_seen = std::collections::HashSet::new();
    let mut values: std::collections::HashMap<String, String> = std::collections::HashMap::new();
    let mut letters_seen = std::collections::HashSet::new();

    for letter in letters.chars() {
        if !letters_seen.insert(letter) {
            return Err(Error::input(format!("short id level '{}' repeats prefix letter '{}'", level_str, letter)));
        }
        let (dim, value) = prefixes
            .lookup_letter(letter)
            .ok_or_else(|| Error::input(format!("short id level '{}' uses unknown prefix letter '{}'", level_str, letter)))?;
        if !dims_seen.insert(dim.clone()) {
            return Err(Error::input(format!(
                "short id level '{}' maps two letters onto dimension '{}'",
                level_str, dim
            )));
        }
        values.insert(dim.clone(), value.clone());
    }

    // Fill every remaining enumerated dimension with its default.
    let tuple: PartitionKey = config
        .enumerated_dimensions()
        .map(|dim| {
            let value = values.get(&dim.name).cloned().unwrap_or_else(|| match &dim.kind {
                DimensionKind::Enumerated { default, .. } => default.clone().unwrap_or_default(),
                DimensionKind::Hierarchical => String::new(),
            });
            (dim.name.clone(), value)
        })
        .collect();

    Ok(ParsedLevel { tuple, offset: n - 1 })
}

/// Mixed-acceptance entry point: every API that takes an "id" argument
/// calls this first. A short ID is tried first; on failure, a UUID-shaped
/// string is accepted as-is (existence is still checked by the caller).
pub fn resolve_id(input: &str, documents: &[Document], config: &Config, prefixes: &PrefixTable) -> Result<Uuid> {
    match resolve_short_id(input, documents, config, prefixes) {
        Ok(uuid) => Ok(uuid),
        Err(short_id_err) => {
            if let Ok(uuid) = Uuid::parse_str(input) {
                if documents.iter().any(|d| d.uuid == uuid) {
                    return Ok(uuid);
                }
                return Err(Error::not_found(format!("uuid '{}' does not exist", input)));
            }
            Err(short_id_err)
        }
    }
}

/// Render every document's current short ID (UUID -> short ID), always
/// computed from the full snapshot. Callers must not cache this across
/// writes -- any mutation can renumber it.
pub fn short_ids_for(documents: &[Document], config: &Config, prefixes: &PrefixTable) -> std::collections::HashMap<Uuid, String> {
    let canon = crate::id::generator::canonicalize(documents, config, prefixes);
    documents
        .iter()
        .filter_map(|d| canon.simple_id(&d.uuid).map(|s| (d.uuid, s.to_string())))
        .collect()
}
