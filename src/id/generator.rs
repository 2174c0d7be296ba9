use std::collections::HashMap;

use uuid::Uuid;

use crate::core::config::{Config, DimensionKind};
use crate::core::types::Document;
use crate::id::prefix_table::PrefixTable;

/// The result of canonicalizing a snapshot: every document's derived short
/// ID, plus the canonical pre-order traversal those IDs were assigned in.
/// `order` is what `ORDER BY simple_id` sorts against -- it already encodes
/// the partition-then-creation-time rule, so sorting on it is just an index
/// lookup rather than a string comparison.
#[derive(Debug, Clone, Default)]
pub struct Canonicalization {
    simple_ids: HashMap<Uuid, String>,
    order: Vec<Uuid>,
    ranks: HashMap<Uuid, usize>,
}

impl Canonicalization {
    pub fn simple_id(&self, uuid: &Uuid) -> Option<&str> {
        self.simple_ids.get(uuid).map(|s| s.as_str())
    }

    pub fn rank(&self, uuid: &Uuid) -> Option<usize> {
        self.ranks.get(uuid).copied()
    }

    pub fn len(&self) -> usize {
        self.simple_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simple_ids.is_empty()
    }
}

/// A partition key: the enumerated-dimension tuple for a sibling group,
/// carried in declared-dimension order so rendering and ordering never need
/// to re-sort it.
pub(crate) type PartitionKey = Vec<(String, String)>;

/// Build the parent -> children map shared by the generator and the
/// resolver, so both walk the hierarchy the same way.
pub(crate) fn build_children<'a>(
    documents: &'a [Document],
    config: &Config,
) -> HashMap<Option<Uuid>, Vec<&'a Document>> {
    let known_uuids: std::collections::HashSet<Uuid> = documents.iter().map(|d| d.uuid).collect();
    let ref_field = config.ref_field();

    let mut children: HashMap<Option<Uuid>, Vec<&Document>> = HashMap::new();
    for doc in documents {
        let parent = parent_of(doc, ref_field, &known_uuids);
        children.entry(parent).or_default().push(doc);
    }
    children
}

/// Canonicalize a snapshot into short IDs. `documents` should normally be
/// the full snapshot -- numbering a filtered subset produces hierarchically
/// incoherent IDs, which is why every caller in this crate always passes the
/// complete document set and filters afterwards.
pub fn canonicalize(documents: &[Document], config: &Config, prefixes: &PrefixTable) -> Canonicalization {
    let mut children = build_children(documents, config);

    let mut out = Canonicalization::default();
    let roots = children.remove(&None).unwrap_or_default();
    number_group(&roots, None, &children, config, prefixes, &mut out);
    out
}

/// Resolve a document's parent UUID, treating a dangling reference (one
/// that doesn't resolve against this snapshot) as a root -- this is the
/// expected outcome when the parent was soft-archived or deleted without
/// cascade.
fn parent_of(doc: &Document, ref_field: Option<&str>, known: &std::collections::HashSet<Uuid>) -> Option<Uuid> {
    let ref_field = ref_field?;
    let value = doc.dimension(ref_field)?.as_str()?;
    if value.is_empty() {
        return None;
    }
    let parent_uuid = Uuid::parse_str(value).ok()?;
    if known.contains(&parent_uuid) {
        Some(parent_uuid)
    } else {
        None
    }
}

fn effective_value(doc: &Document, dim_name: &str, default: Option<&str>) -> String {
    doc.dimension(dim_name)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .or_else(|| default.map(|d| d.to_string()))
        .unwrap_or_default()
}

pub(crate) fn partition_key(doc: &Document, config: &Config) -> PartitionKey {
    config
        .enumerated_dimensions()
        .map(|dim| {
            let default = match &dim.kind {
                DimensionKind::Enumerated { default, .. } => default.as_deref(),
                DimensionKind::Hierarchical => None,
            };
            (dim.name.clone(), effective_value(doc, &dim.name, default))
        })
        .collect()
}

pub(crate) fn is_default_tuple(key: &PartitionKey, config: &Config) -> bool {
    key.iter().all(|(name, value)| is_default_value(config, name, value))
}

pub(crate) fn is_default_value(config: &Config, dim_name: &str, value: &str) -> bool {
    match config.dimension(dim_name).map(|d| &d.kind) {
        Some(DimensionKind::Enumerated { default, .. }) => default.as_deref() == Some(value),
        _ => false,
    }
}

pub(crate) fn render_prefix(key: &PartitionKey, prefixes: &PrefixTable) -> String {
    key.iter()
        .filter_map(|(name, value)| prefixes.letter_for(name, value))
        .collect()
}

/// Declared order position of a dimension, used to order single-dimension
/// partitions and to order the non-default dimension within a prefix.
fn dimension_rank(config: &Config, dim_name: &str) -> usize {
    config
        .enumerated_dimensions()
        .position(|d| d.name == dim_name)
        .unwrap_or(usize::MAX)
}

/// Position of `value` within its dimension's declared values list --
/// resolves the order of same-dimension partitions when a dimension has
/// more than one non-default value in play (e.g. `completed` vs `archived`).
fn value_rank(config: &Config, dim_name: &str, value: &str) -> usize {
    match config.dimension(dim_name).map(|d| &d.kind) {
        Some(DimensionKind::Enumerated { values, .. }) => {
            values.iter().position(|v| v == value).unwrap_or(usize::MAX)
        }
        _ => usize::MAX,
    }
}

fn sort_key_for_partition(key: &PartitionKey, config: &Config, prefixes: &PrefixTable) -> (u8, usize, usize, String) {
    let non_default: Vec<&(String, String)> = key
        .iter()
        .filter(|(name, value)| !is_default_value(config, name, value))
        .collect();

    match non_default.len() {
        0 => (0, 0, 0, String::new()),
        1 => {
            let (name, value) = non_default[0];
            (1, dimension_rank(config, name), value_rank(config, name, value), String::new())
        }
        _ => (2, 0, 0, render_prefix(key, prefixes)),
    }
}

/// Order siblings within a partition: `created_at` ascending, UUID
/// lexicographic as a deterministic tiebreaker.
pub(crate) fn sort_siblings(docs: &mut Vec<&Document>) {
    docs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.uuid.to_string().cmp(&b.uuid.to_string())));
}

fn number_group<'a>(
    siblings: &[&'a Document],
    parent_label: Option<&str>,
    children: &HashMap<Option<Uuid>, Vec<&'a Document>>,
    config: &Config,
    prefixes: &PrefixTable,
    out: &mut Canonicalization,
) {
    // Partition siblings by their enumerated-dimension tuple.
    let mut partitions: HashMap<PartitionKey, Vec<&Document>> = HashMap::new();
    for doc in siblings {
        partitions.entry(partition_key(doc, config)).or_default().push(doc);
    }

    let mut ordered_keys: Vec<PartitionKey> = partitions.keys().cloned().collect();
    ordered_keys.sort_by(|a, b| {
        let ka = sort_key_for_partition(a, config, prefixes);
        let kb = sort_key_for_partition(b, config, prefixes);
        ka.cmp(&kb)
    });

    for key in ordered_keys {
        let prefix = if is_default_tuple(&key, config) {
            String::new()
        } else {
            render_prefix(&key, prefixes)
        };

        let mut docs = partitions.remove(&key).unwrap_or_default();
        sort_siblings(&mut docs);

        for (index, doc) in docs.into_iter().enumerate() {
            let label = format!("{}{}", prefix, index + 1);
            let simple_id = match parent_label {
                Some(parent) => format!("{}.{}", parent, label),
                None => label.clone(),
            };

            out.ranks.insert(doc.uuid, out.order.len());
            out.order.push(doc.uuid);
            out.simple_ids.insert(doc.uuid, simple_id.clone());

            if let Some(kids) = children.get(&Some(doc.uuid)) {
                number_group(kids, Some(&simple_id), children, config, prefixes, out);
            }
        }
    }
}
