use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::error::{Error, Result};
use crate::core::types::RESERVED_NAMES;

/// How a dimension's values are produced and compared.
#[derive(Debug, Clone, PartialEq)]
pub enum DimensionKind {
    /// A closed set of allowed values, each optionally mapped to a
    /// single-character short-ID prefix. Missing from a document's
    /// dimension map is treated as holding `default`, if one is set.
    Enumerated {
        values: Vec<String>,
        default: Option<String>,
        prefixes: BTreeMap<String, char>,
    },
    /// A self-reference: the document's value under this dimension is
    /// another document's UUID, or empty for a root.
    Hierarchical,
}

/// One dimension of the schema. `name` is both the key used in the
/// dimension map and in where-expression columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub name: String,
    pub kind: DimensionKind,
}

impl Dimension {
    pub fn enumerated(name: impl Into<String>, values: Vec<String>) -> Self {
        Dimension {
            name: name.into(),
            kind: DimensionKind::Enumerated {
                values,
                default: None,
                prefixes: BTreeMap::new(),
            },
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        if let DimensionKind::Enumerated { default: d, .. } = &mut self.kind {
            *d = Some(default.into());
        }
        self
    }

    pub fn with_prefix(mut self, value: impl Into<String>, letter: char) -> Self {
        if let DimensionKind::Enumerated { prefixes, .. } = &mut self.kind {
            prefixes.insert(value.into(), letter);
        }
        self
    }

    pub fn hierarchical(name: impl Into<String>) -> Self {
        Dimension {
            name: name.into(),
            kind: DimensionKind::Hierarchical,
        }
    }

    pub fn is_hierarchical(&self) -> bool {
        matches!(self.kind, DimensionKind::Hierarchical)
    }
}

/// Top-level configuration a [`Store`](crate::core::store::Store) is opened
/// with: where the backing file lives, the dimension schema, and the
/// cross-process lock budget.
#[derive(Debug, Clone)]
pub struct Config {
    pub storage_path: PathBuf,
    pub dimensions: Vec<Dimension>,

    /// Total time to wait for the cross-process file lock before
    /// surfacing `LockTimeout`.
    pub lock_wait: Duration,
    /// Poll interval while waiting for the lock.
    pub lock_poll_interval: Duration,
}

impl Config {
    pub fn new(storage_path: impl Into<PathBuf>) -> Self {
        Config {
            storage_path: storage_path.into(),
            dimensions: Vec::new(),
            lock_wait: Duration::from_secs(3),
            lock_poll_interval: Duration::from_millis(100),
        }
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    /// Validate the schema once, at store construction. Every invariant in
    /// the spec's data model is checked here so later operations can assume
    /// a well-formed config and never re-validate it.
    pub fn validate(&self) -> Result<()> {
        let mut hierarchical_count = 0;
        let mut seen_names = std::collections::HashSet::new();
        let mut seen_prefixes: BTreeMap<char, (String, String)> = BTreeMap::new();

        for dim in &self.dimensions {
            if RESERVED_NAMES.contains(&dim.name.as_str()) {
                return Err(Error::config(format!(
                    "dimension name '{}' is reserved",
                    dim.name
                )));
            }
            if !seen_names.insert(dim.name.clone()) {
                return Err(Error::config(format!("duplicate dimension name '{}'", dim.name)));
            }

            match &dim.kind {
                DimensionKind::Hierarchical => {
                    hierarchical_count += 1;
                }
                DimensionKind::Enumerated { values, default, prefixes } => {
                    if let Some(default) = default {
                        if !values.contains(default) {
                            return Err(Error::config(format!(
                                "dimension '{}' default '{}' is not in its values list",
                                dim.name, default
                            )));
                        }
                    }
                    for (value, letter) in prefixes {
                        if !values.contains(value) {
                            return Err(Error::config(format!(
                                "dimension '{}' has a prefix for unknown value '{}'",
                                dim.name, value
                            )));
                        }
                        if !letter.is_ascii_lowercase() {
                            return Err(Error::config(format!(
                                "dimension '{}' prefix '{}' for value '{}' must be a lowercase ASCII letter",
                                dim.name, letter, value
                            )));
                        }
                        if let Some((other_dim, other_value)) =
                            seen_prefixes.insert(*letter, (dim.name.clone(), value.clone()))
                        {
                            return Err(Error::config(format!(
                                "prefix '{}' used by both {}.{} and {}.{}",
                                letter, other_dim, other_value, dim.name, value
                            )));
                        }
                    }
                }
            }
        }

        if hierarchical_count > 1 {
            return Err(Error::config("at most one hierarchical dimension is allowed"));
        }

        Ok(())
    }

    /// The declared name of the hierarchical reference field, if any. This
    /// doubles as the filter key that selects children of a given parent.
    pub fn ref_field(&self) -> Option<&str> {
        self.dimensions
            .iter()
            .find(|d| d.is_hierarchical())
            .map(|d| d.name.as_str())
    }

    /// Enumerated dimensions in declared order -- the order partitioning and
    /// prefix rendering both key off of.
    pub fn enumerated_dimensions(&self) -> impl Iterator<Item = &Dimension> {
        self.dimensions
            .iter()
            .filter(|d| !d.is_hierarchical())
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }
}
