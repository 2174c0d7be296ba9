use std::collections::BTreeMap;

use crate::core::config::{Config, DimensionKind};
use crate::core::error::Result;

/// The two flat lookup structures resolved once from [`Config`] at store
/// construction: letter -> (dimension, value) and (dimension, value) ->
/// letter. Every prefix-parsing and prefix-rendering operation goes through
/// this table instead of rescanning the dimension list.
#[derive(Debug, Clone)]
pub struct PrefixTable {
    letter_to_value: BTreeMap<char, (String, String)>,
    value_to_letter: BTreeMap<(String, String), char>,
}

impl PrefixTable {
    pub fn build(config: &Config) -> Result<Self> {
        config.validate()?;

        let mut letter_to_value = BTreeMap::new();
        let mut value_to_letter = BTreeMap::new();

        for dim in config.enumerated_dimensions() {
            if let DimensionKind::Enumerated { prefixes, .. } = &dim.kind {
                for (value, letter) in prefixes {
                    letter_to_value.insert(*letter, (dim.name.clone(), value.clone()));
                    value_to_letter.insert((dim.name.clone(), value.clone()), *letter);
                }
            }
        }

        Ok(PrefixTable { letter_to_value, value_to_letter })
    }

    /// Look up the (dimension, value) a prefix letter denotes. `None` means
    /// the letter is unknown to the schema.
    pub fn lookup_letter(&self, letter: char) -> Option<&(String, String)> {
        self.letter_to_value.get(&letter)
    }

    /// Look up the prefix letter for a non-default enumerated value, if the
    /// schema assigned one.
    pub fn letter_for(&self, dimension: &str, value: &str) -> Option<char> {
        self.value_to_letter
            .get(&(dimension.to_string(), value.to_string()))
            .copied()
    }
}
