use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Reserved dimension names that can never appear in a [`Config`](crate::core::config::Config).
///
/// These are the pseudo-fields every document already carries; letting a
/// dimension shadow one of them would make filters and order-by ambiguous.
pub const RESERVED_NAMES: &[&str] =
    &["uuid", "title", "body", "created_at", "updated_at", "simple_id"];

/// A single dimension value. The JSON file may hold strings, numbers, or
/// booleans here (see the on-disk `dimensions` object in the spec); callers
/// dealing only with enumerated/hierarchical dimensions will mostly see
/// [`DimensionValue::Text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DimensionValue {
    Text(String),
    Number(f64),
    Boolean(bool),
}

impl DimensionValue {
    /// Render as a bare string for comparisons against enumerated values and
    /// the hierarchical reference, which are always declared as strings.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DimensionValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for DimensionValue {
    fn from(s: &str) -> Self {
        DimensionValue::Text(s.to_string())
    }
}

impl From<String> for DimensionValue {
    fn from(s: String) -> Self {
        DimensionValue::Text(s)
    }
}

/// The dimension map carried by every document: dimension name -> value.
/// Ordered (BTreeMap) so re-saves of an untouched document are byte-stable.
pub type DimensionMap = BTreeMap<String, DimensionValue>;

/// A document as it lives in memory. The `simple_id` the end user sees is
/// never stored here -- it's derived at list time by the ID generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub uuid: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub dimensions: DimensionMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Document {
            uuid: Uuid::new_v4(),
            title: title.into(),
            body: String::new(),
            dimensions: DimensionMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn dimension(&self, name: &str) -> Option<&DimensionValue> {
        self.dimensions.get(name)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Pending changes to a document, applied atomically by
/// [`Store::update`](crate::core::store::Store::update). Unset fields are
/// preserved; an entirely-empty request is a valid no-op.
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub dimensions: Option<DimensionMap>,
}

impl UpdateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_dimension(mut self, name: impl Into<String>, value: impl Into<DimensionValue>) -> Self {
        self.dimensions
            .get_or_insert_with(DimensionMap::new)
            .insert(name.into(), value.into());
        self
    }
}

/// The whole-file persistence unit: documents plus store-level metadata.
/// Disk order is insertion order and carries no logical meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub documents: Vec<Document>,
    pub metadata: StoreMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMetadata {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoreMetadata {
    pub fn new() -> Self {
        let now = Utc::now();
        StoreMetadata {
            version: "1.0".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for StoreMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        StoreSnapshot {
            documents: Vec::new(),
            metadata: StoreMetadata::new(),
        }
    }
}
