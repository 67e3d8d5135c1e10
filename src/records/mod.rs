//! Person record schema and ingestion boundary.
//!
//! Records arrive as loosely shaped JSON/YAML from the site data partitions.
//! Everything is decoded into an explicit `PersonRecord` here; entries that do
//! not fit the schema are logged and skipped instead of failing the whole load.

pub mod formats;
pub mod loader;

pub use formats::{FormatRegistry, RecordFormat};
pub use loader::{discover_partitions, load_partition, load_partitions, Partition};

use crate::error::{RelnavError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Stable person identifier assigned by the data source.
///
/// Sources use both strings ("I0042") and integers; both normalize to a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PersonId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(i64),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Text(s) => s.trim().to_string(),
            Scalar::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl<'de> Deserialize<'de> for PersonId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Scalar::deserialize(deserializer).map(|raw| PersonId(raw.into_string()))
    }
}

/// Accepts a missing field, `null`, a single value or a list.
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<OneOrMany>::deserialize(deserializer)?;
    let values = match raw {
        None => Vec::new(),
        Some(OneOrMany::One(v)) => vec![v.into_string()],
        Some(OneOrMany::Many(vs)) => vs.into_iter().map(Scalar::into_string).collect(),
    };
    Ok(values.into_iter().filter(|v| !v.is_empty()).collect())
}

/// One person as supplied by the data source. Read-only input to the graph builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    pub id: PersonId,
    pub name: String,
    /// Sub-family grouping used to tell same-named people apart.
    #[serde(default, alias = "lineage")]
    pub lineage_name: Option<String>,
    /// Unresolved reference, `"Name"` or `"Name [Lineage]"`.
    #[serde(default)]
    pub father: Option<String>,
    #[serde(default)]
    pub mother: Option<String>,
    #[serde(default, alias = "spouse", deserialize_with = "one_or_many")]
    pub spouses: Vec<String>,
    /// Child ids, or free-text references when the source had no ids.
    #[serde(default, deserialize_with = "one_or_many")]
    pub children: Vec<String>,
}

impl PersonRecord {
    /// Minimal record with only an id and a name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: PersonId::new(id),
            name: name.into(),
            lineage_name: None,
            father: None,
            mother: None,
            spouses: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_lineage(mut self, lineage: impl Into<String>) -> Self {
        self.lineage_name = Some(lineage.into());
        self
    }

    pub fn with_father(mut self, father: impl Into<String>) -> Self {
        self.father = Some(father.into());
        self
    }

    pub fn with_mother(mut self, mother: impl Into<String>) -> Self {
        self.mother = Some(mother.into());
        self
    }

    pub fn with_spouse(mut self, spouse: impl Into<String>) -> Self {
        self.spouses.push(spouse.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<String>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Reject records the graph cannot index.
    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(RelnavError::InvalidRecord(format!(
                "record '{}' has an empty id",
                self.name
            )));
        }
        if self.name.trim().is_empty() {
            return Err(RelnavError::InvalidRecord(format!(
                "record {} has an empty name",
                self.id
            )));
        }
        Ok(())
    }
}

/// Decode raw entries into records, skipping anything that fails the schema
/// or validation. `source` only labels log lines.
pub fn decode_records(values: Vec<serde_json::Value>, source: &str) -> Vec<PersonRecord> {
    let total = values.len();
    let mut records = Vec::with_capacity(total);

    for (index, value) in values.into_iter().enumerate() {
        let record: PersonRecord = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping malformed record #{} in {}: {}", index, source, e);
                continue;
            }
        };
        if let Err(e) = record.validate() {
            log::warn!("Skipping record #{} in {}: {}", index, source, e);
            continue;
        }
        records.push(record);
    }

    if records.len() < total {
        log::info!("{}: kept {} of {} records", source, records.len(), total);
    }
    records
}

/// Drop later records that reuse an id already seen. First occurrence wins.
pub fn dedup_by_id(records: Vec<PersonRecord>) -> (Vec<PersonRecord>, usize) {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(records.len());
    let mut dropped = 0;
    for record in records {
        if seen.insert(record.id.clone()) {
            kept.push(record);
        } else {
            log::warn!("Duplicate person id {} ('{}'), keeping first", record.id, record.name);
            dropped += 1;
        }
    }
    (kept, dropped)
}
