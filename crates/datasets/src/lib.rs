use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One loaded dataset as the registry knows it: its id (the key layer
/// configs reference), a human label, and the field names it exposes.
/// An empty `fields` list means the field set is unknown or dynamic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub entries: BTreeMap<String, DatasetEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    NotFound(String),
    Corrupt(String),
    Io(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::NotFound(id) => write!(f, "dataset not found: {id}"),
            RegistryError::Corrupt(msg) => write!(f, "registry storage corrupt: {msg}"),
            RegistryError::Io(msg) => write!(f, "registry storage error: {msg}"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Lookup surface the document model resolves against. `Result`-returning so
/// backends with real storage can fail; the in-memory store never does.
pub trait DatasetRegistry {
    fn list(&self) -> Result<Vec<DatasetEntry>, RegistryError>;
    fn get(&self, id: &str) -> Result<Option<DatasetEntry>, RegistryError>;
    fn upsert(&mut self, entry: DatasetEntry) -> Result<(), RegistryError>;
    fn delete(&mut self, id: &str) -> Result<bool, RegistryError>;

    fn contains(&self, id: &str) -> Result<bool, RegistryError> {
        Ok(self.get(id)?.is_some())
    }

    /// Like `get`, but a miss is an error instead of `None`.
    fn require(&self, id: &str) -> Result<DatasetEntry, RegistryError> {
        self.get(id)?
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryDatasetRegistry {
    snapshot: RegistrySnapshot,
}

impl InMemoryDatasetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &RegistrySnapshot {
        &self.snapshot
    }

    pub fn from_json_str(payload: &str) -> Result<Self, RegistryError> {
        let snapshot: RegistrySnapshot =
            serde_json::from_str(payload).map_err(|e| RegistryError::Corrupt(e.to_string()))?;
        // Entry keys are authoritative; an entry whose id disagrees with its
        // key would make lookups ambiguous.
        for (key, entry) in &snapshot.entries {
            if &entry.id != key {
                return Err(RegistryError::Corrupt(format!(
                    "entry id {:?} does not match its key {:?}",
                    entry.id, key
                )));
            }
        }
        Ok(Self { snapshot })
    }

    pub fn to_json_string_pretty(&self) -> Result<String, RegistryError> {
        serde_json::to_string_pretty(&self.snapshot).map_err(|e| RegistryError::Io(e.to_string()))
    }
}

impl DatasetRegistry for InMemoryDatasetRegistry {
    fn list(&self) -> Result<Vec<DatasetEntry>, RegistryError> {
        Ok(self.snapshot.entries.values().cloned().collect())
    }

    fn get(&self, id: &str) -> Result<Option<DatasetEntry>, RegistryError> {
        Ok(self.snapshot.entries.get(id).cloned())
    }

    fn upsert(&mut self, entry: DatasetEntry) -> Result<(), RegistryError> {
        self.snapshot.entries.insert(entry.id.clone(), entry);
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, RegistryError> {
        Ok(self.snapshot.entries.remove(id).is_some())
    }
}
