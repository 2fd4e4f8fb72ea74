//! Source path to generated artifact mapping.
//!
//! The cache is a plain in-memory structure; persisting it is an explicit
//! step taken by whoever owns it (see [`store`]).

use crate::error::{DocsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod store;

pub use store::{load_cache, save_cache};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub artifact_path: String,
    /// SHA-256 of the source content the artifact was generated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_doc: Option<String>,
}

impl CacheEntry {
    pub fn new(artifact_path: impl Into<String>) -> Self {
        Self { artifact_path: artifact_path.into(), fingerprint: None, previous_doc: None }
    }
}

/// Serialized form of one entry. Entries without incremental data collapse
/// to a bare artifact path, which also accepts older flat cache files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredEntry {
    Path(String),
    Full(CacheEntry),
}

pub type CacheRecord = BTreeMap<String, StoredEntry>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentationCache {
    entries: BTreeMap<String, CacheEntry>,
}

impl DocumentationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `source_path` with a bare artifact path.
    pub fn add(&mut self, source_path: &str, artifact_path: &str) -> Result<()> {
        self.insert(source_path, CacheEntry::new(artifact_path))
    }

    /// Insert or fully replace the entry for `source_path`.
    pub fn insert(&mut self, source_path: &str, entry: CacheEntry) -> Result<()> {
        validate_key(source_path)?;
        self.entries.insert(source_path.to_string(), entry);
        Ok(())
    }

    pub fn lookup(&self, source_path: &str) -> Option<&CacheEntry> {
        self.entries.get(source_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_record(&self) -> CacheRecord {
        self.entries
            .iter()
            .map(|(source, entry)| {
                let stored = if entry.fingerprint.is_none() && entry.previous_doc.is_none() {
                    StoredEntry::Path(entry.artifact_path.clone())
                } else {
                    StoredEntry::Full(entry.clone())
                };
                (source.clone(), stored)
            })
            .collect()
    }

    pub fn from_record(record: CacheRecord) -> Result<Self> {
        let mut cache = Self::new();
        for (source, stored) in record {
            let entry = match stored {
                StoredEntry::Path(artifact_path) => CacheEntry::new(artifact_path),
                StoredEntry::Full(entry) => entry,
            };
            cache.insert(&source, entry)?;
        }
        Ok(cache)
    }
}

fn validate_key(source_path: &str) -> Result<()> {
    if source_path.trim().is_empty() || source_path.contains('\0') {
        return Err(DocsError::InvalidKey(source_path.to_string()));
    }
    Ok(())
}
