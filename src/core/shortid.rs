//! Short ID system for easier entity selection
//!
//! Full IDs are 30 characters long; nobody wants to type them. Every
//! record that is created or listed gets a persistent alias such as
//! `PUR@1` or `MDL@12`, numbered per entity type. Aliases are stored in
//! `.yardbook/shortids.json` and never reused within a collection.

use std::collections::HashMap;
use std::fs;

use crate::core::collection::Collection;
use crate::core::identity::EntityId;

/// Index file location within a collection
const INDEX_FILE: &str = ".yardbook/shortids.json";

/// A mapping of short IDs to full entity IDs
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ShortIdIndex {
    /// Maps "PREFIX@N" to full entity ID string (e.g., "PUR@1" -> "PUR-01ABC...")
    entries: HashMap<String, String>,
    /// Maps full entity ID to short ID (reverse lookup)
    #[serde(skip)]
    reverse: HashMap<String, String>,
    /// Next available number per prefix
    next_ids: HashMap<String, u32>,
}

impl ShortIdIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index from a collection, or create empty if not found
    pub fn load(collection: &Collection) -> Self {
        let path = collection.root().join(INDEX_FILE);
        if let Ok(content) = fs::read_to_string(&path) {
            match serde_json::from_str::<ShortIdIndex>(&content) {
                Ok(mut index) => {
                    index.reverse = index
                        .entries
                        .iter()
                        .map(|(k, v)| (v.clone(), k.clone()))
                        .collect();
                    return index;
                }
                Err(e) => tracing::warn!(error = %e, "ignoring corrupt short ID index"),
            }
        }
        Self::new()
    }

    /// Save the index to a collection
    pub fn save(&self, collection: &Collection) -> std::io::Result<()> {
        let path = collection.root().join(INDEX_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
    }

    /// Add an entity ID and return its short ID, reusing an existing alias
    pub fn add(&mut self, entity_id: &EntityId) -> String {
        let full = entity_id.to_string();
        if let Some(existing) = self.reverse.get(&full) {
            return existing.clone();
        }

        let prefix = entity_id.prefix().as_str().to_string();
        let next = self.next_ids.entry(prefix.clone()).or_insert(1);
        let short = format!("{}@{}", prefix, next);
        *next += 1;

        self.entries.insert(short.clone(), full.clone());
        self.reverse.insert(full, short.clone());
        short
    }

    /// Drop the alias of a deleted entity; its number is not reused
    pub fn forget(&mut self, entity_id: &EntityId) {
        if let Some(short) = self.reverse.remove(&entity_id.to_string()) {
            self.entries.remove(&short);
        }
    }

    /// Resolve a `PREFIX@N` reference to a full entity ID
    ///
    /// Returns `None` for anything that is not a known short ID.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        let (prefix, number) = reference.split_once('@')?;
        if prefix.is_empty() || number.parse::<u32>().is_err() {
            return None;
        }
        self.entries
            .get(&format!("{}@{}", prefix.to_uppercase(), number))
            .cloned()
    }

    /// Get the short ID for a full entity ID (e.g., "PUR@1")
    pub fn get_short_id(&self, entity_id: &EntityId) -> Option<String> {
        self.reverse.get(&entity_id.to_string()).cloned()
    }

    /// Short ID if known, otherwise the full ID
    pub fn display(&self, entity_id: &EntityId) -> String {
        self.get_short_id(entity_id)
            .unwrap_or_else(|| entity_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
