//! Collection discovery and on-disk layout
//!
//! A collection is a directory containing a `.yardbook/` marker directory
//! and one sub-directory per entity type:
//!
//! ```text
//! .yardbook/config.yaml
//! .yardbook/shortids.json
//! purchases/PUR-<ulid>.yb.yaml
//! models/MDL-<ulid>.yb.yaml
//! accessories/ACC-<ulid>.yb.yaml
//! ```

use miette::Diagnostic;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::shortid::ShortIdIndex;
use crate::yaml::{parse_yaml_file, YamlError};

/// Marker directory at the collection root
pub const MARKER_DIR: &str = ".yardbook";

/// Suffix of every record file
pub const RECORD_SUFFIX: &str = ".yb.yaml";

const DEFAULT_CONFIG: &str = "\
# Yardbook collection configuration
#
# author: Your Name
# default_currency: GBP
# default_gauge: OO
";

#[derive(Debug, Error, Diagnostic)]
pub enum CollectionError {
    #[error("not a yardbook collection (or any parent directory): {0}")]
    #[diagnostic(help("run `yardbook init` to create one"))]
    NotFound(PathBuf),

    #[error("no {prefix} record matches '{query}'")]
    NoMatch { prefix: EntityPrefix, query: String },

    #[error("'{query}' matches {} {prefix} records: {}", .matches.len(), .matches.join(", "))]
    #[diagnostic(help("use more characters of the ID, or a short ID such as {prefix}@1"))]
    Ambiguous {
        prefix: EntityPrefix,
        query: String,
        matches: Vec<String>,
    },

    #[error("'{reference}' is a {found} ID, expected {expected}")]
    WrongType {
        reference: String,
        found: EntityPrefix,
        expected: EntityPrefix,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A collection rooted at a directory
#[derive(Debug, Clone)]
pub struct Collection {
    root: PathBuf,
}

impl Collection {
    /// Find the collection containing the current directory
    pub fn discover() -> Result<Self, CollectionError> {
        let cwd = std::env::current_dir()?;
        Self::discover_from(&cwd)
    }

    /// Find the collection containing `start`, walking up to the filesystem root
    pub fn discover_from(start: &Path) -> Result<Self, CollectionError> {
        start
            .ancestors()
            .find(|dir| dir.join(MARKER_DIR).is_dir())
            .map(|root| Self {
                root: root.to_path_buf(),
            })
            .ok_or_else(|| CollectionError::NotFound(start.to_path_buf()))
    }

    /// Open a collection at a known root without discovery
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the directory structure; existing records are never touched
    pub fn init(root: &Path, force: bool) -> Result<Self, CollectionError> {
        let collection = Self::open(root);

        fs::create_dir_all(collection.marker_dir())?;
        for prefix in EntityPrefix::all() {
            fs::create_dir_all(collection.entity_dir(*prefix))?;
        }

        let config_path = collection.config_path();
        if force || !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)?;
        }

        tracing::info!(root = %root.display(), "initialized collection");
        Ok(collection)
    }

    pub fn is_initialized(root: &Path) -> bool {
        root.join(MARKER_DIR).is_dir()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn marker_dir(&self) -> PathBuf {
        self.root.join(MARKER_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.marker_dir().join("config.yaml")
    }

    pub fn entity_dir(&self, prefix: EntityPrefix) -> PathBuf {
        self.root.join(prefix.directory())
    }

    /// Path of the record file for an ID
    pub fn entity_path(&self, id: &EntityId) -> PathBuf {
        self.entity_dir(id.prefix())
            .join(format!("{}{}", id, RECORD_SUFFIX))
    }

    /// Iterate record files of one entity type, sorted by file name
    pub fn iter_entity_files(&self, prefix: EntityPrefix) -> impl Iterator<Item = PathBuf> {
        let dir = self.entity_dir(prefix);
        walkdir::WalkDir::new(dir)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.file_name().to_string_lossy().ends_with(RECORD_SUFFIX))
            .map(|e| e.into_path())
    }

    /// Load every record of one type, collecting files that fail to parse
    pub fn load_all<T: Entity>(&self) -> (Vec<T>, Vec<(PathBuf, YamlError)>) {
        let mut loaded = Vec::new();
        let mut failed = Vec::new();

        for path in self.iter_entity_files(T::PREFIX) {
            match parse_yaml_file::<T>(&path) {
                Ok(entity) => loaded.push(entity),
                Err(e) => {
                    tracing::debug!(path = %path.display(), "skipping unreadable record");
                    failed.push((path, e));
                }
            }
        }

        (loaded, failed)
    }

    /// Load one record by ID
    pub fn load<T: Entity>(&self, id: &EntityId) -> Result<T, YamlError> {
        parse_yaml_file(&self.entity_path(id))
    }

    /// Resolve a user-supplied reference to an entity ID
    ///
    /// Accepts short IDs (`PUR@3`), full IDs, and unique prefixes of a full
    /// ID (`PUR-01KDG`). The ID's type must match `prefix`.
    pub fn resolve(&self, prefix: EntityPrefix, reference: &str) -> Result<EntityId, CollectionError> {
        let reference = reference.trim();
        let short_ids = ShortIdIndex::load(self);
        let resolved = short_ids
            .resolve(reference)
            .unwrap_or_else(|| reference.to_string());

        if let Ok(id) = resolved.parse::<EntityId>() {
            if id.prefix() != prefix {
                return Err(CollectionError::WrongType {
                    reference: reference.to_string(),
                    found: id.prefix(),
                    expected: prefix,
                });
            }
            if self.entity_path(&id).is_file() {
                return Ok(id);
            }
            return Err(CollectionError::NoMatch {
                prefix,
                query: reference.to_string(),
            });
        }

        let query = resolved.to_uppercase();
        let matches: Vec<String> = self
            .iter_entity_files(prefix)
            .filter_map(|path| {
                path.file_name()
                    .map(|n| n.to_string_lossy().trim_end_matches(RECORD_SUFFIX).to_string())
            })
            .filter(|stem| stem.starts_with(&query))
            .collect();

        match matches.as_slice() {
            [] => Err(CollectionError::NoMatch {
                prefix,
                query: reference.to_string(),
            }),
            [only] => only.parse().map_err(|_| CollectionError::NoMatch {
                prefix,
                query: reference.to_string(),
            }),
            _ => Err(CollectionError::Ambiguous {
                prefix,
                query: reference.to_string(),
                matches,
            }),
        }
    }
}
