//! Convention loading functionality.
//!
//! This module provides the [`ConventionStore`] type for loading convention
//! documents from a directory of YAML files.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::resolver::{resolve_effective, validate_convention};
use super::types::{ConventionConfig, EffectiveConfig};

/// Loads and provides read-only access to convention documents.
///
/// The store reads one YAML document per convention from a directory,
/// validates each document's policy values at load time, and resolves
/// sub-company inheritance on demand — so a parent edit is picked up by
/// every sub-company at the next resolution, never copied.
///
/// # Directory Structure
///
/// ```text
/// config/conventions/
/// ├── activa.yaml          # Parent insurer
/// ├── activa_mining.yaml   # Sub-company (employer plan) under activa
/// ├── bralima.yaml
/// └── ...
/// ```
///
/// # Example
///
/// ```no_run
/// use convention_engine::config::ConventionStore;
///
/// let store = ConventionStore::load("./config/conventions").unwrap();
/// let effective = store.resolve("activa").unwrap();
/// println!("Default coverage: {}%", effective.default_coverage_percentage);
/// ```
#[derive(Debug, Clone)]
pub struct ConventionStore {
    conventions: HashMap<String, ConventionConfig>,
}

impl ConventionStore {
    /// Loads every convention document from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the conventions directory
    ///
    /// # Returns
    ///
    /// Returns a `ConventionStore` on success, or an error if:
    /// - The directory is missing or contains no YAML files
    /// - Any file contains invalid YAML
    /// - Any document fails policy validation (`PolicyValidation`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let dir = path.as_ref();
        let dir_str = dir.display().to_string();

        if !dir.exists() {
            return Err(EngineError::ConfigNotFound { path: dir_str });
        }

        let entries = fs::read_dir(dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut conventions = HashMap::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let file = entry.path();
            if file.extension().is_some_and(|ext| ext == "yaml") {
                let config = Self::load_yaml::<ConventionConfig>(&file)?;
                validate_convention(&config)?;
                conventions.insert(config.id.clone(), config);
            }
        }

        if conventions.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no convention files found)", dir_str),
            });
        }

        info!(count = conventions.len(), path = %dir_str, "loaded conventions");

        Ok(Self { conventions })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Gets a convention document by its id.
    ///
    /// # Errors
    ///
    /// Returns `ConventionNotFound` when no document with the id is loaded.
    pub fn get(&self, id: &str) -> EngineResult<&ConventionConfig> {
        self.conventions
            .get(id)
            .ok_or_else(|| EngineError::ConventionNotFound { id: id.to_string() })
    }

    /// Resolves a convention's effective rule set, following its parent
    /// reference if one is set.
    ///
    /// # Errors
    ///
    /// Returns `ConventionNotFound` for an unknown id and `ParentNotFound`
    /// when the named parent is not loaded.
    pub fn resolve(&self, id: &str) -> EngineResult<EffectiveConfig> {
        let company = self.get(id)?;

        let parent = match &company.parent_convention {
            Some(parent_id) => Some(self.conventions.get(parent_id).ok_or_else(|| {
                EngineError::ParentNotFound {
                    company: company.id.clone(),
                    parent: parent_id.clone(),
                }
            })?),
            None => None,
        };

        resolve_effective(company, parent)
    }

    /// Returns the number of loaded conventions.
    pub fn len(&self) -> usize {
        self.conventions.len()
    }

    /// Whether the store holds no conventions.
    pub fn is_empty(&self) -> bool {
        self.conventions.is_empty()
    }
}
