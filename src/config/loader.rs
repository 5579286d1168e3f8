//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{EligibilityPolicy, EngineConfig, RoleCatalog};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── policy.yaml   # Eligibility policy (required months, counted tiers, ...)
/// └── roles.yaml    # Allow-list of eligible role codes and descriptions
/// ```
///
/// # Example
///
/// ```no_run
/// use eligibility_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Required months: {}", loader.policy().required_months);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if either file is missing, is not valid YAML, or the
    /// policy is internally inconsistent.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let policy_path = path.join("policy.yaml");
        let policy = Self::load_yaml::<EligibilityPolicy>(&policy_path)?;
        policy
            .check()
            .map_err(|message| EngineError::ConfigParseError {
                path: policy_path.display().to_string(),
                message,
            })?;

        let roles_path = path.join("roles.yaml");
        let roles = Self::load_yaml::<RoleCatalog>(&roles_path)?;
        if roles.roles.is_empty() {
            return Err(EngineError::ConfigParseError {
                path: roles_path.display().to_string(),
                message: "role catalog is empty".to_string(),
            });
        }

        Ok(Self {
            config: EngineConfig::new(policy, roles),
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
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

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the eligibility policy.
    pub fn policy(&self) -> &EligibilityPolicy {
        self.config.policy()
    }

    /// Returns the role allow-list.
    pub fn roles(&self) -> &RoleCatalog {
        self.config.roles()
    }
}
