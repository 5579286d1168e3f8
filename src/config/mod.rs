//! Configuration loading and management for the Eligibility Engine.
//!
//! This module provides functionality to load the eligibility policy and the
//! eligible-role allow-list from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use eligibility_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Required months: {}", config.policy().required_months);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    DEFAULT_REQUIRED_MONTHS, DEFAULT_SEMESTER_MONTHS, EligibilityPolicy, EngineConfig,
    RoleCatalog, RolePattern,
};
