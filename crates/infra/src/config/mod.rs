//! Configuration loading
//!
//! This module loads [`optiq_domain::OptimizerConfig`] from files and
//! environment variables.

pub mod loader;

// Re-export commonly used items
pub use loader::{
    apply_env_overrides, load, load_from_file, parse_config, find_config_file, find_in_dir,
};
