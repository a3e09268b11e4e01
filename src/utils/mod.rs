//! Configuration utilities.

/// TOML configuration file (`scholar.toml`).
pub mod toml_config;
