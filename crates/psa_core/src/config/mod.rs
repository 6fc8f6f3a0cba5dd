//! Configuration management for the PSA tool.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Defaults for every key, so partial files load cleanly
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//!
//! # Example
//!
//! ```no_run
//! use psa_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::for_app();
//! config.load_or_default().unwrap();
//!
//! println!("Source: {}", config.settings().paths.source);
//!
//! config.settings_mut().paths.source = "D:/PSA/Week".to_string();
//! config.update_section(ConfigSection::Paths).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{app_dir, ConfigError, ConfigManager, ConfigResult, SETTINGS_FILE_NAME};
pub use settings::{
    ConfigSection, LoggingSettings, PathSettings, Settings, ToolSettings, UpdateSettings,
};
