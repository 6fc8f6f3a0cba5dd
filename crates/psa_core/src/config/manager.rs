//! Config manager for loading, saving, and atomic updates.
//!
//! Key features:
//! - Layered resolution (built-in defaults, then the persisted file)
//! - Atomic writes (write to temp file, then rename)
//! - Section-level updates (only modified section is changed)
//! - Preserves comments and formatting with toml_edit

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::{DocumentMut, Item};

use super::settings::{ConfigSection, Settings};
use crate::logging::LogConfig;
use crate::stitch::ToolLocator;

/// Settings file name, stored beside the executable.
pub const SETTINGS_FILE_NAME: &str = "psa_tool_settings.toml";

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to parse config for editing: {0}")]
    EditParseError(#[from] toml_edit::TomlError),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Folder holding the running executable, or the current directory when
/// that cannot be determined.
pub fn app_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Manages application configuration.
///
/// Handles loading, saving, and atomic section-level updates. Relative
/// paths in the settings resolve against the folder holding the file.
pub struct ConfigManager {
    /// Path to the config file.
    config_path: PathBuf,
    /// Folder relative settings resolve against.
    base_dir: PathBuf,
    /// Current settings loaded in memory.
    settings: Settings,
}

impl ConfigManager {
    /// Create a new config manager with the given config file path.
    ///
    /// Does not load the config - call `load()` or `load_or_default()` after.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        let config_path = config_path.into();
        let base_dir = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            config_path,
            base_dir,
            settings: Settings::default(),
        }
    }

    /// Manager for the settings file beside the executable.
    pub fn for_app() -> Self {
        Self::new(app_dir().join(SETTINGS_FILE_NAME))
    }

    /// Get the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Folder relative settings resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get a reference to the current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get a mutable reference to the current settings.
    ///
    /// Note: Changes made here are only in memory until `save()` or
    /// `update_section()` is called.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Load config from file.
    ///
    /// Returns error if file doesn't exist.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;
        Ok(())
    }

    /// Load config from file, keeping defaults if it doesn't exist.
    ///
    /// The file is never created here; only `save()` and
    /// `update_section()` write it.
    pub fn load_or_default(&mut self) -> ConfigResult<()> {
        match self.load() {
            Ok(()) => Ok(()),
            Err(ConfigError::NotFound(path)) => {
                tracing::debug!("No settings at {}, using defaults", path.display());
                self.settings = Settings::default();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve a configured path against the base folder.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            path
        } else {
            self.base_dir.join(path)
        }
    }

    /// Get the logs folder path.
    pub fn logs_folder(&self) -> PathBuf {
        self.resolve(&self.settings.paths.logs_folder)
    }

    pub fn source_dir(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.source)
    }

    pub fn dest_root(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.dest_root)
    }

    /// Path of the release check token file.
    pub fn token_file(&self) -> PathBuf {
        self.resolve(&self.settings.updates.token_file)
    }

    /// Tool locator built from the `[tool]` section.
    pub fn tool_locator(&self) -> ToolLocator {
        let tool = &self.settings.tool;
        ToolLocator::new(
            &self.base_dir,
            &tool.bin_dir,
            tool.ffmpeg_names.clone(),
            tool.download_url.clone(),
        )
        .with_override(
            tool.ffmpeg_path
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(|p| self.resolve(p)),
        )
    }

    /// Per-run logger configuration from the `[logging]` section.
    pub fn log_config(&self) -> LogConfig {
        let logging = &self.settings.logging;
        LogConfig {
            level: logging.level,
            compact: logging.compact,
            progress_step: logging.progress_step,
            error_tail: logging.error_tail as usize,
            show_timestamps: true,
        }
    }

    /// Save the entire config atomically.
    ///
    /// Writes to a temp file first, then renames to ensure atomic write.
    pub fn save(&self) -> ConfigResult<()> {
        let content = self.generate_config_with_comments()?;
        self.atomic_write(&content)?;
        Ok(())
    }

    /// Update a specific section atomically.
    ///
    /// This re-reads the file from disk, updates only the specified section,
    /// and writes back atomically. Other sections keep their on-disk values.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        let current_content = if self.config_path.exists() {
            fs::read_to_string(&self.config_path)?
        } else {
            String::new()
        };

        let mut doc: DocumentMut = if current_content.trim().is_empty() {
            DocumentMut::new()
        } else {
            current_content.parse()?
        };

        let section_doc: DocumentMut = self.section_toml(section)?.parse()?;
        let section_table = section_doc.as_table().clone();
        doc[section.table_name()] = Item::Table(section_table);

        self.atomic_write(&doc.to_string())?;
        Ok(())
    }

    fn section_toml(&self, section: ConfigSection) -> ConfigResult<String> {
        let toml = match section {
            ConfigSection::Paths => toml::to_string_pretty(&self.settings.paths)?,
            ConfigSection::Tool => toml::to_string_pretty(&self.settings.tool)?,
            ConfigSection::Logging => toml::to_string_pretty(&self.settings.logging)?,
            ConfigSection::Updates => toml::to_string_pretty(&self.settings.updates)?,
        };
        Ok(toml)
    }

    /// Generate config content with helpful comments.
    fn generate_config_with_comments(&self) -> ConfigResult<String> {
        let mut output = String::new();

        output.push_str("# PSA Tool Configuration\n");
        output.push_str(
            "# This file is auto-generated. Comments may be preserved on section updates.\n",
        );

        for section in ConfigSection::ALL {
            output.push('\n');
            output.push_str(&format!("# {}\n", section.comment()));
            output.push_str(&format!("[{}]\n", section.table_name()));
            for line in self.section_toml(section)?.lines() {
                output.push_str(line);
                output.push('\n');
            }
        }

        Ok(output)
    }

    /// Write content to config file atomically.
    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.config_path.with_extension("toml.tmp");

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.config_path)?;
        tracing::debug!("Settings written to {}", self.config_path.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_or_default_does_not_create_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(SETTINGS_FILE_NAME);

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_default().unwrap();

        assert!(!config_path.exists());
        assert_eq!(manager.settings(), &Settings::default());
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join("absent.toml"));
        assert!(matches!(manager.load(), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn load_preserves_existing() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&config_path, "[paths]\nsource = \"/mnt/psa/source\"\n").unwrap();

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_default().unwrap();

        assert_eq!(manager.settings().paths.source, "/mnt/psa/source");
        assert_eq!(manager.settings().tool.bin_dir, "ffmpeg-bin");
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&config_path, "[paths\nsource = ").unwrap();

        let mut manager = ConfigManager::new(&config_path);
        assert!(matches!(
            manager.load_or_default(),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join(SETTINGS_FILE_NAME);

        let mut manager = ConfigManager::new(&config_path);
        manager.settings_mut().paths.dest_root = "/srv/dest".to_string();
        manager.settings_mut().tool.ffmpeg_path = Some("/opt/ffmpeg".to_string());
        manager.save().unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.starts_with("# PSA Tool Configuration"));
        assert!(content.contains("# Release check\n[updates]"));

        let mut reloaded = ConfigManager::new(&config_path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.settings(), manager.settings());
    }

    #[test]
    fn update_section_only_changes_target() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(
            &config_path,
            "# keep me\n[paths]\nsource = \"/on/disk\"\n\n[logging]\ncompact = true\n",
        )
        .unwrap();

        let mut manager = ConfigManager::new(&config_path);
        manager.load().unwrap();
        manager.settings_mut().paths.source = "/in/memory".to_string();
        manager.settings_mut().logging.compact = false;

        manager.update_section(ConfigSection::Logging).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("# keep me"));
        assert!(content.contains("compact = false"));
        assert!(content.contains("source = \"/on/disk\""));
        assert!(!content.contains("/in/memory"));
    }

    #[test]
    fn update_section_creates_missing_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(SETTINGS_FILE_NAME);

        let mut manager = ConfigManager::new(&config_path);
        manager.settings_mut().logging.level = LogLevel::Debug;
        manager.update_section(ConfigSection::Logging).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[logging]"));
        assert!(content.contains("level = \"debug\""));
    }

    #[test]
    fn atomic_write_creates_no_temp_on_success() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(SETTINGS_FILE_NAME);

        let manager = ConfigManager::new(&config_path);
        manager.save().unwrap();

        assert!(config_path.exists());
        assert!(!config_path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn relative_paths_resolve_against_base_dir() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().join(SETTINGS_FILE_NAME));

        assert_eq!(manager.base_dir(), dir.path());
        assert_eq!(manager.logs_folder(), dir.path().join("logs"));
        assert_eq!(manager.token_file(), dir.path().join("update_token.txt"));
    }

    #[test]
    fn tool_locator_uses_bin_dir_and_override() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join(SETTINGS_FILE_NAME));
        let locator = manager.tool_locator();
        assert_eq!(locator.bin_dir(), dir.path().join("ffmpeg-bin"));
        assert_eq!(locator.search_dirs()[0], dir.path());

        let fake = dir.path().join("my-ffmpeg");
        fs::write(&fake, "").unwrap();
        manager.settings_mut().tool.ffmpeg_path = Some("my-ffmpeg".to_string());
        assert_eq!(manager.tool_locator().ensure().unwrap(), fake);
    }

    #[test]
    fn log_config_mirrors_logging_section() {
        let mut manager = ConfigManager::new("settings.toml");
        manager.settings_mut().logging.error_tail = 5;
        manager.settings_mut().logging.compact = false;

        let config = manager.log_config();
        assert_eq!(config.error_tail, 5);
        assert!(!config.compact);
        assert_eq!(manager.base_dir(), Path::new("."));
    }
}
