//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Source and destination roots.
    #[serde(default)]
    pub paths: PathSettings,

    /// External tool discovery.
    #[serde(default)]
    pub tool: ToolSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Release check.
    #[serde(default)]
    pub updates: UpdateSettings,
}

/// Path configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Weekly source folder (holds RS clips, `Music` and `MS`).
    #[serde(default = "default_source")]
    pub source: String,

    /// Root the campaign folders live in.
    #[serde(default = "default_dest_root")]
    pub dest_root: String,

    /// Folder for log files. Relative paths resolve against the app folder.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_source() -> String {
    r"C:\PSA_Tool\Source".to_string()
}

fn default_dest_root() -> String {
    r"C:\PSA_Tool\Destination".to_string()
}

fn default_logs_folder() -> String {
    "logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            source: default_source(),
            dest_root: default_dest_root(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// ffmpeg discovery and download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Executable names tried in every search folder.
    #[serde(default = "default_ffmpeg_names")]
    pub ffmpeg_names: Vec<String>,

    /// Release archive fetched when no executable is found.
    #[serde(default = "default_download_url")]
    pub download_url: String,

    /// Folder (under the app folder) the downloaded binary is cached in.
    #[serde(default = "default_bin_dir")]
    pub bin_dir: String,

    /// Explicit executable path. Skips discovery when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffmpeg_path: Option<String>,
}

fn default_ffmpeg_names() -> Vec<String> {
    vec!["ffmpeg.exe".to_string(), "ffmpeg".to_string()]
}

fn default_download_url() -> String {
    "https://www.gyan.dev/ffmpeg/builds/ffmpeg-release-essentials.zip".to_string()
}

fn default_bin_dir() -> String {
    "ffmpeg-bin".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg_names: default_ffmpeg_names(),
            download_url: default_download_url(),
            bin_dir: default_bin_dir(),
            ffmpeg_path: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default level (`RUST_LOG` overrides it).
    #[serde(default)]
    pub level: LogLevel,

    /// Use compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Number of tool output lines shown when the tool fails.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,
}

fn default_true() -> bool {
    true
}

fn default_progress_step() -> u32 {
    20
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            compact: true,
            progress_step: default_progress_step(),
            error_tail: default_error_tail(),
        }
    }
}

/// Release check configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSettings {
    /// GitHub `owner/name` whose latest release is checked.
    #[serde(default = "default_repo")]
    pub repo: String,

    /// Token file beside the app, read when the env var is unset.
    #[serde(default = "default_token_file")]
    pub token_file: String,
}

fn default_repo() -> String {
    "PoyBoy96/PSA_Tool_".to_string()
}

fn default_token_file() -> String {
    "update_token.txt".to_string()
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            repo: default_repo(),
            token_file: default_token_file(),
        }
    }
}

/// Config sections for atomic updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Tool,
    Logging,
    Updates,
}

impl ConfigSection {
    /// All sections, in file order.
    pub const ALL: [ConfigSection; 4] = [
        ConfigSection::Paths,
        ConfigSection::Tool,
        ConfigSection::Logging,
        ConfigSection::Updates,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Tool => "tool",
            ConfigSection::Logging => "logging",
            ConfigSection::Updates => "updates",
        }
    }

    /// Comment written above the section.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Source and destination folders",
            ConfigSection::Tool => "ffmpeg discovery and download",
            ConfigSection::Logging => "Logging configuration",
            ConfigSection::Updates => "Release check",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[tool]"));
        assert!(toml.contains("[logging]"));
        assert!(toml.contains("[updates]"));
        assert!(!toml.contains("ffmpeg_path"));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let settings: Settings = toml::from_str(
            "[paths]\nsource = \"/mnt/psa/week\"\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();
        assert_eq!(settings.paths.source, "/mnt/psa/week");
        assert_eq!(settings.paths.dest_root, default_dest_root());
        assert_eq!(settings.logging.level, LogLevel::Debug);
        assert!(settings.logging.compact);
        assert_eq!(settings.tool.ffmpeg_names, vec!["ffmpeg.exe", "ffmpeg"]);
        assert_eq!(settings.updates.repo, "PoyBoy96/PSA_Tool_");
    }

    #[test]
    fn empty_toml_is_default() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }
}
