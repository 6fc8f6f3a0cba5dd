//! Destination tree handling.
//!
//! The destination root holds one folder per campaign or schedule block.
//! Regular folders get a `Week N` sub-folder per run; folders whose name
//! marks an off week are used directly. Every run destination receives the
//! fixed `PSAs` skeleton before anything is copied or stitched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Top-level folder inside a run destination.
pub const PSA_DIR: &str = "PSAs";

/// Folders created (in order) under every run destination.
pub const SKELETON: [&str; 4] = ["PSAs", "PSAs/RS", "PSAs/RS/Music", "PSAs/MS"];

static OFF_WEEK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\boff[\s_-]*(week|wk)s?\b").expect("off-week pattern is valid")
});

/// Errors from destination resolution and preparation.
#[derive(Error, Debug)]
pub enum DestinationError {
    #[error("Destination root is invalid: {0}")]
    InvalidRoot(PathBuf),

    #[error("Select a destination folder inside the root")]
    NoFolder,

    #[error("Please enter a week number")]
    MissingWeek,

    #[error("Week must be a number, got '{0}'")]
    InvalidWeek(String),

    #[error("Folder name cannot be empty")]
    EmptyFolderName,

    #[error("I/O error in {operation} for {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DestinationError {
    fn io(operation: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for destination operations.
pub type DestinationResult<T> = Result<T, DestinationError>;

/// Layout of one run destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationLayout {
    root: PathBuf,
}

impl DestinationLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder receiving copied RS clips.
    pub fn rs_dir(&self) -> PathBuf {
        self.root.join(PSA_DIR).join("RS")
    }

    /// Folder receiving copied RS companion audio.
    pub fn music_dir(&self) -> PathBuf {
        self.rs_dir().join("Music")
    }

    /// Folder receiving stitched MS output.
    pub fn ms_dir(&self) -> PathBuf {
        self.root.join(PSA_DIR).join("MS")
    }

    /// Create the `PSAs` skeleton. Existing folders are left alone.
    pub fn build(&self) -> DestinationResult<()> {
        for rel in SKELETON {
            let dir = self.root.join(rel);
            fs::create_dir_all(&dir)
                .map_err(|e| DestinationError::io("create folder", &dir, e))?;
        }
        Ok(())
    }
}

/// Whether a destination folder name marks an off week.
///
/// Matches the word `off`, optional spaces, underscores or dashes, then
/// `week` or `wk` with an optional plural `s`, case-insensitively and on
/// word boundaries ("Off Week", "Summer Off-Wks", but not "offweekly").
pub fn is_off_week_folder(name: &str) -> bool {
    OFF_WEEK_RE.is_match(name)
}

/// Resolve the run destination for `folder` inside `root`.
///
/// Off-week folders are used as-is; any other folder gets a `Week {week}`
/// sub-folder, where `week` must be an integer.
pub fn resolve_destination(root: &Path, folder: &str, week: &str) -> DestinationResult<PathBuf> {
    if root.as_os_str().is_empty() || !root.is_dir() {
        return Err(DestinationError::InvalidRoot(root.to_path_buf()));
    }
    let folder = folder.trim();
    if folder.is_empty() {
        return Err(DestinationError::NoFolder);
    }
    if is_off_week_folder(folder) {
        return Ok(root.join(folder));
    }

    let week = week.trim();
    if week.is_empty() {
        return Err(DestinationError::MissingWeek);
    }
    if week.parse::<i64>().is_err() {
        return Err(DestinationError::InvalidWeek(week.to_string()));
    }
    Ok(root.join(folder).join(format!("Week {week}")))
}

/// Sorted names of the immediate sub-folders of `root`.
///
/// A missing root yields an empty list.
pub fn list_destination_folders(root: &Path) -> DestinationResult<Vec<String>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(root).map_err(|e| DestinationError::io("read folder", root, e))?;
    let mut folders = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DestinationError::io("read folder", root, e))?;
        if entry.path().is_dir() {
            folders.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    folders.sort();
    Ok(folders)
}

/// Create `root/name` if absent and return its path.
pub fn create_destination_folder(root: &Path, name: &str) -> DestinationResult<PathBuf> {
    if !root.is_dir() {
        return Err(DestinationError::InvalidRoot(root.to_path_buf()));
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(DestinationError::EmptyFolderName);
    }
    let path = root.join(name);
    fs::create_dir_all(&path).map_err(|e| DestinationError::io("create folder", &path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn off_week_detection() {
        for name in [
            "Off Week",
            "off-week",
            "OFF_WK",
            "Summer offweeks",
            "2024 Off  Wks",
            "break (off week)",
            "Summer Off-Wks",
        ] {
            assert!(is_off_week_folder(name), "{name} should be off week");
        }
        for name in ["Fall Series", "offweekly", "takeoff week", "off", "week off", "x_off week"] {
            assert!(!is_off_week_folder(name), "{name} should not be off week");
        }
    }

    #[test]
    fn resolve_regular_folder_adds_week() {
        let root = tempdir().unwrap();
        let dest = resolve_destination(root.path(), " Fall ", " 3 ").unwrap();
        assert_eq!(dest, root.path().join("Fall").join("Week 3"));
    }

    #[test]
    fn resolve_off_week_ignores_week() {
        let root = tempdir().unwrap();
        let dest = resolve_destination(root.path(), "Off Week", "").unwrap();
        assert_eq!(dest, root.path().join("Off Week"));
    }

    #[test]
    fn resolve_validation_errors() {
        let root = tempdir().unwrap();

        assert!(matches!(
            resolve_destination(&root.path().join("missing"), "Fall", "1"),
            Err(DestinationError::InvalidRoot(_))
        ));
        assert!(matches!(
            resolve_destination(root.path(), "  ", "1"),
            Err(DestinationError::NoFolder)
        ));
        assert!(matches!(
            resolve_destination(root.path(), "Fall", ""),
            Err(DestinationError::MissingWeek)
        ));
        assert!(matches!(
            resolve_destination(root.path(), "Fall", "three"),
            Err(DestinationError::InvalidWeek(_))
        ));
    }

    #[test]
    fn build_skeleton_is_idempotent() {
        let root = tempdir().unwrap();
        let layout = DestinationLayout::new(root.path().join("Fall").join("Week 1"));

        layout.build().unwrap();
        layout.build().unwrap();

        assert!(layout.rs_dir().is_dir());
        assert!(layout.music_dir().is_dir());
        assert!(layout.ms_dir().is_dir());
    }

    #[test]
    fn folder_listing_and_creation() {
        let root = tempdir().unwrap();
        fs::write(root.path().join("file.txt"), b"").unwrap();
        create_destination_folder(root.path(), "Winter").unwrap();
        create_destination_folder(root.path(), "Autumn").unwrap();
        create_destination_folder(root.path(), "Winter").unwrap();

        assert_eq!(
            list_destination_folders(root.path()).unwrap(),
            vec!["Autumn".to_string(), "Winter".to_string()]
        );
        assert!(list_destination_folders(&root.path().join("nope"))
            .unwrap()
            .is_empty());
        assert!(matches!(
            create_destination_folder(root.path(), " "),
            Err(DestinationError::EmptyFolderName)
        ));
    }
}
