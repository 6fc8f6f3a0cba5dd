//! Clip name to source path resolution.
//!
//! Resolution is pure path joining. Existence checks belong to the caller:
//! the copy job tolerates missing files, the stitch job does not.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Sub-folder holding stitchable MS clips.
pub const MS_FOLDER: &str = "MS";

/// Sub-folder holding RS companion audio.
pub const MUSIC_FOLDER: &str = "Music";

/// Clip category inside the source root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClipCategory {
    /// Loose `.mov` files in the source root, copied with optional `.wav` music.
    Rs,
    /// `.mp4` files in the `MS` sub-folder, stitched in user order.
    Ms,
}

impl ClipCategory {
    /// Extension (with dot, lowercase) of the primary media file.
    pub fn extension(&self) -> &'static str {
        match self {
            ClipCategory::Rs => ".mov",
            ClipCategory::Ms => ".mp4",
        }
    }

    /// Extension of the companion audio file, if the category has one.
    pub fn companion_extension(&self) -> Option<&'static str> {
        match self {
            ClipCategory::Rs => Some(".wav"),
            ClipCategory::Ms => None,
        }
    }

    /// Get display string for UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipCategory::Rs => "RS",
            ClipCategory::Ms => "MS",
        }
    }
}

impl std::fmt::Display for ClipCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected files for one clip name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedClip {
    pub name: String,
    pub primary: PathBuf,
    pub companion: Option<PathBuf>,
}

/// Layout of a source root on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    root: PathBuf,
}

impl SourceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder that holds the primary files of a category.
    pub fn category_dir(&self, category: ClipCategory) -> PathBuf {
        match category {
            ClipCategory::Rs => self.root.clone(),
            ClipCategory::Ms => self.root.join(MS_FOLDER),
        }
    }

    /// Folder that holds RS companion audio.
    pub fn music_dir(&self) -> PathBuf {
        self.root.join(MUSIC_FOLDER)
    }

    /// Resolve a clip name to its expected files.
    pub fn resolve(&self, category: ClipCategory, name: &str) -> ResolvedClip {
        let primary = self
            .category_dir(category)
            .join(format!("{}{}", name, category.extension()));
        let companion = category
            .companion_extension()
            .map(|ext| self.music_dir().join(format!("{}{}", name, ext)));

        ResolvedClip {
            name: name.to_string(),
            primary,
            companion,
        }
    }
}
