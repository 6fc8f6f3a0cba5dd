//! Category folder listing.

use std::fs;
use std::path::Path;

use super::resolver::ClipCategory;
use super::{ClipError, ClipResult};

/// Listing of a category folder.
///
/// A missing folder is reported distinctly from an empty one so the UI can
/// tell "wrong source path" apart from "nothing here yet".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipListing {
    /// The folder does not exist (or is not a directory).
    Missing,
    /// Sorted clip base names found in the folder.
    Available(Vec<String>),
}

impl ClipListing {
    /// Clip names, empty when the folder is missing.
    pub fn names(&self) -> &[String] {
        match self {
            ClipListing::Missing => &[],
            ClipListing::Available(names) => names,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ClipListing::Missing)
    }

    /// Names containing `filter` (case-insensitive). A blank filter keeps all.
    pub fn filtered(&self, filter: &str) -> Vec<&str> {
        let needle = filter.to_lowercase();
        self.names()
            .iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }
}

/// List clip base names in `dir` whose extension matches `category`.
///
/// The extension check is case-insensitive and the extension is stripped
/// from the returned names. Sub-directories are ignored.
pub fn list_clips(dir: &Path, category: ClipCategory) -> ClipResult<ClipListing> {
    if !dir.is_dir() {
        return Ok(ClipListing::Missing);
    }

    let entries = fs::read_dir(dir).map_err(|e| ClipError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let ext = category.extension();
    let mut names = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| ClipError::ReadDir {
            path: dir.to_path_buf(),
            source: e,
        })?;

        if !entry.path().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        if file_name.len() > ext.len() && file_name.to_ascii_lowercase().ends_with(ext) {
            names.push(file_name[..file_name.len() - ext.len()].to_string());
        }
    }

    names.sort();
    Ok(ClipListing::Available(names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_folder_is_distinct_from_empty() {
        let dir = tempdir().unwrap();

        let missing = list_clips(&dir.path().join("nope"), ClipCategory::Ms).unwrap();
        assert!(missing.is_missing());

        let empty = list_clips(dir.path(), ClipCategory::Ms).unwrap();
        assert_eq!(empty, ClipListing::Available(vec![]));
    }

    #[test]
    fn lists_sorted_names_with_extension_stripped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.mov"), b"").unwrap();
        fs::write(dir.path().join("A.MOV"), b"").unwrap();
        fs::write(dir.path().join("c.mp4"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("folder.mov")).unwrap();

        let listing = list_clips(dir.path(), ClipCategory::Rs).unwrap();
        assert_eq!(
            listing,
            ClipListing::Available(vec!["A".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn filter_is_case_insensitive() {
        let listing = ClipListing::Available(vec![
            "Campus Intro".to_string(),
            "outro".to_string(),
            "INTRO short".to_string(),
        ]);

        assert_eq!(listing.filtered("intro"), vec!["Campus Intro", "INTRO short"]);
        assert_eq!(listing.filtered("").len(), 3);
        assert!(ClipListing::Missing.filtered("x").is_empty());
    }
}
