//! Concat demuxer list files.
//!
//! One `file '<path>'` line per input, in playback order. Paths use forward
//! slashes on every host, and a single quote is written as `'\''` (close the
//! quoted string, escaped quote, reopen).

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::TempPath;

/// Escape a path for a concat list entry.
pub fn escape_manifest_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .replace('\'', r"'\''")
}

/// Render the full list file content.
pub fn build_manifest(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("file '{}'\n", escape_manifest_path(p)))
        .collect()
}

/// Write the list to a fresh temporary `.txt` file.
///
/// The file is deleted when the returned path is dropped, on success and
/// failure alike.
pub fn write_manifest(paths: &[PathBuf]) -> io::Result<TempPath> {
    let mut file = tempfile::Builder::new()
        .prefix("psa_concat_")
        .suffix(".txt")
        .tempfile()?;
    file.write_all(build_manifest(paths).as_bytes())?;
    file.flush()?;
    Ok(file.into_temp_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(
            escape_manifest_path(Path::new(r"C:\Clips\Bob's intro.mp4")),
            r"C:/Clips/Bob'\''s intro.mp4"
        );
        assert_eq!(escape_manifest_path(Path::new("/src/MS/a.mp4")), "/src/MS/a.mp4");
    }

    #[test]
    fn separators_normalize_the_same_way() {
        let windows = escape_manifest_path(Path::new(r"\\server\share\MS\a.mp4"));
        let posix = escape_manifest_path(Path::new("//server/share/MS/a.mp4"));
        assert_eq!(windows, posix);
    }

    #[test]
    fn manifest_keeps_order_and_duplicates() {
        let paths = vec![
            PathBuf::from("/s/MS/b.mp4"),
            PathBuf::from("/s/MS/a.mp4"),
            PathBuf::from("/s/MS/b.mp4"),
        ];
        assert_eq!(
            build_manifest(&paths),
            "file '/s/MS/b.mp4'\nfile '/s/MS/a.mp4'\nfile '/s/MS/b.mp4'\n"
        );
    }

    #[test]
    fn temp_manifest_is_removed_on_drop() {
        let manifest = write_manifest(&[PathBuf::from("/s/MS/a.mp4")]).unwrap();
        let path = manifest.to_path_buf();
        assert!(path.to_string_lossy().ends_with(".txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "file '/s/MS/a.mp4'\n");

        drop(manifest);
        assert!(!path.exists());
    }
}
