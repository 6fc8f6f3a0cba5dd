//! RS copy job.
//!
//! Copies each selected `.mov` and its `Music/*.wav` companion into the run
//! destination. Missing source files are skipped and reported, not fatal:
//! partial RS source sets are normal. I/O failures on files that do exist
//! abort the job.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::clips::{ClipCategory, SourceLayout};
use crate::destination::DestinationLayout;

/// Error copying a file that exists.
#[derive(Error, Debug)]
#[error("Failed to copy {from} to {to}: {source}")]
pub struct CopyError {
    pub from: PathBuf,
    pub to: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Copy of the selected RS clips into one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyJob {
    /// Run destination (the folder holding `PSAs`).
    pub destination_dir: PathBuf,
    /// Clip names to copy.
    pub names: Vec<String>,
    /// Source root.
    pub source_dir: PathBuf,
}

/// What a copy job did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Destination paths of copied primary clips.
    pub copied_primary: Vec<PathBuf>,
    /// Destination paths of copied companion audio.
    pub copied_companion: Vec<PathBuf>,
    /// Names whose primary file was absent.
    pub missing_primary: Vec<String>,
    /// Names whose companion audio was absent.
    pub missing_companion: Vec<String>,
}

impl CopyReport {
    pub fn total_copied(&self) -> usize {
        self.copied_primary.len() + self.copied_companion.len()
    }
}

impl CopyJob {
    pub fn new(
        destination_dir: impl Into<PathBuf>,
        names: Vec<String>,
        source_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            destination_dir: destination_dir.into(),
            names,
            source_dir: source_dir.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Run the copy. The destination skeleton must already exist.
    pub fn run(&self) -> Result<CopyReport, CopyError> {
        let source = SourceLayout::new(&self.source_dir);
        let dest = DestinationLayout::new(&self.destination_dir);
        let rs_dir = dest.rs_dir();
        let music_dir = dest.music_dir();

        let mut report = CopyReport::default();

        for name in &self.names {
            let clip = source.resolve(ClipCategory::Rs, name);

            match copy_into(&clip.primary, &rs_dir)? {
                Some(copied) => report.copied_primary.push(copied),
                None => {
                    tracing::warn!("RS clip not found, skipping: {}", clip.primary.display());
                    report.missing_primary.push(name.clone());
                }
            }

            if let Some(companion) = &clip.companion {
                match copy_into(companion, &music_dir)? {
                    Some(copied) => report.copied_companion.push(copied),
                    None => {
                        tracing::debug!("No music for '{}'", name);
                        report.missing_companion.push(name.clone());
                    }
                }
            }
        }

        tracing::info!(
            "Copied {} RS clip(s) and {} music file(s)",
            report.copied_primary.len(),
            report.copied_companion.len()
        );
        Ok(report)
    }
}

/// Copy `src` into `dir` keeping its file name and modification time.
/// `None` if `src` is absent.
fn copy_into(src: &Path, dir: &Path) -> Result<Option<PathBuf>, CopyError> {
    if !src.is_file() {
        return Ok(None);
    }
    let file_name = src.file_name().unwrap_or(src.as_os_str());
    let target = dir.join(file_name);
    copy_with_mtime(src, &target).map_err(|e| CopyError {
        from: src.to_path_buf(),
        to: target.clone(),
        source: e,
    })?;
    Ok(Some(target))
}

fn copy_with_mtime(src: &Path, target: &Path) -> io::Result<()> {
    fs::copy(src, target)?;
    let modified = fs::metadata(src)?.modified()?;
    File::options().write(true).open(target)?.set_modified(modified)
}
