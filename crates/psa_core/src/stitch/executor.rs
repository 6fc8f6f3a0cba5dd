//! Stitch job: validate inputs, write the list file, run the tool.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use super::command::{concat_args, format_command, hidden_command, EncodeSettings};
use super::manifest::write_manifest;
use super::{StitchError, StitchResult};
use crate::clips::{ClipCategory, SourceLayout};
use crate::destination::DestinationLayout;
use crate::logging::RunLogger;

/// One concatenation of ordered MS clips into a single output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StitchJob {
    /// Run destination (the folder holding `PSAs`).
    pub destination_dir: PathBuf,
    /// Input files in playback order.
    pub sources: Vec<PathBuf>,
    /// File name written under `PSAs/MS`.
    pub output_filename: String,
    /// External tool executable.
    pub tool_path: PathBuf,
}

impl StitchJob {
    /// Build a job from clip names, resolving each under the source `MS` folder.
    ///
    /// Resolution only joins paths; [`StitchJob::validate`] checks existence.
    pub fn from_clips(
        source: &SourceLayout,
        order: &[String],
        destination_dir: impl Into<PathBuf>,
        output_filename: impl Into<String>,
        tool_path: impl Into<PathBuf>,
    ) -> Self {
        let sources = order
            .iter()
            .map(|name| source.resolve(ClipCategory::Ms, name).primary)
            .collect();
        Self {
            destination_dir: destination_dir.into(),
            sources,
            output_filename: output_filename.into(),
            tool_path: tool_path.into(),
        }
    }

    /// Full path of the stitched output.
    pub fn output_path(&self) -> PathBuf {
        DestinationLayout::new(&self.destination_dir)
            .ms_dir()
            .join(&self.output_filename)
    }

    /// Every input must exist. The first missing one fails the whole job.
    pub fn validate(&self) -> StitchResult<()> {
        if self.sources.is_empty() {
            return Err(StitchError::NoInputs);
        }
        if let Some(missing) = self.sources.iter().find(|p| !p.is_file()) {
            return Err(StitchError::MissingSourceFile {
                path: missing.clone(),
            });
        }
        Ok(())
    }

    /// Inputs as absolute paths for the concat list.
    ///
    /// Relative list entries resolve against the list file's folder, not
    /// the working directory the inputs were validated in.
    pub fn manifest_entries(&self) -> StitchResult<Vec<PathBuf>> {
        self.sources
            .iter()
            .map(|p| std::path::absolute(p).map_err(|e| StitchError::io("resolve clip path", e)))
            .collect()
    }

    /// Validate, then run the tool. Returns the output path.
    ///
    /// The temporary list file is removed whether the tool succeeds or not.
    pub fn run(&self, logger: &RunLogger, encode: &EncodeSettings) -> StitchResult<PathBuf> {
        self.validate()?;

        let output_path = self.output_path();
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| StitchError::io("create output folder", e))?;
        }

        let entries = self.manifest_entries()?;
        let manifest =
            write_manifest(&entries).map_err(|e| StitchError::io("write concat list", e))?;
        let args = concat_args(&manifest, &output_path, encode);
        logger.command(&format_command(&self.tool_path, &args));

        let output = hidden_command(&self.tool_path)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| StitchError::Spawn {
                tool: self.tool_path.clone(),
                source: e,
            })?;
        drop(manifest);

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            logger.output_line(line, true);
        }

        if !output.status.success() {
            logger.show_tail(&tool_label(&self.tool_path));
            let message = match stderr.trim() {
                "" => format!("{} failed", tool_label(&self.tool_path)),
                text => text.to_string(),
            };
            return Err(StitchError::ToolFailed {
                exit_code: output.status.code(),
                message,
            });
        }

        Ok(output_path)
    }
}

fn tool_label(tool: &Path) -> String {
    tool.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ffmpeg".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogConfig;
    use tempfile::tempdir;

    fn order(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolves_inputs_under_ms_folder() {
        let job = StitchJob::from_clips(
            &SourceLayout::new("/src"),
            &order(&["b", "a"]),
            "/dest/Fall/Week 1",
            "out.mp4",
            "ffmpeg",
        );
        assert_eq!(
            job.sources,
            vec![PathBuf::from("/src/MS/b.mp4"), PathBuf::from("/src/MS/a.mp4")]
        );
        assert_eq!(
            job.output_path(),
            PathBuf::from("/dest/Fall/Week 1/PSAs/MS/out.mp4")
        );
    }

    #[test]
    fn missing_input_fails_before_invoking_tool() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        fs::create_dir(source.path().join("MS")).unwrap();
        fs::write(source.path().join("MS/a.mp4"), b"").unwrap();

        // A tool path that cannot be spawned proves no invocation happened:
        // a spawn attempt would surface as StitchError::Spawn instead.
        let job = StitchJob::from_clips(
            &SourceLayout::new(source.path()),
            &order(&["a", "gone"]),
            dest.path(),
            "out.mp4",
            dest.path().join("no-such-tool"),
        );
        let logger = RunLogger::detached("test", LogConfig::default(), None);

        let err = job.run(&logger, &EncodeSettings::default()).unwrap_err();
        match err {
            StitchError::MissingSourceFile { path } => {
                assert_eq!(path, source.path().join("MS").join("gone.mp4"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!job.output_path().parent().unwrap().exists());
    }

    #[test]
    fn relative_source_root_gives_absolute_entries() {
        let job = StitchJob::from_clips(
            &SourceLayout::new("weekly_src"),
            &order(&["a", "b"]),
            "/dest",
            "out.mp4",
            "ffmpeg",
        );
        let cwd = std::env::current_dir().unwrap();

        let entries = job.manifest_entries().unwrap();
        assert!(entries.iter().all(|p| p.is_absolute()));
        assert_eq!(
            entries,
            vec![cwd.join("weekly_src/MS/a.mp4"), cwd.join("weekly_src/MS/b.mp4")]
        );
    }

    #[test]
    fn empty_order_is_rejected() {
        let job = StitchJob::from_clips(&SourceLayout::new("/src"), &[], "/dest", "o.mp4", "ffmpeg");
        assert!(matches!(job.validate(), Err(StitchError::NoInputs)));
    }

    #[test]
    fn unspawnable_tool_is_reported() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        fs::create_dir(source.path().join("MS")).unwrap();
        fs::write(source.path().join("MS/a.mp4"), b"").unwrap();

        let job = StitchJob::from_clips(
            &SourceLayout::new(source.path()),
            &order(&["a"]),
            dest.path(),
            "out.mp4",
            dest.path().join("no-such-tool"),
        );
        let logger = RunLogger::detached("test", LogConfig::default(), None);

        assert!(matches!(
            job.run(&logger, &EncodeSettings::default()),
            Err(StitchError::Spawn { .. })
        ));
    }
}
