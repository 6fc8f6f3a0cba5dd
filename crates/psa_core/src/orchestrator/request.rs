//! Run request validation and the immutable run payload.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::errors::ValidationError;
use crate::clips::{ClipCategory, SourceLayout};
use crate::copy::CopyJob;
use crate::destination::resolve_destination;
use crate::naming::{apply_variant_token, build_base_filename, ensure_extension};
use crate::variants::Variant;

/// Everything the user chose for one run, as captured by the front end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub source_root: PathBuf,
    pub dest_root: PathBuf,
    /// Folder inside `dest_root` (campaign or off-week folder).
    pub folder: String,
    /// Week number text. Ignored for off-week folders.
    pub week: String,
    /// Checked RS clip names.
    pub rs_selected: Vec<String>,
    /// Variants to stitch, usually `VariantManager::run_targets`.
    pub variants: Vec<Variant>,
    pub date_token: String,
    pub initials: String,
    /// Output name overriding the date/initials template when non-blank.
    pub custom_filename: String,
}

/// One variant to stitch, with its final file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StitchSpec {
    pub variant: String,
    pub order: Vec<String>,
    pub output_filename: String,
}

/// Validated, immutable description of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPayload {
    pub source_dir: PathBuf,
    pub destination_dir: PathBuf,
    pub copy: CopyJob,
    /// Non-empty variants in creation order.
    pub stitches: Vec<StitchSpec>,
    /// Output name before variant tokens are applied.
    pub base_filename: String,
}

impl RunPayload {
    /// Whether neither copy nor stitch work exists.
    pub fn is_empty(&self) -> bool {
        self.copy.is_empty() && self.stitches.is_empty()
    }

    pub fn has_stitch_work(&self) -> bool {
        !self.stitches.is_empty()
    }
}

impl RunRequest {
    /// Validate the request and build the payload.
    ///
    /// Checks destination root, folder and week first. A request without
    /// any work yields an empty payload. MS work additionally needs the
    /// source `MS` folder and a non-blank output name.
    pub fn validate(&self) -> Result<RunPayload, ValidationError> {
        let destination_dir = resolve_destination(&self.dest_root, &self.folder, &self.week)?;

        let variants: Vec<Variant> = self
            .variants
            .iter()
            .filter(|v| !v.is_empty())
            .map(|v| Variant::new(v.effective_name(), v.order.clone()))
            .collect();
        let has_ms_work = !variants.is_empty();

        let copy = CopyJob::new(
            destination_dir.clone(),
            self.rs_selected.clone(),
            self.source_root.clone(),
        );

        let custom = self.custom_filename.trim();
        let base_filename = if custom.is_empty() {
            ensure_extension(&build_base_filename(&self.date_token, &self.initials))
        } else {
            ensure_extension(custom)
        };

        if copy.is_empty() && !has_ms_work {
            return Ok(RunPayload {
                source_dir: self.source_root.clone(),
                destination_dir,
                copy,
                stitches: Vec::new(),
                base_filename,
            });
        }

        if has_ms_work {
            let ms_dir = SourceLayout::new(&self.source_root).category_dir(ClipCategory::Ms);
            if !ms_dir.is_dir() {
                return Err(ValidationError::MsFolderMissing(ms_dir));
            }
            if base_filename.is_empty() {
                return Err(ValidationError::MissingFilename);
            }
        }

        let stitches = variants
            .into_iter()
            .map(|v| StitchSpec {
                output_filename: apply_variant_token(&base_filename, &v.name),
                variant: v.name,
                order: v.order,
            })
            .collect();

        Ok(RunPayload {
            source_dir: self.source_root.clone(),
            destination_dir,
            copy,
            stitches,
            base_filename,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::DestinationError;
    use std::fs;
    use tempfile::tempdir;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn request(source: &std::path::Path, dest: &std::path::Path) -> RunRequest {
        RunRequest {
            source_root: source.to_path_buf(),
            dest_root: dest.to_path_buf(),
            folder: "Fall".into(),
            week: "2".into(),
            date_token: "0614".into(),
            initials: "JD".into(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_request_is_no_work_without_writes() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();

        let payload = request(source.path(), dest.path()).validate().unwrap();
        assert!(payload.is_empty());
        assert_eq!(payload.destination_dir, dest.path().join("Fall").join("Week 2"));
        assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
    }

    #[test]
    fn destination_errors_come_first() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let mut req = request(source.path(), dest.path());
        req.week = "x".into();

        assert!(matches!(
            req.validate(),
            Err(ValidationError::Destination(DestinationError::InvalidWeek(_)))
        ));
    }

    #[test]
    fn ms_work_needs_ms_folder() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let mut req = request(source.path(), dest.path());
        req.variants = vec![Variant::new("MS", names(&["a"]))];

        assert!(matches!(req.validate(), Err(ValidationError::MsFolderMissing(_))));
    }

    #[test]
    fn ms_work_needs_filename() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        fs::create_dir(source.path().join("MS")).unwrap();
        let mut req = request(source.path(), dest.path());
        req.initials = " ".into();
        req.variants = vec![Variant::new("MS", names(&["a"]))];

        assert!(matches!(req.validate(), Err(ValidationError::MissingFilename)));

        req.custom_filename = "Custom Spot".into();
        let payload = req.validate().unwrap();
        assert_eq!(payload.base_filename, "Custom Spot.mp4");
        assert_eq!(payload.stitches[0].output_filename, "Custom Spot_MS.mp4");
    }

    #[test]
    fn rs_only_run_skips_ms_checks() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let mut req = request(source.path(), dest.path());
        req.initials.clear();
        req.rs_selected = names(&["promo"]);

        let payload = req.validate().unwrap();
        assert!(!payload.is_empty());
        assert!(!payload.has_stitch_work());
    }

    #[test]
    fn variants_become_named_outputs() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        fs::create_dir(source.path().join("MS")).unwrap();
        let mut req = request(source.path(), dest.path());
        req.variants = vec![
            Variant::new(" North ", names(&["a", "b"])),
            Variant::new("Empty", vec![]),
            Variant::new("", names(&["c"])),
        ];

        let payload = req.validate().unwrap();
        let outputs: Vec<(&str, &str)> = payload
            .stitches
            .iter()
            .map(|s| (s.variant.as_str(), s.output_filename.as_str()))
            .collect();
        assert_eq!(
            outputs,
            vec![
                ("North", "Main_PSA_0614_North_1920x1080_H.264_JD.mp4"),
                ("MS", "Main_PSA_0614_MS_1920x1080_H.264_JD.mp4"),
            ]
        );
    }

    #[test]
    fn off_week_folder_needs_no_week() {
        let source = tempdir().unwrap();
        let dest = tempdir().unwrap();
        let mut req = request(source.path(), dest.path());
        req.folder = "Summer Off Week".into();
        req.week.clear();

        let payload = req.validate().unwrap();
        assert_eq!(payload.destination_dir, dest.path().join("Summer Off Week"));
    }
}
