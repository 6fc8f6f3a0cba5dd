//! Output filename policy for stitched MS files.
//!
//! The base name follows a fixed template with a literal `_MS_` marker that
//! each variant may replace with its own token (campus, version, ...).

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

/// Canonical extension for stitched output.
pub const VIDEO_EXTENSION: &str = ".mp4";

/// Token used when a variant has no name.
pub const DEFAULT_VARIANT_TOKEN: &str = "MS";

/// Marker substring in the template that a variant token replaces.
const VARIANT_MARKER: &str = "_MS_";

/// Build the templated base filename from a date token and initials.
///
/// Returns an empty string if either token is blank after trimming.
pub fn build_base_filename(date_token: &str, initials: &str) -> String {
    let date = date_token.trim();
    let initials = initials.trim();
    if date.is_empty() || initials.is_empty() {
        return String::new();
    }
    format!("Main_PSA_{date}_MS_1920x1080_H.264_{initials}{VIDEO_EXTENSION}")
}

/// Apply a variant token to a base filename.
///
/// If the base contains the `_MS_` marker, exactly that one occurrence is
/// replaced by `_{token}_`. Otherwise `_{token}` is inserted before the
/// extension (`.mp4` is used when the base has none). A blank token falls
/// back to `MS`.
pub fn apply_variant_token(base_filename: &str, token: &str) -> String {
    let token = match token.trim() {
        "" => DEFAULT_VARIANT_TOKEN,
        t => t,
    };

    if base_filename.contains(VARIANT_MARKER) {
        return base_filename.replacen(VARIANT_MARKER, &format!("_{token}_"), 1);
    }

    let (stem, ext) = split_extension(base_filename);
    let ext = if ext.is_empty() { VIDEO_EXTENSION } else { ext };
    format!("{stem}_{token}{ext}")
}

/// Append `.mp4` unless the name already ends with it (case-insensitive).
///
/// A blank name stays blank.
pub fn ensure_extension(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    if name.to_ascii_lowercase().ends_with(VIDEO_EXTENSION) {
        return name.to_string();
    }
    format!("{name}{VIDEO_EXTENSION}")
}

/// `MMDD` of the next Saturday on or after `today`.
///
/// Used as the default date token (first play date).
pub fn next_saturday_mmdd(today: NaiveDate) -> String {
    let days_ahead = (Weekday::Sat.num_days_from_monday() + 7
        - today.weekday().num_days_from_monday())
        % 7;
    let target = today + Duration::days(i64::from(days_ahead));
    target.format("%m%d").to_string()
}

/// Default date token for today's local date.
pub fn default_date_token() -> String {
    next_saturday_mmdd(Local::now().date_naive())
}

/// Split `name` into stem and extension (with dot).
///
/// Leading dots of a bare name are not treated as an extension, and dots in
/// directory components are ignored.
fn split_extension(name: &str) -> (&str, &str) {
    let file_start = name.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    let file = &name[file_start..];
    let leading_dots = file.len() - file.trim_start_matches('.').len();

    match file.rfind('.') {
        Some(dot) if dot >= leading_dots && dot > 0 => name.split_at(file_start + dot),
        _ => (name, ""),
    }
}
