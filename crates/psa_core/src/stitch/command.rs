//! External tool command line for concatenation.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

#[cfg(windows)]
use std::os::windows::process::CommandExt;

/// Windows flag to prevent child processes from creating visible console windows.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Create a Command that won't spawn a visible console window on Windows.
pub fn hidden_command<S: AsRef<std::ffi::OsStr>>(program: S) -> Command {
    let mut cmd = Command::new(program);
    #[cfg(windows)]
    cmd.creation_flags(CREATE_NO_WINDOW);
    cmd
}

/// Re-encode parameters. Inputs are re-encoded rather than stream-copied so
/// clips with differing encodes still produce one playable output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeSettings {
    pub video_codec: String,
    pub preset: String,
    pub crf: u8,
    pub audio_codec: String,
    pub audio_bitrate: String,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            preset: "fast".to_string(),
            crf: 23,
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
        }
    }
}

/// Arguments for concatenating `manifest` into `output`.
///
/// Overwrites the output, reads the list with the concat demuxer and allows
/// absolute paths in it (`-safe 0`).
pub fn concat_args(manifest: &Path, output: &Path, encode: &EncodeSettings) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-f", "concat", "-safe", "0", "-i"]
        .iter()
        .map(OsString::from)
        .collect();
    args.push(manifest.as_os_str().to_owned());
    let crf = encode.crf.to_string();
    args.extend(
        [
            "-c:v",
            encode.video_codec.as_str(),
            "-preset",
            encode.preset.as_str(),
            "-crf",
            crf.as_str(),
            "-c:a",
            encode.audio_codec.as_str(),
            "-b:a",
            encode.audio_bitrate.as_str(),
        ]
        .iter()
        .map(OsString::from),
    );
    args.push(output.as_os_str().to_owned());
    args
}

/// Render a command line for the run log.
pub fn format_command(program: &Path, args: &[OsString]) -> String {
    std::iter::once(program.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(|a| {
            let s = a.to_string_lossy();
            if s.contains(' ') {
                format!("\"{}\"", s)
            } else {
                s.into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn concat_args_match_contract() {
        let args = concat_args(
            Path::new("/tmp/list.txt"),
            Path::new("/dest/PSAs/MS/out.mp4"),
            &EncodeSettings::default(),
        );
        assert_eq!(
            strings(&args),
            vec![
                "-y", "-f", "concat", "-safe", "0", "-i", "/tmp/list.txt", "-c:v", "libx264",
                "-preset", "fast", "-crf", "23", "-c:a", "aac", "-b:a", "128k",
                "/dest/PSAs/MS/out.mp4",
            ]
        );
    }

    #[test]
    fn format_command_quotes_spaces() {
        let args = vec![OsString::from("-i"), OsString::from("my list.txt")];
        assert_eq!(
            format_command(Path::new("ffmpeg"), &args),
            "ffmpeg -i \"my list.txt\""
        );
    }
}
