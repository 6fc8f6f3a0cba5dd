//! External tool discovery and on-demand download.
//!
//! Lookup order: explicit override, then each search directory (install
//! directory, bundled-binary folder, working directory, executable
//! directory) for each recognized name, then the system `PATH`. If nothing
//! is found the release archive is downloaded once and the executable is
//! cached in the bundled-binary folder.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::ZipArchive;

/// Errors locating or downloading the external tool.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{name} not found and no download URL is configured")]
    NotFound { name: String },

    #[error("Configured tool path does not exist: {0}")]
    OverrideMissing(PathBuf),

    #[error("Failed to download {url}: {message}")]
    Download { url: String, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to read downloaded archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Could not find {0} in downloaded archive")]
    MemberMissing(String),

    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl ToolError {
    fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Platform executable name (`ffmpeg.exe` on Windows, `ffmpeg` elsewhere).
pub fn platform_bin(name: &str) -> String {
    if cfg!(windows) {
        format!("{name}.exe")
    } else {
        name.to_string()
    }
}

/// Finds (or fetches) the external tool.
#[derive(Debug, Clone)]
pub struct ToolLocator {
    /// Base program name, used for `PATH` lookup and the cached download.
    program: String,
    /// Recognized executable names, checked in order in every search dir.
    names: Vec<String>,
    /// Directories searched before `PATH`.
    search_dirs: Vec<PathBuf>,
    /// Folder the downloaded executable is cached in.
    bin_dir: PathBuf,
    /// Release archive URL. Empty disables downloading.
    download_url: String,
    /// Explicit tool path that bypasses discovery.
    override_path: Option<PathBuf>,
    /// Whether to fall back to the system `PATH`.
    use_system_path: bool,
    /// Directories used instead of the `PATH` variable, if set.
    path_dirs: Option<Vec<PathBuf>>,
}

impl ToolLocator {
    /// Locator for `ffmpeg` rooted at the application base directory.
    ///
    /// Search dirs: `base_dir`, `base_dir/bin_dir_name`, the current
    /// directory and the running executable's directory.
    pub fn new(
        base_dir: &Path,
        bin_dir_name: &str,
        names: Vec<String>,
        download_url: impl Into<String>,
    ) -> Self {
        let bin_dir = base_dir.join(bin_dir_name);
        let mut search_dirs = vec![base_dir.to_path_buf(), bin_dir.clone()];
        if let Ok(cwd) = env::current_dir() {
            search_dirs.push(cwd);
        }
        if let Some(exe_dir) = env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf))
        {
            search_dirs.push(exe_dir);
        }
        search_dirs.dedup();

        Self {
            program: "ffmpeg".to_string(),
            names,
            search_dirs,
            bin_dir,
            download_url: download_url.into(),
            override_path: None,
            use_system_path: true,
            path_dirs: None,
        }
    }

    /// Use `path` directly instead of searching.
    pub fn with_override(mut self, path: Option<PathBuf>) -> Self {
        self.override_path = path;
        self
    }

    /// Replace the search directories.
    pub fn with_search_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.search_dirs = dirs;
        self
    }

    /// Enable or disable the `PATH` fallback.
    pub fn with_system_path(mut self, enabled: bool) -> Self {
        self.use_system_path = enabled;
        self
    }

    /// Search these directories instead of the `PATH` variable.
    pub fn with_path_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.path_dirs = Some(dirs);
        self
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// Look for an already available executable.
    pub fn find_existing(&self) -> Option<PathBuf> {
        for dir in &self.search_dirs {
            for name in &self.names {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }

        if self.use_system_path {
            return self.find_on_path();
        }
        None
    }

    /// Executable `program` on the system search path.
    fn find_on_path(&self) -> Option<PathBuf> {
        match &self.path_dirs {
            Some(dirs) => {
                let paths = env::join_paths(dirs).ok()?;
                let cwd = env::current_dir().ok()?;
                which::which_in(&self.program, Some(paths), cwd).ok()
            }
            None => which::which(&self.program).ok(),
        }
    }

    /// Return a usable tool path, downloading it if necessary.
    pub fn ensure(&self) -> Result<PathBuf, ToolError> {
        if let Some(ref path) = self.override_path {
            if path.is_file() {
                return Ok(path.clone());
            }
            return Err(ToolError::OverrideMissing(path.clone()));
        }

        if let Some(found) = self.find_existing() {
            tracing::debug!("Using {} at {}", self.program, found.display());
            return Ok(found);
        }

        if self.download_url.trim().is_empty() {
            return Err(ToolError::NotFound {
                name: self.program.clone(),
            });
        }

        tracing::info!("{} not found, downloading from {}", self.program, self.download_url);
        download_tool(&self.download_url, &self.bin_dir, &platform_bin(&self.program))
    }
}


/// Download a zip archive and extract the member ending in `bin/{exe_name}`
/// into `bin_dir/{exe_name}`.
pub fn download_tool(url: &str, bin_dir: &Path, exe_name: &str) -> Result<PathBuf, ToolError> {
    fs::create_dir_all(bin_dir).map_err(|e| ToolError::io("create bin folder", e))?;

    let client = reqwest::blocking::Client::builder()
        .user_agent("PSA-Tool")
        .build()?;
    let mut response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(ToolError::Download {
            url: url.to_string(),
            message: format!("HTTP {}", response.status()),
        });
    }

    let mut archive_file = tempfile::Builder::new()
        .suffix(".zip")
        .tempfile()
        .map_err(|e| ToolError::io("create temp archive", e))?;
    io::copy(&mut response, archive_file.as_file_mut())
        .map_err(|e| ToolError::io("write temp archive", e))?;

    let target = bin_dir.join(exe_name);
    let reader = archive_file
        .reopen()
        .map_err(|e| ToolError::io("reopen temp archive", e))?;
    extract_member(reader, &format!("bin/{exe_name}"), &target)?;

    tracing::info!("Cached {} at {}", exe_name, target.display());
    Ok(target)
}

/// Copy the first archive file whose name ends with `suffix` to `target`.
fn extract_member<R: io::Read + io::Seek>(
    reader: R,
    suffix: &str,
    target: &Path,
) -> Result<(), ToolError> {
    let mut archive = ZipArchive::new(reader)?;
    let suffix = suffix.to_lowercase();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if !entry.is_file() {
            continue;
        }
        let normalized = entry.name().replace('\\', "/").to_lowercase();
        if !normalized.ends_with(&suffix) {
            continue;
        }

        let mut output =
            fs::File::create(target).map_err(|e| ToolError::io("create tool binary", e))?;
        io::copy(&mut entry, &mut output).map_err(|e| ToolError::io("extract tool binary", e))?;
        make_executable(target)?;
        return Ok(());
    }

    Err(ToolError::MemberMissing(suffix))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), ToolError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .map_err(|e| ToolError::io("mark tool executable", e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), ToolError> {
    Ok(())
}
