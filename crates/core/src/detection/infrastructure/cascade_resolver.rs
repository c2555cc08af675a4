use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::CASCADE_DIR_ENV;

const SYSTEM_CASCADE_DIRS: &[&str] = &[
    "/usr/share/opencv4/haarcascades",
    "/usr/local/share/opencv4/haarcascades",
    "/usr/share/opencv/haarcascades",
];

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("cascade {name} not found (searched: {})", format_dirs(.searched))]
    NotFound { name: String, searched: Vec<PathBuf> },
}

fn format_dirs(dirs: &[PathBuf]) -> String {
    dirs.iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve a cascade file by name.
///
/// Resolution order:
/// 1. `override_dir` (e.g. from the command line)
/// 2. `$FACEWATCH_CASCADE_DIR`
/// 3. User data directory (platform-specific)
/// 4. `assets/cascades` next to the executable, then in the working directory
/// 5. System OpenCV installs
pub fn resolve(name: &str, override_dir: Option<&Path>) -> Result<PathBuf, ResolveError> {
    resolve_in(name, &search_dirs(override_dir))
}

/// First `dir/name` that exists among `dirs`.
pub fn resolve_in(name: &str, dirs: &[PathBuf]) -> Result<PathBuf, ResolveError> {
    dirs.iter()
        .map(|d| d.join(name))
        .find(|p| p.is_file())
        .ok_or_else(|| ResolveError::NotFound {
            name: name.to_string(),
            searched: dirs.to_vec(),
        })
}

pub fn search_dirs(override_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(dir) = override_dir {
        dirs.push(dir.to_path_buf());
    }
    if let Some(dir) = env::var_os(CASCADE_DIR_ENV).filter(|v| !v.is_empty()) {
        dirs.push(PathBuf::from(dir));
    }
    if let Some(dir) = cascade_data_dir() {
        dirs.push(dir);
    }
    if let Some(exe_dir) = env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        dirs.push(exe_dir.join("assets").join("cascades"));
    }
    dirs.push(PathBuf::from("assets").join("cascades"));
    dirs.extend(SYSTEM_CASCADE_DIRS.iter().map(PathBuf::from));
    dirs
}

/// Platform-specific user cascade directory.
///
/// - macOS: `~/Library/Application Support/Facewatch/cascades/`
/// - Linux: `$XDG_DATA_HOME/Facewatch/cascades/` or `~/.local/share/Facewatch/cascades/`
/// - Windows: `%APPDATA%/Facewatch/cascades/`
pub fn cascade_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("Facewatch").join("cascades"))
}
