//! Locating and reading dump files.

use super::ImportError;
use glob::MatchOptions;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// Read a dump as UTF-8; a missing file yields `None`.
///
/// A file that exists but cannot be read (permissions, invalid UTF-8) is
/// an error.
pub fn read_dump(path: &Path) -> Result<Option<String>, ImportError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == IoErrorKind::NotFound => {
            info!(path = %path.display(), "dump not found, nothing to import");
            Ok(None)
        }
        Err(source) => Err(ImportError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// `*.sql` files directly under `dir` (extension case-insensitive), sorted.
///
/// A missing directory yields an empty list.
pub fn secondary_files(dir: &Path) -> Result<Vec<PathBuf>, ImportError> {
    if !dir.is_dir() {
        info!(dir = %dir.display(), "data directory not found, nothing to import");
        return Ok(Vec::new());
    }

    let pattern = format!(
        "{}/*.sql",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let options = MatchOptions {
        case_sensitive: false,
        ..Default::default()
    };

    let entries = glob::glob_with(&pattern, options)
        .map_err(|e| ImportError::Pattern(format!("{}: {}", pattern, e)))?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => {
                let path = e.path().to_path_buf();
                return Err(ImportError::Io {
                    path,
                    source: e.into_error(),
                });
            }
        }
    }

    files.sort();
    Ok(files)
}
