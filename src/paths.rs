//! XDG-compliant resolution of the on-disk store location.
//!
//! `resolve_store_path` is pure in the environment: for a fixed
//! `XDG_DATA_HOME`/`HOME`, it always returns the same path.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Maximum path length we're willing to build. This is a sanity bound, not
/// a filesystem limit; we fail fast rather than hand the kernel a path it
/// will reject anyway.
const MAX_PATH: usize = 4096;

const APP_DIR: &str = "typetrace";
const DB_FILE: &str = "TypeTrace.db";

#[derive(Debug, Error)]
pub enum PathError {
    #[error("neither XDG_DATA_HOME nor HOME is set")]
    NoDataRoot,

    #[error("resolved store path exceeds {MAX_PATH} bytes")]
    PathTooLong,

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves `${XDG_DATA_HOME}/typetrace/TypeTrace.db`, falling back to
/// `${HOME}/.local/share/typetrace/TypeTrace.db` when `XDG_DATA_HOME` is
/// unset or empty.
pub fn resolve_store_path() -> Result<PathBuf, PathError> {
    let data_root = env::var("XDG_DATA_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            env::var("HOME")
                .ok()
                .filter(|v| !v.is_empty())
                .map(|home| Path::new(&home).join(".local").join("share"))
        })
        .ok_or(PathError::NoDataRoot)?;

    let path = data_root.join(APP_DIR).join(DB_FILE);

    if path.as_os_str().len() > MAX_PATH {
        return Err(PathError::PathTooLong);
    }

    Ok(path)
}

/// Creates every missing ancestor directory of `path` with owner-rwx
/// permissions, tolerating directories that already exist.
pub fn ensure_parents(path: &Path) -> Result<(), PathError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true).mode(0o700);
        match builder.create(parent) {
            Ok(()) => Ok(()),
            Err(source) if parent.is_dir() => {
                let _ = source;
                Ok(())
            }
            Err(source) => Err(PathError::CreateDir {
                path: parent.to_path_buf(),
                source,
            }),
        }
    }

    #[cfg(not(unix))]
    {
        fs::create_dir_all(parent).map_err(|source| PathError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })
    }
}
