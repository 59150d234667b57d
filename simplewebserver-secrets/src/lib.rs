use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Directories where container platforms conventionally mount secrets and config maps.
pub const SECRET_ROOTS: [&str; 3] = ["/var/run/secrets", "/config", "/secrets"];

/// Lists every file and directory below each of the supplied roots.
///
/// The result holds the paths of all roots concatenated and sorted as plain strings, so
/// `/config/a-b` sorts before `/config/a/b`. Roots themselves are not part of the output.
///
/// # Walking rules
/// - A root that does not exist, or is not a directory, contributes nothing.
/// - Symbolic links are reported but never followed.
/// - Paths are rendered lossily when they are not valid UTF-8.
///
/// # Errors
/// Returns [`ScanError`] for any other I/O failure, e.g. a subdirectory that cannot be read.
///
/// # Examples
/// ```no_run
/// use simplewebserver_secrets::{SECRET_ROOTS, enumerate};
///
/// let paths = enumerate(&SECRET_ROOTS).expect("scan secret mounts");
/// assert!(paths.windows(2).all(|pair| pair[0] <= pair[1]));
/// ```
pub fn enumerate<P: AsRef<Path>>(roots: &[P]) -> Result<Vec<String>, ScanError> {
    let mut found = Vec::new();
    for root in roots {
        walk_root(root.as_ref(), &mut found)?;
    }

    let mut paths: Vec<String> = found
        .into_iter()
        .map(|path| path.to_string_lossy().into_owned())
        .collect();
    paths.sort();
    Ok(paths)
}

fn walk_root(root: &Path, found: &mut Vec<PathBuf>) -> Result<(), ScanError> {
    match fs::read_dir(root) {
        Ok(entries) => walk_entries(root, entries, found),
        Err(err)
            if matches!(
                err.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
            ) =>
        {
            Ok(())
        }
        Err(source) => Err(ScanError::ReadDir {
            path: root.to_path_buf(),
            source,
        }),
    }
}

fn walk_entries(
    dir: &Path,
    entries: fs::ReadDir,
    found: &mut Vec<PathBuf>,
) -> Result<(), ScanError> {
    for entry in entries {
        let entry = entry.map_err(|source| ScanError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(entry.file_name());
        // file_type() does not traverse symlinks
        let file_type = entry.file_type().map_err(|source| ScanError::Inspect {
            path: path.clone(),
            source,
        })?;

        found.push(path.clone());
        if file_type.is_dir() {
            let children = fs::read_dir(&path).map_err(|source| ScanError::ReadDir {
                path: path.clone(),
                source,
            })?;
            walk_entries(&path, children, found)?;
        }
    }

    Ok(())
}

/// Errors raised while walking the secret roots.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read directory {path:?}: {source}")]
    ReadDir { path: PathBuf, source: io::Error },
    #[error("failed to inspect {path:?}: {source}")]
    Inspect { path: PathBuf, source: io::Error },
}
