//! Destination resolution.
//!
//! Turns the source URL and the optional destination hint into the concrete
//! file path the executor writes to, creating missing parent directories.

mod basename;

pub use basename::url_path_basename;

use crate::error::{FetchError, Result};
use std::ffi::OsString;
use std::fs::DirBuilder;
use std::path::{is_separator, Path, PathBuf};
use url::Url;

/// Resolves the file path for `source` given the destination hint.
///
/// - empty `destination`: basename of the URL path in the current directory
///   (no directory creation);
/// - `destination` ending in a separator: that directory joined with the
///   basename, directory created if missing;
/// - anything else: `destination` as-is, parent directory created if missing.
pub fn resolve_destination(source: &Url, destination: &str) -> Result<PathBuf> {
    if destination.is_empty() {
        return Ok(PathBuf::from(url_path_basename(source.path())));
    }

    let resolved = if destination.ends_with(is_separator) {
        let mut joined = OsString::from(destination);
        joined.push(url_path_basename(source.path()));
        PathBuf::from(joined)
    } else {
        PathBuf::from(destination)
    };

    if let Some(parent) = resolved.parent() {
        create_parent_dirs(parent)?;
    }
    Ok(resolved)
}

fn create_parent_dirs(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o777);
    }
    builder
        .create(dir)
        .map_err(|source| FetchError::DirectoryCreation {
            path: dir.to_path_buf(),
            source,
        })?;
    tracing::debug!("ensured directory {}", dir.display());
    Ok(())
}
