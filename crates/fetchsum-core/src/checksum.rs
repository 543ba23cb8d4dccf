//! Post-download checksum verification.
//!
//! Digests are computed by re-reading the finished file rather than inline with
//! the transfer. A file that fails verification is removed before the error is
//! returned so a corrupt artifact never looks like a successful download.

use crate::error::{FetchError, Result};
use md5::Md5;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Digest algorithms that can be verified, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Md5,
    Sha256,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Md5 => "md5",
            Algorithm::Sha256 => "sha256",
        }
    }

    /// Hex digest of the file at `path` with this algorithm.
    pub fn hex_digest_path(self, path: &Path) -> io::Result<String> {
        match self {
            Algorithm::Md5 => digest_path::<Md5>(path),
            Algorithm::Sha256 => digest_path::<Sha256>(path),
        }
    }
}

/// Reads `path` in chunks through `D` and returns the lowercase hex digest.
pub fn digest_path<D: Digest>(path: &Path) -> io::Result<String> {
    let mut f = File::open(path)?;
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compute SHA-256 of a file and return the digest as lowercase hex.
pub fn sha256_path(path: &Path) -> io::Result<String> {
    digest_path::<Sha256>(path)
}

/// Compute MD5 of a file and return the digest as lowercase hex.
pub fn md5_path(path: &Path) -> io::Result<String> {
    digest_path::<Md5>(path)
}

/// Verifies every non-empty expected digest against the file at `path`,
/// MD5 first, then SHA-256. The first failure removes the file and is returned.
pub fn verify_file(path: &Path, expected_md5: &str, expected_sha256: &str) -> Result<()> {
    let checks = [
        (Algorithm::Md5, expected_md5),
        (Algorithm::Sha256, expected_sha256),
    ];
    for (algorithm, expected) in checks {
        if expected.is_empty() {
            continue;
        }
        if let Err(e) = verify_one(path, algorithm, expected) {
            remove_artifact(path);
            return Err(e);
        }
    }
    Ok(())
}

fn verify_one(path: &Path, algorithm: Algorithm, expected: &str) -> Result<()> {
    let got = algorithm
        .hex_digest_path(path)
        .map_err(|source| FetchError::ChecksumIo {
            path: path.to_path_buf(),
            source,
        })?;
    if got != expected {
        return Err(FetchError::ChecksumMismatch {
            algorithm: algorithm.name(),
            got,
            expected: expected.to_string(),
        });
    }
    tracing::debug!("{} checksum ok: {}", algorithm.name(), got);
    Ok(())
}

fn remove_artifact(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::warn!("removed {} after failed verification", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("could not remove {}: {}", path.display(), e),
    }
}
