//! Error taxonomy for a single fetch-and-verify run.
//!
//! Every variant carries the stage that failed so pipeline logs point at the
//! step (source parsing, directory setup, transfer, write, verification).
//! Underlying causes are exposed through `source()`; print with `{:#}` via
//! anyhow (or walk the chain) to see them.

use std::path::PathBuf;

/// Result alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Terminal failure of a fetch-and-verify run. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The configured source is not a valid absolute URL.
    #[error("parsing source failed")]
    InvalidSourceUrl(#[from] url::ParseError),

    /// The parent directory of the resolved destination could not be created.
    #[error("parsing destination failed: cannot create {}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// libcurl rejected an option or the transfer failed (DNS, connect, TLS, timeout, reset).
    #[error("{stage} failed")]
    Request {
        stage: &'static str,
        #[source]
        source: curl::Error,
    },

    /// Final response status was not 200 OK.
    #[error("request failed, status {code} {status}")]
    HttpStatus { code: u32, status: String },

    /// Creating or writing the destination file failed.
    #[error("{stage} failed: {}", path.display())]
    Write {
        stage: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Computed digest differs from the expected one. The file has been removed.
    #[error("{algorithm} checksum doesn't match, got {got} and expected {expected}")]
    ChecksumMismatch {
        algorithm: &'static str,
        got: String,
        expected: String,
    },

    /// Re-reading the written file for verification failed. The file has been removed.
    #[error("failed to compare checksum: {}", path.display())]
    ChecksumIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub(crate) fn request(stage: &'static str) -> impl FnOnce(curl::Error) -> FetchError {
        move |source| FetchError::Request { stage, source }
    }

    pub(crate) fn write<'a>(
        stage: &'static str,
        path: &'a std::path::Path,
    ) -> impl FnOnce(std::io::Error) -> FetchError + 'a {
        move |source| FetchError::Write {
            stage,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Builds an `HttpStatus` error with the canonical reason phrase for `code`.
    pub fn http_status(code: u32) -> FetchError {
        let status = u16::try_from(code)
            .ok()
            .and_then(|c| http::StatusCode::from_u16(c).ok())
            .and_then(|c| c.canonical_reason())
            .unwrap_or("Unknown Status")
            .to_string();
        FetchError::HttpStatus { code, status }
    }
}
