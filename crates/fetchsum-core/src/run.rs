//! One fetch-and-verify run: parse, resolve, download, verify.

use crate::checksum;
use crate::client;
use crate::config::FetchConfig;
use crate::error::Result;
use crate::fetch;
use crate::resolve::resolve_destination;
use std::path::PathBuf;
use url::Url;

/// Downloads `cfg.source` to its resolved destination and checks any configured
/// digests. Returns the path of the verified (or unverified, if no digest was
/// given) artifact.
///
/// Every failure is terminal. A file that fails verification is deleted; a
/// file left behind by a failed transfer must be treated as invalid.
pub fn execute(cfg: &FetchConfig) -> Result<PathBuf> {
    let source = Url::parse(&cfg.source)?;
    let destination = resolve_destination(&source, &cfg.destination)?;
    tracing::info!("downloading {} to {}", source, destination.display());

    let mut easy = client::build_easy(cfg)?;
    fetch::download_to(&mut easy, &destination)?;
    drop(easy);

    if cfg.wants_checksum() {
        checksum::verify_file(&destination, &cfg.md5, &cfg.sha256)?;
        tracing::info!("checksum verified for {}", destination.display());
    }

    Ok(destination)
}
