//! libcurl handle setup: timeouts, TLS trust, proxies, redirects, credentials.
//!
//! Proxy settings come from the environment (`http_proxy`, `https_proxy`,
//! `all_proxy`, `no_proxy`), which libcurl reads on its own. Root certificates
//! come from the system store libcurl was built against.

use crate::config::FetchConfig;
use crate::error::{FetchError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::time::Duration;

/// Total time allowed for connect, TLS handshake and body transfer.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Upper bound on redirect hops.
pub const MAX_REDIRECTS: u32 = 10;

const USER_AGENT: &str = concat!("fetchsum/", env!("CARGO_PKG_VERSION"));

const INIT: &str = "initializing request";

/// `Authorization` header lines for `cfg`.
///
/// Basic credentials come first when both user and password are set; a raw
/// `authorization` value is added as a second header, not as a replacement.
pub fn auth_headers(cfg: &FetchConfig) -> Vec<String> {
    let mut headers = Vec::new();
    if cfg.has_basic_auth() {
        let token = STANDARD.encode(format!("{}:{}", cfg.username, cfg.password));
        headers.push(format!("Authorization: Basic {}", token));
    }
    if !cfg.authorization.is_empty() {
        headers.push(format!("Authorization: {}", cfg.authorization));
    }
    headers
}

/// Builds a GET handle for `cfg.source`.
pub fn build_easy(cfg: &FetchConfig) -> Result<curl::easy::Easy> {
    let mut easy = curl::easy::Easy::new();
    easy.url(&cfg.source).map_err(FetchError::request(INIT))?;
    easy.get(true).map_err(FetchError::request(INIT))?;
    easy.useragent(USER_AGENT).map_err(FetchError::request(INIT))?;
    easy.timeout(REQUEST_TIMEOUT)
        .map_err(FetchError::request(INIT))?;
    easy.follow_location(true)
        .map_err(FetchError::request(INIT))?;
    easy.max_redirections(MAX_REDIRECTS)
        .map_err(FetchError::request(INIT))?;

    if cfg.skip_verify {
        tracing::warn!("TLS certificate verification disabled for {}", cfg.source);
        easy.ssl_verify_peer(false)
            .map_err(FetchError::request(INIT))?;
        easy.ssl_verify_host(false)
            .map_err(FetchError::request(INIT))?;
    }

    let headers = auth_headers(cfg);
    if !headers.is_empty() {
        let mut list = curl::easy::List::new();
        for h in &headers {
            list.append(h).map_err(FetchError::request(INIT))?;
        }
        easy.http_headers(list)
            .map_err(FetchError::request(INIT))?;
        // Keep credentials on every hop, including redirects to another host.
        easy.unrestricted_auth(true)
            .map_err(FetchError::request(INIT))?;
        tracing::debug!(
            basic = cfg.has_basic_auth(),
            header = !cfg.authorization.is_empty(),
            "credentials attached to request and redirects"
        );
    }

    Ok(easy)
}
