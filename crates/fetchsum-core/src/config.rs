use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// Everything one fetch-and-verify run needs. Built once per invocation by the
/// caller (CLI flags, environment, or a TOML file) and never mutated by the core.
///
/// Empty strings mean "not set" for every optional field.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Absolute URL of the resource.
    pub source: String,
    /// Empty, a directory ending in a path separator, or a file path.
    pub destination: String,
    /// Raw `Authorization` header value sent on every request and redirect.
    pub authorization: String,
    /// Basic-auth user; only used when `password` is also set.
    pub username: String,
    /// Basic-auth password; only used when `username` is also set.
    pub password: String,
    /// Disables TLS certificate chain and hostname validation. Never on by default.
    pub skip_verify: bool,
    /// Expected lowercase hex MD5 of the downloaded file.
    pub md5: String,
    /// Expected lowercase hex SHA-256 of the downloaded file.
    pub sha256: String,
}

impl FetchConfig {
    /// Config for `source` with every other field unset.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// True when both basic-auth credentials are present.
    pub fn has_basic_auth(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    /// True when at least one digest is configured.
    pub fn wants_checksum(&self) -> bool {
        !self.md5.is_empty() || !self.sha256.is_empty()
    }
}

impl fmt::Debug for FetchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(s: &str) -> &str {
            if s.is_empty() {
                ""
            } else {
                "<redacted>"
            }
        }
        f.debug_struct("FetchConfig")
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("authorization", &redact(&self.authorization))
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("skip_verify", &self.skip_verify)
            .field("md5", &self.md5)
            .field("sha256", &self.sha256)
            .finish()
    }
}

/// Errors from loading a TOML config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config {path} failed")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {path} failed")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Load a `FetchConfig` from a TOML file. Missing keys stay at their defaults.
pub fn load(path: &Path) -> Result<FetchConfig, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}
