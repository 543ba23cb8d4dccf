//! CLI for the fetchsum pipeline step.
//!
//! Every flag can also come from a `PLUGIN_*` environment variable, which is
//! how pipeline runners hand plugin settings to the container.

mod env_dump;

use anyhow::{bail, Context, Result};
use clap::Parser;
use fetchsum_core::{config, FetchConfig};
use std::path::PathBuf;

/// Download one file over HTTP(S) and verify its checksum.
#[derive(Debug, Parser)]
#[command(name = "fetchsum", version)]
#[command(about = "Download one file over HTTP(S) and verify its checksum", long_about = None)]
pub struct Cli {
    /// URL of the resource to download.
    #[arg(long, env = "PLUGIN_SOURCE", value_name = "URL")]
    pub source: Option<String>,

    /// Target file, or directory when it ends with a path separator. Defaults to the URL's file name.
    #[arg(long, env = "PLUGIN_DESTINATION", value_name = "PATH")]
    pub destination: Option<String>,

    /// Raw Authorization header value, sent on every request and redirect.
    #[arg(long, env = "PLUGIN_AUTHORIZATION", hide_env_values = true)]
    pub authorization: Option<String>,

    /// Username for HTTP basic auth (requires --password).
    #[arg(long, env = "PLUGIN_USERNAME")]
    pub username: Option<String>,

    /// Password for HTTP basic auth (requires --username).
    #[arg(long, env = "PLUGIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Disable TLS certificate and hostname verification. Insecure.
    #[arg(long, env = "PLUGIN_SKIP_VERIFY")]
    pub skip_verify: bool,

    /// Expected MD5 of the downloaded file (lowercase hex).
    #[arg(long, env = "PLUGIN_MD5", value_name = "HEX")]
    pub md5: Option<String>,

    /// Expected SHA-256 of the downloaded file (lowercase hex).
    #[arg(long, env = "PLUGIN_SHA256", value_name = "HEX")]
    pub sha256: Option<String>,

    /// TOML file with default settings; flags and environment override it.
    #[arg(long, env = "PLUGIN_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Append logs to this file instead of stderr.
    #[arg(long, env = "PLUGIN_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log the process environment (secrets masked) before running.
    #[arg(long, env = "PLUGIN_PRINT_ENV")]
    pub print_env: bool,
}

impl Cli {
    /// Builds the run configuration: config file first, then non-empty flag values.
    pub fn to_config(&self) -> Result<FetchConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load(path)?,
            None => FetchConfig::default(),
        };

        override_if_set(&mut cfg.source, &self.source);
        override_if_set(&mut cfg.destination, &self.destination);
        override_if_set(&mut cfg.authorization, &self.authorization);
        override_if_set(&mut cfg.username, &self.username);
        override_if_set(&mut cfg.password, &self.password);
        override_if_set(&mut cfg.md5, &self.md5);
        override_if_set(&mut cfg.sha256, &self.sha256);
        cfg.skip_verify |= self.skip_verify;

        if cfg.source.is_empty() {
            bail!("no source given (use --source or PLUGIN_SOURCE)");
        }
        Ok(cfg)
    }

    pub fn run(&self) -> Result<()> {
        if self.print_env {
            env_dump::log_environment();
        }

        let cfg = self.to_config()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let path = fetchsum_core::execute(&cfg)
            .with_context(|| format!("fetching {}", cfg.source))?;
        tracing::info!("saved {}", path.display());
        Ok(())
    }
}

fn override_if_set(field: &mut String, value: &Option<String>) {
    if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
        *field = v.to_string();
    }
}
