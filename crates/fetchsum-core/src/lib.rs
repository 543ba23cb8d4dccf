//! Fetch one resource over HTTP(S), write it to disk and verify its digest.

pub mod checksum;
pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod resolve;
pub mod run;

pub use config::FetchConfig;
pub use error::FetchError;
pub use run::execute;
