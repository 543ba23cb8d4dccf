//! Pre-run diagnostic: log the process environment with secrets masked.

const SECRET_MARKERS: &[&str] = &["PASSWORD", "TOKEN", "SECRET", "AUTHORIZATION", "KEY"];

fn is_secret(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    SECRET_MARKERS.iter().any(|m| upper.contains(m))
}

/// `NAME=value` for every variable, sorted by name; secret-looking values masked.
pub(super) fn redacted_environment<I>(vars: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut lines: Vec<String> = vars
        .into_iter()
        .map(|(k, v)| {
            if is_secret(&k) && !v.is_empty() {
                format!("{}=<redacted>", k)
            } else {
                format!("{}={}", k, v)
            }
        })
        .collect();
    lines.sort();
    lines
}

pub(super) fn log_environment() {
    for line in redacted_environment(std::env::vars_os().map(|(k, v)| {
        (
            k.to_string_lossy().into_owned(),
            v.to_string_lossy().into_owned(),
        )
    })) {
        tracing::info!("env {}", line);
    }
}
