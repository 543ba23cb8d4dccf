//! Last element of a URL path.

use std::ffi::OsString;

/// Returns the last element of a `/`-separated URL path after percent-decoding.
///
/// Trailing slashes are removed before taking the last element. An empty path
/// yields `"."`, a path consisting only of slashes yields `"/"`. Decoded bytes
/// are kept as-is on unix, so escapes that are not valid UTF-8 still name the
/// file byte for byte.
pub fn url_path_basename(path: &str) -> OsString {
    let decoded = percent_decode(path);
    if decoded.is_empty() {
        return OsString::from(".");
    }
    let end = match decoded.iter().rposition(|&b| b != b'/') {
        Some(i) => i + 1,
        None => return OsString::from("/"),
    };
    let trimmed = &decoded[..end];
    let start = trimmed.iter().rposition(|&b| b == b'/').map_or(0, |i| i + 1);
    bytes_to_os_string(&trimmed[start..])
}

#[cfg(unix)]
fn bytes_to_os_string(bytes: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStrExt;
    std::ffi::OsStr::from_bytes(bytes).to_os_string()
}

#[cfg(not(unix))]
fn bytes_to_os_string(bytes: &[u8]) -> OsString {
    OsString::from(String::from_utf8_lossy(bytes).into_owned())
}

/// Decodes `%XX` escapes; malformed escapes are kept literally.
fn percent_decode(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                out.push(h << 4 | l);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
