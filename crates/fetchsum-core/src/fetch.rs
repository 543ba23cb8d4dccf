//! Single-stream HTTP GET into the destination file.
//!
//! The body is written to disk as libcurl hands it over; nothing beyond one
//! receive buffer is held in memory. Only the body of a final `200 OK`
//! response is written: redirect hops and error bodies are discarded.

use crate::error::{FetchError, Result};
use std::cell::{Cell, RefCell};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str;

const EXECUTE: &str = "executing request";
const CREATE: &str = "creating destination";
const COPY: &str = "copying destination";

/// Performs the transfer configured on `easy` and streams a `200 OK` body into
/// `dest`, truncating any existing file. Returns the number of bytes written.
///
/// Non-200 final status is `HttpStatus` and leaves `dest` untouched. The file
/// handle is closed before returning on every path.
pub fn download_to(easy: &mut curl::easy::Easy, dest: &Path) -> Result<u64> {
    let status = Cell::new(0u32);
    let written = Cell::new(0u64);
    let file: RefCell<Option<File>> = RefCell::new(None);
    let write_error: RefCell<Option<FetchError>> = RefCell::new(None);

    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|line| {
                if let Some(code) = parse_status_line(line) {
                    tracing::debug!("response status {}", code);
                    status.set(code);
                }
                true
            })
            .map_err(FetchError::request(EXECUTE))?;
        transfer
            .write_function(|data| {
                if status.get() != 200 {
                    return Ok(data.len());
                }
                match write_chunk(&file, dest, data) {
                    Ok(()) => {
                        written.set(written.get() + data.len() as u64);
                        Ok(data.len())
                    }
                    Err(e) => {
                        *write_error.borrow_mut() = Some(e);
                        Ok(0) // abort transfer
                    }
                }
            })
            .map_err(FetchError::request(EXECUTE))?;
        transfer.perform()
    };

    if let Some(e) = write_error.into_inner() {
        return Err(e);
    }
    performed.map_err(FetchError::request(EXECUTE))?;

    let code = easy.response_code().map_err(FetchError::request(EXECUTE))?;
    if code != 200 {
        return Err(FetchError::http_status(code));
    }

    let file = match file.into_inner() {
        Some(f) => f,
        // 200 with an empty body never reaches the write callback.
        None => File::create(dest).map_err(FetchError::write(CREATE, dest))?,
    };
    file.sync_all().map_err(FetchError::write(COPY, dest))?;
    drop(file);

    let n = written.get();
    tracing::info!("wrote {} bytes to {}", n, dest.display());
    Ok(n)
}

fn write_chunk(file: &RefCell<Option<File>>, dest: &Path, data: &[u8]) -> Result<()> {
    let mut slot = file.borrow_mut();
    if slot.is_none() {
        *slot = Some(File::create(dest).map_err(FetchError::write(CREATE, dest))?);
    }
    if let Some(f) = slot.as_mut() {
        f.write_all(data).map_err(FetchError::write(COPY, dest))?;
    }
    Ok(())
}

/// Status code from a raw `HTTP/x y reason` header line, if it is one.
pub(crate) fn parse_status_line(line: &[u8]) -> Option<u32> {
    let line = str::from_utf8(line).ok()?.trim_end();
    if !line.starts_with("HTTP/") {
        return None;
    }
    let mut parts = line.split_whitespace();
    parts.next()?;
    parts.next()?.parse::<u32>().ok()
}
