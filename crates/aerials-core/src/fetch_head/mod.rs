//! HTTP HEAD / metadata probing.
//!
//! Uses the curl crate (libcurl) to learn the remote `Content-Length` before a
//! transfer starts and when checking whether a local file is already complete.

mod parse;

use parse::parse_headers;
pub(crate) use parse::parse_status_line;

use std::str;
use std::time::Duration;

use crate::retry::TransferError;
use crate::transfer::{configure_easy, CurlOptions};

/// Result of a HEAD request: the headers the transfer task relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadResult {
    /// Total size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
    /// True if server sent `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
}

impl HeadResult {
    /// Remote size with "unknown" collapsed to 0.
    pub fn expected_total(&self) -> u64 {
        self.content_length.unwrap_or(0)
    }
}

/// Performs a HEAD request and returns parsed metadata.
///
/// Follows redirects; only the headers of the final response are kept.
/// Blocks the current thread.
pub fn probe(url: &str, opts: &CurlOptions) -> Result<HeadResult, TransferError> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    configure_easy(&mut easy, url, opts).map_err(TransferError::Curl)?;
    easy.nobody(true).map_err(TransferError::Curl)?; // HEAD request
    easy.timeout(Duration::from_secs(30))
        .map_err(TransferError::Curl)?;

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(TransferError::Curl)?;
        transfer.perform().map_err(TransferError::Curl)?;
    }

    let code = easy.response_code().map_err(TransferError::Curl)?;
    if !(200..300).contains(&code) {
        return Err(TransferError::Http(code));
    }

    Ok(parse_headers(&headers))
}
