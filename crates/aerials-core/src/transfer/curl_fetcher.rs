//! libcurl-backed [`Fetcher`]: HEAD probe and open-ended ranged GET.

use std::cell::Cell;
use std::io;
use std::str;
use std::time::Duration;

use curl::easy::Easy;

use super::Fetcher;
use crate::fetch_head::{self, parse_status_line, HeadResult};
use crate::retry::TransferError;

/// Connection settings shared by the probe and the ranged GET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurlOptions {
    /// Verify the peer certificate and host name. Off for the asset CDN.
    pub tls_verify: bool,
    pub connect_timeout: Duration,
    /// Abort when throughput stays below this many bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            tls_verify: false,
            connect_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
        }
    }
}

/// URL, redirects, connect timeout and TLS verification, common to every request.
pub(crate) fn configure_easy(
    easy: &mut Easy,
    url: &str,
    opts: &CurlOptions,
) -> Result<(), curl::Error> {
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.ssl_verify_peer(opts.tls_verify)?;
    easy.ssl_verify_host(opts.tls_verify)?;
    Ok(())
}

/// Why the write callback stopped the transfer.
enum Abort {
    Storage(io::Error),
    RangeIgnored,
}

#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    opts: CurlOptions,
}

impl CurlFetcher {
    pub fn new(opts: CurlOptions) -> Self {
        Self { opts }
    }
}

impl Fetcher for CurlFetcher {
    fn probe(&self, url: &str) -> Result<HeadResult, TransferError> {
        fetch_head::probe(url, &self.opts)
    }

    fn fetch_from(
        &self,
        url: &str,
        offset: u64,
        sink: &mut dyn FnMut(&[u8]) -> io::Result<()>,
    ) -> Result<u64, TransferError> {
        let status = Cell::new(0u32);
        let mut delivered = 0u64;
        let mut abort: Option<Abort> = None;

        let mut easy = Easy::new();
        configure_easy(&mut easy, url, &self.opts).map_err(TransferError::Curl)?;
        // Low-speed abort instead of a wall-clock cap: large files on slow links must not be killed.
        easy.low_speed_limit(self.opts.low_speed_limit)
            .map_err(TransferError::Curl)?;
        easy.low_speed_time(self.opts.low_speed_time)
            .map_err(TransferError::Curl)?;
        // curl takes "start-" and sends `Range: bytes=start-`.
        easy.range(&format!("{}-", offset))
            .map_err(TransferError::Curl)?;

        let perform_result = {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|data| {
                    // A new status line per redirect hop; the last one wins.
                    if let Some(code) = str::from_utf8(data).ok().and_then(parse_status_line) {
                        status.set(code);
                    }
                    true
                })
                .map_err(TransferError::Curl)?;
            transfer
                .write_function(|data| {
                    let code = status.get();
                    if !(200..300).contains(&code) {
                        // Error page body; the status is reported after perform.
                        return Ok(data.len());
                    }
                    if offset > 0 && code != 206 {
                        abort = Some(Abort::RangeIgnored);
                        return Ok(0);
                    }
                    match sink(data) {
                        Ok(()) => {
                            delivered += data.len() as u64;
                            Ok(data.len())
                        }
                        Err(e) => {
                            abort = Some(Abort::Storage(e));
                            Ok(0) // abort transfer
                        }
                    }
                })
                .map_err(TransferError::Curl)?;
            transfer.perform()
        };

        if let Err(e) = perform_result {
            return Err(match abort.take() {
                Some(Abort::Storage(io_err)) => TransferError::Storage(io_err),
                Some(Abort::RangeIgnored) => TransferError::RangeIgnored { offset },
                None => TransferError::Curl(e),
            });
        }

        let code = easy.response_code().map_err(TransferError::Curl)?;
        if !(200..300).contains(&code) {
            return Err(TransferError::Http(code));
        }

        Ok(delivered)
    }
}
