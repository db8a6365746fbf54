//! Transfer task: one resumable download of one asset.
//!
//! HEAD probe for the remote length, ranged GET from the staging file's
//! current size, sequential append to the staging file, size check, then an
//! atomic rename onto the final path. A failed attempt leaves the staging file
//! in place so the next attempt (or the next run) resumes from it.

mod curl_fetcher;
mod resume;
mod staging;

pub use curl_fetcher::{CurlFetcher, CurlOptions};
pub(crate) use curl_fetcher::configure_easy;
pub use resume::{plan_resume, ResumePlan};
pub use staging::{publish, staging_len, AssetPaths, LocalState, StagingWriter};

use std::path::Path;

use crate::fetch_head::HeadResult;
use crate::retry::TransferError;
use crate::scheduler::ProgressReporter;

/// Network side of a transfer. `CurlFetcher` is the production implementation.
pub trait Fetcher: Send + Sync {
    /// HEAD-equivalent metadata probe.
    fn probe(&self, url: &str) -> Result<HeadResult, TransferError>;

    /// GET with `Range: bytes=<offset>-`, handing body chunks to `sink` in order.
    ///
    /// Implementations must only deliver bytes starting at `offset`: a server
    /// that ignores the range yields `RangeIgnored` before any chunk is handed
    /// over. A sink error aborts the transfer as `TransferError::Storage`.
    /// Returns the number of bytes delivered.
    fn fetch_from(
        &self,
        url: &str,
        offset: u64,
        sink: &mut dyn FnMut(&[u8]) -> std::io::Result<()>,
    ) -> Result<u64, TransferError>;
}

/// Runs one transfer attempt. Returns the bytes streamed by this attempt.
pub fn transfer_asset(
    fetcher: &dyn Fetcher,
    url: &str,
    paths: &AssetPaths,
    progress: &mut ProgressReporter,
) -> Result<u64, TransferError> {
    let head = fetcher.probe(url)?;
    let expected_total = head.expected_total();
    let staged = staging_len(&paths.staging_path)?;
    let plan = plan_resume(staged, expected_total);

    let offset = match plan {
        ResumePlan::Publish => {
            tracing::debug!(path = %paths.staging_path.display(), "staging file already complete");
            progress.finish(staged, expected_total);
            publish(&paths.staging_path, &paths.final_path)?;
            return Ok(0);
        }
        ResumePlan::Restart { stale } => {
            tracing::info!(
                path = %paths.staging_path.display(),
                stale,
                expected_total,
                "staging file larger than remote, restarting"
            );
            0
        }
        ResumePlan::Fresh => 0,
        ResumePlan::Resume { offset } => {
            if !head.accept_ranges {
                // A 200 reply still fails as RangeIgnored.
                tracing::warn!(offset, expected_total, "server does not advertise byte ranges, resuming anyway");
            } else {
                tracing::debug!(offset, expected_total, "resuming from staging file");
            }
            offset
        }
    };

    let mut writer = StagingWriter::open(&paths.staging_path, offset)?;
    let mut done = offset;
    progress.begin(offset, expected_total);

    let fetched = fetcher.fetch_from(url, offset, &mut |chunk: &[u8]| {
        writer.write_chunk(chunk)?;
        done += chunk.len() as u64;
        progress.update(done, expected_total);
        Ok(())
    });

    let streamed = match fetched {
        Ok(n) => n,
        // Unknown remote length and a staging file that already holds everything.
        Err(TransferError::Http(416)) if offset > 0 && expected_total == 0 => 0,
        Err(e) => return Err(e),
    };

    writer.sync()?;
    progress.finish(done, expected_total);

    if expected_total > 0 && done != expected_total {
        return Err(TransferError::PartialTransfer {
            expected: expected_total,
            received: done,
        });
    }

    writer.finalize(&paths.final_path)?;
    Ok(streamed)
}

/// True when `final_path` exists and its size equals the remote length from a fresh probe.
/// A failed probe counts as "not complete"; the transfer path reports the real error.
pub fn is_complete(fetcher: &dyn Fetcher, url: &str, final_path: &Path) -> bool {
    let local = match std::fs::metadata(final_path) {
        Ok(m) if m.is_file() => m.len(),
        _ => return false,
    };
    match fetcher.probe(url) {
        Ok(head) => head.expected_total() == local,
        Err(e) => {
            tracing::debug!(path = %final_path.display(), "completeness probe failed: {}", e);
            false
        }
    }
}
