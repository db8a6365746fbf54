//! Download scheduler.
//!
//! Runs a batch of assets through a fixed-size worker pool. Each asset goes
//! through the same pipeline: skip when there is no URL, completeness check,
//! then the retry controller around a resumable transfer.

mod outcome;
mod pipeline;
mod pool;
mod progress;

pub use outcome::{AssetOutcome, AssetReport, BatchSummary};
pub use pool::{run_batch, BatchOptions};
pub use progress::{BatchEvent, ProgressReporter, ProgressStats};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AerialsConfig;
use crate::retry::RetryPolicy;
use crate::transfer::{CurlFetcher, CurlOptions, Fetcher};

/// Everything a worker needs to process one asset. Shared read-only by all workers.
pub struct Engine {
    fetcher: Arc<dyn Fetcher>,
    dest_dir: PathBuf,
    retry_policy: RetryPolicy,
    progress_interval: Duration,
}

impl Engine {
    pub fn new(fetcher: Arc<dyn Fetcher>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            dest_dir: dest_dir.into(),
            retry_policy: RetryPolicy::default(),
            progress_interval: Duration::from_millis(500),
        }
    }

    /// libcurl engine with retry, progress and TLS settings taken from `cfg`.
    pub fn from_config(cfg: &AerialsConfig, dest_dir: impl Into<PathBuf>) -> Self {
        let fetcher = CurlFetcher::new(CurlOptions {
            tls_verify: cfg.tls_verify,
            ..CurlOptions::default()
        });
        Self::new(Arc::new(fetcher), dest_dir)
            .with_retry_policy(cfg.retry_policy())
            .with_progress_interval(cfg.progress_interval())
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}
