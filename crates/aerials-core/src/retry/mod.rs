//! Retry and backoff policy.
//!
//! This module encapsulates error classification (timeouts, throttling,
//! dropped or truncated streams) and exponential backoff decisions so the
//! scheduler can retry a transfer in place, resuming from its staging file.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status, is_retryable};
pub use error::TransferError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, Abandoned, AttemptState};
