//! Retry loop: run an attempt until success, a fatal fault, or the attempt cap.

use std::fmt;

use super::classify;
use super::error::TransferError;
use super::policy::{RetryDecision, RetryPolicy};

/// Lifecycle of one asset under the retry controller.
///
/// `Pending -> Attempting -> {Complete | Retrying -> Attempting | Abandoned}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Pending,
    Attempting { attempt: u32 },
    Retrying { attempt: u32, delay: std::time::Duration },
    Complete { attempts: u32 },
    Abandoned { attempts: u32 },
}

/// Terminal failure: the last error and how many attempts were made.
#[derive(Debug)]
pub struct Abandoned {
    pub attempts: u32,
    pub error: TransferError,
}

impl fmt::Display for Abandoned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if classify::is_retryable(&self.error) {
            write!(
                f,
                "maximum retries reached after {} attempt(s): {}",
                self.attempts, self.error
            )
        } else {
            write!(f, "{}", self.error)
        }
    }
}

impl std::error::Error for Abandoned {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Runs `attempt_fn` until it succeeds or the retry policy says to stop.
///
/// `attempt_fn` receives the 1-based attempt number. On a retryable failure
/// the loop sleeps for the backoff duration then tries again; the attempt is
/// expected to resume from whatever state the previous one left behind.
/// `on_state` observes every state transition. Returns the value and the
/// number of attempts used.
pub fn run_with_retry<T, F, S>(
    policy: &RetryPolicy,
    mut on_state: S,
    mut attempt_fn: F,
) -> Result<(T, u32), Abandoned>
where
    F: FnMut(u32) -> Result<T, TransferError>,
    S: FnMut(AttemptState),
{
    on_state(AttemptState::Pending);
    let mut attempt = 1u32;
    loop {
        on_state(AttemptState::Attempting { attempt });
        match attempt_fn(attempt) {
            Ok(value) => {
                on_state(AttemptState::Complete { attempts: attempt });
                return Ok((value, attempt));
            }
            Err(error) => {
                let kind = classify::classify(&error);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => {
                        on_state(AttemptState::Abandoned { attempts: attempt });
                        return Err(Abandoned {
                            attempts: attempt,
                            error,
                        });
                    }
                    RetryDecision::RetryAfter(delay) => {
                        tracing::debug!(attempt, ?kind, ?delay, "retryable transfer error: {}", error);
                        on_state(AttemptState::Retrying { attempt, delay });
                        if !delay.is_zero() {
                            std::thread::sleep(delay);
                        }
                        attempt += 1;
                    }
                }
            }
        }
    }
}
