//! Transfer error type for retry classification.

use std::fmt;

use crate::url_model::UrlError;

/// Error returned by one transfer attempt (probe, ranged GET, or local write).
/// Kept typed so we can classify and decide retries before reporting.
#[derive(Debug)]
pub enum TransferError {
    /// Curl reported an error (connection reset, truncated body, timeout, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
    /// Body ended cleanly but the staging file is shorter than the remote length.
    PartialTransfer { expected: u64, received: u64 },
    /// Server answered a ranged request with the full body; appending it would corrupt the file.
    RangeIgnored { offset: u64 },
    /// Disk/storage failure (e.g. disk full, permission denied). Not retried.
    Storage(std::io::Error),
    /// Download URL unusable after sanitizing. Not retried.
    InvalidUrl(UrlError),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Curl(e) => write!(f, "{}", e),
            TransferError::Http(code) => write!(f, "HTTP {}", code),
            TransferError::PartialTransfer { expected, received } => {
                write!(f, "partial transfer: expected {} bytes, got {}", expected, received)
            }
            TransferError::RangeIgnored { offset } => {
                write!(f, "server ignored range request at offset {}", offset)
            }
            TransferError::Storage(e) => write!(f, "storage: {}", e),
            TransferError::InvalidUrl(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferError::Curl(e) => Some(e),
            TransferError::Storage(e) => Some(e),
            TransferError::InvalidUrl(e) => Some(e),
            TransferError::Http(_)
            | TransferError::PartialTransfer { .. }
            | TransferError::RangeIgnored { .. } => None,
        }
    }
}

impl From<std::io::Error> for TransferError {
    fn from(e: std::io::Error) -> Self {
        TransferError::Storage(e)
    }
}

impl From<UrlError> for TransferError {
    fn from(e: UrlError) -> Self {
        TransferError::InvalidUrl(e)
    }
}
