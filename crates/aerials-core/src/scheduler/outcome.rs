//! Terminal per-asset outcomes and the batch summary.

use std::fmt;

/// Where one asset ended up after the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    /// Published to the final path. `bytes` counts only bytes streamed in this run.
    Downloaded { bytes: u64, attempts: u32 },
    /// Final file already matched the remote length; nothing transferred.
    AlreadyComplete,
    /// Not attempted (no download URL).
    Skipped { reason: String },
    /// Fatal fault or retry budget exhausted. The staging file is kept.
    Abandoned { attempts: u32, error: String },
}

impl AssetOutcome {
    pub fn is_abandoned(&self) -> bool {
        matches!(self, AssetOutcome::Abandoned { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetOutcome::Downloaded { .. } => "downloaded",
            AssetOutcome::AlreadyComplete => "complete",
            AssetOutcome::Skipped { .. } => "skipped",
            AssetOutcome::Abandoned { .. } => "abandoned",
        }
    }
}

impl fmt::Display for AssetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetOutcome::Downloaded { bytes, attempts } => {
                write!(f, "downloaded {} bytes in {} attempt(s)", bytes, attempts)
            }
            AssetOutcome::AlreadyComplete => write!(f, "already complete"),
            AssetOutcome::Skipped { reason } => write!(f, "skipped: {}", reason),
            AssetOutcome::Abandoned { attempts, error } => {
                write!(f, "abandoned after {} attempt(s): {}", attempts, error)
            }
        }
    }
}

/// Outcome of one asset, tagged with its position in the batch input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReport {
    pub index: usize,
    pub id: String,
    pub label: String,
    pub outcome: AssetOutcome,
}

impl AssetReport {
    /// One-line diagnostic for an abandoned asset (label, id, attempts, last error).
    pub fn diagnostic(&self) -> Option<String> {
        match &self.outcome {
            AssetOutcome::Abandoned { attempts, error } => Some(format!(
                "failed to download '{}' ({}) after {} attempt(s): {}",
                self.label, self.id, attempts, error
            )),
            _ => None,
        }
    }
}

/// Result of [`run_batch`](super::run_batch): one report per input asset, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub reports: Vec<AssetReport>,
}

impl BatchSummary {
    fn count(&self, pred: impl Fn(&AssetOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn downloaded(&self) -> usize {
        self.count(|o| matches!(o, AssetOutcome::Downloaded { .. }))
    }

    pub fn already_complete(&self) -> usize {
        self.count(|o| matches!(o, AssetOutcome::AlreadyComplete))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, AssetOutcome::Skipped { .. }))
    }

    pub fn abandoned(&self) -> usize {
        self.count(AssetOutcome::is_abandoned)
    }

    pub fn bytes_transferred(&self) -> u64 {
        self.reports
            .iter()
            .map(|r| match r.outcome {
                AssetOutcome::Downloaded { bytes, .. } => bytes,
                _ => 0,
            })
            .sum()
    }

    pub fn abandoned_reports(&self) -> impl Iterator<Item = &AssetReport> {
        self.reports.iter().filter(|r| r.outcome.is_abandoned())
    }
}
