//! Progress reporting for transfers (bytes done, ETA, rate).
//!
//! Workers push [`BatchEvent`]s on an mpsc channel; the CLI renders them.
//! Consumers can compute rate = streamed bytes / elapsed_secs and
//! ETA = (total_bytes - bytes_done) / rate.

use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use super::outcome::AssetReport;

/// Snapshot of download progress for one asset (CLI-friendly).
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressStats {
    pub asset_id: String,
    pub label: String,
    /// Cumulative bytes on disk: resume offset plus bytes streamed by this attempt.
    pub bytes_done: u64,
    /// Remote length in bytes; 0 when the server did not report one.
    pub total_bytes: u64,
    /// Staging size the current attempt started from.
    pub resumed_from: u64,
    /// Elapsed time since the current attempt started (seconds).
    pub elapsed_secs: f64,
}

impl ProgressStats {
    /// Rate of this attempt in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done.saturating_sub(self.resumed_from) as f64 / self.elapsed_secs
    }

    /// Estimated seconds remaining (None if the total is unknown or the rate is 0).
    pub fn eta_secs(&self) -> Option<f64> {
        if self.total_bytes == 0 {
            return None;
        }
        let remaining = self.total_bytes.saturating_sub(self.bytes_done);
        if remaining == 0 {
            return Some(0.0);
        }
        let rate = self.bytes_per_sec();
        if rate <= 0.0 {
            return None;
        }
        Some(remaining as f64 / rate)
    }

    /// Fraction complete in [0.0, 1.0], None when the total is unknown.
    pub fn fraction(&self) -> Option<f64> {
        if self.total_bytes == 0 {
            return None;
        }
        Some((self.bytes_done as f64 / self.total_bytes as f64).min(1.0))
    }
}

/// What the scheduler reports while a batch runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// A worker picked up the asset.
    Started {
        index: usize,
        asset_id: String,
        label: String,
    },
    Progress(ProgressStats),
    /// Terminal outcome for one asset.
    Finished(AssetReport),
}

/// Throttled progress sink for one asset, reused across retry attempts.
pub struct ProgressReporter {
    asset_id: String,
    label: String,
    interval: Duration,
    tx: Option<Sender<BatchEvent>>,
    started: Instant,
    resumed_from: u64,
    last_emit: Option<Instant>,
}

impl ProgressReporter {
    pub fn new(
        asset_id: &str,
        label: &str,
        interval: Duration,
        tx: Option<Sender<BatchEvent>>,
    ) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            label: label.to_string(),
            interval,
            tx,
            started: Instant::now(),
            resumed_from: 0,
            last_emit: None,
        }
    }

    /// Reporter that drops every update.
    pub fn disabled() -> Self {
        Self::new("", "", Duration::ZERO, None)
    }

    /// Start of an attempt at `offset`. Always emits.
    pub fn begin(&mut self, offset: u64, total: u64) {
        self.started = Instant::now();
        self.resumed_from = offset;
        self.emit(offset, total);
    }

    /// Emits only if the interval has elapsed since the last emission.
    pub fn update(&mut self, done: u64, total: u64) {
        if let Some(last) = self.last_emit {
            if last.elapsed() < self.interval {
                return;
            }
        }
        self.emit(done, total);
    }

    /// End of an attempt. Always emits.
    pub fn finish(&mut self, done: u64, total: u64) {
        self.emit(done, total);
    }

    pub fn snapshot(&self, done: u64, total: u64) -> ProgressStats {
        ProgressStats {
            asset_id: self.asset_id.clone(),
            label: self.label.clone(),
            bytes_done: done,
            total_bytes: total,
            resumed_from: self.resumed_from,
            elapsed_secs: self.started.elapsed().as_secs_f64(),
        }
    }

    fn emit(&mut self, done: u64, total: u64) {
        self.last_emit = Some(Instant::now());
        if let Some(ref tx) = self.tx {
            let _ = tx.send(BatchEvent::Progress(self.snapshot(done, total)));
        }
    }
}
