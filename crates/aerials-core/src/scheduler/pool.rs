//! Bounded worker pool: a shared queue of assets, `min(W, n)` OS threads,
//! results back over an mpsc channel.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Sender};
use std::sync::{Mutex, MutexGuard};

use crate::catalog::Asset;

use super::outcome::{AssetOutcome, AssetReport, BatchSummary};
use super::pipeline::process_asset;
use super::progress::BatchEvent;
use super::Engine;

/// Batch-wide knobs, fixed when the batch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Maximum transfers in flight. Values below 1 are treated as 1.
    pub workers: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

type WorkQueue = Mutex<VecDeque<(usize, Asset)>>;

/// Runs every asset to a terminal outcome and returns the per-asset reports in
/// input order. Blocks until all workers are done. A fault in one asset,
/// panics included, never stops the others.
pub fn run_batch(
    assets: Vec<Asset>,
    opts: &BatchOptions,
    engine: &Engine,
    progress_tx: Option<Sender<BatchEvent>>,
) -> BatchSummary {
    let count = assets.len();
    if count == 0 {
        return BatchSummary::default();
    }
    if let Err(e) = std::fs::create_dir_all(&engine.dest_dir) {
        // Each asset will then fail with a storage error of its own.
        tracing::warn!(dest = %engine.dest_dir.display(), "cannot create destination: {}", e);
    }

    let work: WorkQueue = Mutex::new(assets.into_iter().enumerate().collect());
    let num_workers = opts.workers.max(1).min(count);
    tracing::info!(assets = count, workers = num_workers, "starting batch");

    let (tx, rx) = mpsc::channel::<AssetReport>();
    std::thread::scope(|s| {
        for worker in 0..num_workers {
            let work = &work;
            let tx = tx.clone();
            let events = progress_tx.clone();
            s.spawn(move || {
                loop {
                    let next = lock_queue(work).pop_front();
                    let (index, asset) = match next {
                        Some(p) => p,
                        None => break,
                    };
                    tracing::debug!(worker, asset_id = %asset.id, "picked up asset");
                    if let Some(ref ev) = events {
                        let _ = ev.send(BatchEvent::Started {
                            index,
                            asset_id: asset.id.clone(),
                            label: asset.describe(),
                        });
                    }
                    let report = run_guarded(engine, index, &asset, events.as_ref());
                    if let Some(ref ev) = events {
                        let _ = ev.send(BatchEvent::Finished(report.clone()));
                    }
                    if tx.send(report).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(tx);

    let mut reports: Vec<AssetReport> = rx.into_iter().collect();
    reports.sort_by_key(|r| r.index);
    let summary = BatchSummary { reports };
    tracing::info!(
        downloaded = summary.downloaded(),
        already_complete = summary.already_complete(),
        skipped = summary.skipped(),
        abandoned = summary.abandoned(),
        bytes = summary.bytes_transferred(),
        "batch finished"
    );
    summary
}

/// Queue lock that survives a poisoned mutex; the queue itself is always consistent.
fn lock_queue(work: &WorkQueue) -> MutexGuard<'_, VecDeque<(usize, Asset)>> {
    work.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn run_guarded(
    engine: &Engine,
    index: usize,
    asset: &Asset,
    events: Option<&Sender<BatchEvent>>,
) -> AssetReport {
    match panic::catch_unwind(AssertUnwindSafe(|| {
        process_asset(engine, index, asset, events)
    })) {
        Ok(report) => report,
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            tracing::error!(asset_id = %asset.id, "worker panicked: {}", msg);
            AssetReport {
                index,
                id: asset.id.clone(),
                label: asset.describe(),
                outcome: AssetOutcome::Abandoned {
                    attempts: 0,
                    error: format!("worker panicked: {}", msg),
                },
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
