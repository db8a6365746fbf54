//! Per-asset pipeline: skip, sanitize, completeness short-circuit, then
//! retry-controlled transfer.

use std::sync::mpsc::Sender;

use crate::catalog::Asset;
use crate::retry::{run_with_retry, TransferError};
use crate::transfer::{is_complete, transfer_asset, AssetPaths};
use crate::url_model::sanitize_download_url;

use super::outcome::{AssetOutcome, AssetReport};
use super::progress::{BatchEvent, ProgressReporter};
use super::Engine;

pub(super) fn process_asset(
    engine: &Engine,
    index: usize,
    asset: &Asset,
    events: Option<&Sender<BatchEvent>>,
) -> AssetReport {
    let outcome = run_pipeline(engine, asset, events);
    if let AssetOutcome::Abandoned { attempts, error } = &outcome {
        tracing::warn!(
            asset_id = %asset.id,
            label = %asset.describe(),
            attempts,
            "asset abandoned: {}",
            error
        );
    }
    AssetReport {
        index,
        id: asset.id.clone(),
        label: asset.describe(),
        outcome,
    }
}

fn run_pipeline(
    engine: &Engine,
    asset: &Asset,
    events: Option<&Sender<BatchEvent>>,
) -> AssetOutcome {
    let raw_url = match asset.download_url.as_deref().map(str::trim) {
        Some(u) if !u.is_empty() => u,
        _ => {
            tracing::info!(asset_id = %asset.id, "no download URL, skipping");
            return AssetOutcome::Skipped {
                reason: "no download URL".to_string(),
            };
        }
    };

    let url = match sanitize_download_url(raw_url) {
        Ok(u) => u,
        Err(e) => {
            return AssetOutcome::Abandoned {
                attempts: 0,
                error: TransferError::from(e).to_string(),
            }
        }
    };

    let paths = AssetPaths::new(&engine.dest_dir, &asset.id);
    let fetcher = engine.fetcher.as_ref();
    if is_complete(fetcher, &url, &paths.final_path) {
        tracing::debug!(asset_id = %asset.id, "final file matches remote length");
        return AssetOutcome::AlreadyComplete;
    }

    let mut progress = ProgressReporter::new(
        &asset.id,
        &asset.describe(),
        engine.progress_interval,
        events.cloned(),
    );
    let result = run_with_retry(
        &engine.retry_policy,
        |state| tracing::trace!(asset_id = %asset.id, ?state, "attempt state"),
        |attempt| {
            tracing::debug!(asset_id = %asset.id, attempt, "transfer attempt");
            transfer_asset(fetcher, &url, &paths, &mut progress)
        },
    );

    match result {
        Ok((bytes, attempts)) => {
            tracing::info!(asset_id = %asset.id, bytes, attempts, "downloaded");
            AssetOutcome::Downloaded { bytes, attempts }
        }
        Err(abandoned) => AssetOutcome::Abandoned {
            attempts: abandoned.attempts,
            error: abandoned.to_string(),
        },
    }
}
