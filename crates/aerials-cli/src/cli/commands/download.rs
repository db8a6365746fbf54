//! `aerials download` – run one batch, then the post-batch steps.

use aerials_core::catalog::load_catalog;
use aerials_core::config::AerialsConfig;
use aerials_core::scheduler::{run_batch, BatchOptions, BatchSummary, Engine};
use aerials_core::selector::{narrow_to, select};
use anyhow::Result;
use std::sync::mpsc;

use crate::cli::post_batch;
use crate::cli::progress_printer;
use crate::cli::DownloadArgs;

/// Exits Ok after any completed batch, abandoned assets included. Only setup
/// errors (config, catalog, unknown category) are returned.
pub async fn run_download(cfg: &AerialsConfig, args: DownloadArgs) -> Result<()> {
    let catalog = load_catalog(&args.paths.catalog_path(cfg))?;
    let filter = args.filter.resolve(&catalog)?;
    let selected = narrow_to(select(&catalog.assets, &filter), &args.assets);
    let dest = args.paths.dest_dir(cfg);
    let workers = cfg.worker_count(args.threads);

    if selected.is_empty() {
        println!("No assets match.");
    } else {
        println!(
            "Downloading {} asset(s) to {} with {} worker(s)",
            selected.len(),
            dest.display(),
            workers
        );
        let engine = Engine::from_config(cfg, dest);
        let opts = BatchOptions { workers };
        let summary = tokio::task::spawn_blocking(move || {
            let (tx, rx) = mpsc::channel();
            let printer = std::thread::spawn(move || progress_printer::print_events(rx));
            let summary = run_batch(selected, &opts, &engine, Some(tx));
            if printer.join().is_err() {
                tracing::warn!("progress printer panicked");
            }
            summary
        })
        .await?;
        print_summary(&summary);
    }

    post_batch::run(&cfg.post_batch, args.skip_db_update, args.skip_restart).await;
    Ok(())
}

fn print_summary(summary: &BatchSummary) {
    println!(
        "Done: {} downloaded, {} already complete, {} skipped, {} abandoned ({:.1} MiB transferred)",
        summary.downloaded(),
        summary.already_complete(),
        summary.skipped(),
        summary.abandoned(),
        summary.bytes_transferred() as f64 / 1_048_576.0
    );
    for report in summary.abandoned_reports() {
        if let Some(line) = report.diagnostic() {
            eprintln!("  {}", line);
        }
    }
}
