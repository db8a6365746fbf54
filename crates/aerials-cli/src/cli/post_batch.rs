//! Steps run after every batch: stamp the screensaver's asset database and
//! restart its service so it picks up the new files. Failures are reported
//! and never change the batch result.

use aerials_core::config::PostBatchConfig;
use anyhow::{bail, Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use std::path::Path;
use std::process::Command;

/// Percent-encode characters that would break a `sqlite://` URI.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

pub async fn run(cfg: &PostBatchConfig, skip_db_update: bool, skip_restart: bool) {
    if skip_db_update {
        tracing::info!("asset database update skipped");
    } else {
        match update_asset_db(&cfg.asset_db_path, cfg.last_downloaded).await {
            Ok(rows) => {
                tracing::info!(rows, db = %cfg.asset_db_path.display(), "asset database updated");
                println!("Updated {} asset record(s)", rows);
            }
            Err(e) => {
                tracing::warn!("asset database update failed: {:#}", e);
                eprintln!("aerials: asset database update failed: {:#}", e);
            }
        }
    }

    if skip_restart {
        tracing::info!("service restart skipped");
    } else if let Err(e) = restart_service(&cfg.service_name) {
        tracing::warn!("service restart failed: {:#}", e);
        eprintln!("aerials: service restart failed: {:#}", e);
    } else {
        println!("Restarted {}", cfg.service_name);
    }
}

/// `VACUUM`, then set `ZASSET.ZLASTDOWNLOADED` on every row. Returns the rows updated.
/// The database must already exist.
pub async fn update_asset_db(path: &Path, last_downloaded: f64) -> Result<u64> {
    let uri = path_to_sqlite_uri(path);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&uri)
        .await
        .with_context(|| format!("open {}", path.display()))?;

    sqlx::query("VACUUM")
        .execute(&pool)
        .await
        .context("vacuum asset database")?;
    let result = sqlx::query("UPDATE ZASSET SET ZLASTDOWNLOADED = ?")
        .bind(last_downloaded)
        .execute(&pool)
        .await
        .context("update ZASSET.ZLASTDOWNLOADED")?;

    pool.close().await;
    Ok(result.rows_affected())
}

/// `killall <name>`; the service manager relaunches the process.
pub fn restart_service(name: &str) -> Result<()> {
    let status = Command::new("killall")
        .arg(name)
        .status()
        .context("run killall")?;
    if !status.success() {
        bail!("killall {} exited with {}", name, status);
    }
    Ok(())
}
