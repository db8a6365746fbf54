use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Environment variable that overrides the configured worker count.
pub const THREADS_ENV: &str = "DOWNLOAD_THREADS";

const IDLEASSETSD_ROOT: &str = "/Library/Application Support/com.apple.idleassetsd";

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per asset (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::try_from_secs_f64(self.base_delay_secs)
                .unwrap_or(defaults.base_delay),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Actions run by the CLI after a batch, whatever the per-asset outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostBatchConfig {
    /// SQLite asset database whose `ZASSET.ZLASTDOWNLOADED` column is stamped.
    pub asset_db_path: PathBuf,
    /// Value written to `ZLASTDOWNLOADED` (seconds since 2001-01-01).
    pub last_downloaded: f64,
    /// Process name passed to `killall` so the service manager relaunches it.
    pub service_name: String,
}

impl Default for PostBatchConfig {
    fn default() -> Self {
        Self {
            asset_db_path: Path::new(IDLEASSETSD_ROOT).join("Aerial.sqlite"),
            last_downloaded: 718_364_962.0204,
            service_name: "idleassetsd".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/aerials/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AerialsConfig {
    /// Catalog JSON (`entries.json`) listing assets and categories.
    pub catalog_path: PathBuf,
    /// Directory receiving `<id>.mov` files and their staging siblings.
    pub dest_dir: PathBuf,
    /// Number of concurrent transfers. Overridden by `DOWNLOAD_THREADS` and `--threads`.
    pub download_threads: usize,
    /// Verify TLS certificates. Off by default: the asset CDN is fetched without verification.
    pub tls_verify: bool,
    /// Minimum interval between progress updates for one transfer.
    pub progress_interval_ms: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    pub retry: Option<RetryConfig>,
    pub post_batch: PostBatchConfig,
}

impl Default for AerialsConfig {
    fn default() -> Self {
        let customer = Path::new(IDLEASSETSD_ROOT).join("Customer");
        Self {
            catalog_path: customer.join("entries.json"),
            dest_dir: customer.join("4KSDR240FPS"),
            download_threads: 1,
            tls_verify: false,
            progress_interval_ms: 500,
            retry: None,
            post_batch: PostBatchConfig::default(),
        }
    }
}

impl AerialsConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryConfig::to_policy)
            .unwrap_or_default()
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    /// Worker count for one batch: CLI flag, then `DOWNLOAD_THREADS`, then config, never below 1.
    /// Read once at batch start.
    pub fn worker_count(&self, cli_threads: Option<usize>) -> usize {
        let env = std::env::var(THREADS_ENV).ok();
        resolve_worker_count(cli_threads, env.as_deref(), self.download_threads)
    }
}

/// Parse a `DOWNLOAD_THREADS` value. Unset, unparsable, or zero values are ignored.
pub fn threads_from_env_value(value: Option<&str>) -> Option<usize> {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n >= 1)
}

fn resolve_worker_count(cli: Option<usize>, env: Option<&str>, configured: usize) -> usize {
    cli.filter(|n| *n >= 1)
        .or_else(|| threads_from_env_value(env))
        .unwrap_or(configured)
        .max(1)
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("aerials")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AerialsConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<AerialsConfig> {
    if !path.exists() {
        let default_cfg = AerialsConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: AerialsConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = AerialsConfig::default();
        assert_eq!(cfg.download_threads, 1);
        assert!(!cfg.tls_verify);
        assert!(cfg.catalog_path.ends_with("Customer/entries.json"));
        assert!(cfg.dest_dir.ends_with("Customer/4KSDR240FPS"));
        assert_eq!(cfg.post_batch.service_name, "idleassetsd");
        assert_eq!(cfg.retry_policy().max_attempts, 5);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = AerialsConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: AerialsConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.catalog_path, cfg.catalog_path);
        assert_eq!(parsed.dest_dir, cfg.dest_dir);
        assert_eq!(parsed.download_threads, cfg.download_threads);
        assert_eq!(parsed.post_batch.asset_db_path, cfg.post_batch.asset_db_path);
    }

    #[test]
    fn config_toml_partial_file_uses_defaults() {
        let toml = r#"
            dest_dir = "/tmp/aerials"
            download_threads = 4

            [retry]
            max_attempts = 3
            base_delay_secs = 0.5
            max_delay_secs = 15

            [post_batch]
            service_name = "otherd"
        "#;
        let cfg: AerialsConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.dest_dir, PathBuf::from("/tmp/aerials"));
        assert_eq!(cfg.download_threads, 4);
        assert_eq!(cfg.progress_interval_ms, 500);
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(15));
        assert_eq!(cfg.post_batch.service_name, "otherd");
        assert!(cfg.post_batch.asset_db_path.ends_with("Aerial.sqlite"));
    }

    #[test]
    fn retry_config_clamps_bad_values() {
        let rc = RetryConfig {
            max_attempts: 0,
            base_delay_secs: -1.0,
            max_delay_secs: 1,
        };
        let p = rc.to_policy();
        assert_eq!(p.max_attempts, 1);
        assert_eq!(p.base_delay, RetryPolicy::default().base_delay);
    }

    #[test]
    fn env_threads_value_parsing() {
        assert_eq!(threads_from_env_value(None), None);
        assert_eq!(threads_from_env_value(Some("4")), Some(4));
        assert_eq!(threads_from_env_value(Some(" 2 ")), Some(2));
        assert_eq!(threads_from_env_value(Some("0")), None);
        assert_eq!(threads_from_env_value(Some("many")), None);
        assert_eq!(threads_from_env_value(Some("")), None);
    }

    #[test]
    fn worker_count_precedence() {
        assert_eq!(resolve_worker_count(Some(8), Some("4"), 2), 8);
        assert_eq!(resolve_worker_count(None, Some("4"), 2), 4);
        assert_eq!(resolve_worker_count(None, Some("junk"), 2), 2);
        assert_eq!(resolve_worker_count(Some(0), None, 3), 3);
        assert_eq!(resolve_worker_count(None, None, 0), 1);
    }

    #[test]
    fn load_or_init_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.download_threads, 1);

        std::fs::write(&path, "download_threads = 6\n").unwrap();
        let cfg = load_or_init_at(&path).unwrap();
        assert_eq!(cfg.download_threads, 6);
    }
}
