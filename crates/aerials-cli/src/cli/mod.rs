//! CLI for the aerials downloader.

mod commands;
mod post_batch;
mod progress_printer;

use aerials_core::catalog::Catalog;
use aerials_core::config::{self, AerialsConfig};
use aerials_core::selector::{AssetFilter, SubcategoryMatch};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use commands::{
    run_categories, run_completions, run_download, run_list, run_man, run_status,
};

/// Top-level CLI for the aerials downloader.
#[derive(Debug, Parser)]
#[command(name = "aerials")]
#[command(about = "Download Apple Aerials screensaver videos, resumably and in parallel", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// List categories and their subcategories.
    Categories {
        /// Catalog JSON (default: `catalog_path` from config.toml).
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,
    },

    /// Print the assets a filter selects, with their local state.
    List {
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        paths: PathArgs,
    },

    /// Download the selected assets, then update the asset database and restart the service.
    Download(DownloadArgs),

    /// Show the local state of every catalog asset (no network).
    Status {
        #[command(flatten)]
        paths: PathArgs,
    },

    /// Generate shell completions on stdout.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Render the man page on stdout.
    Man,
}

/// Taxonomy filter shared by `list` and `download`.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Category id or name (e.g. "Space").
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Subcategory id or name within --category.
    #[arg(long, short = 's', requires = "category")]
    pub subcategory: Option<String>,

    /// With --subcategory, also require membership in --category.
    #[arg(long, requires = "subcategory")]
    pub intersect: bool,
}

impl FilterArgs {
    pub fn policy(&self) -> SubcategoryMatch {
        if self.intersect {
            SubcategoryMatch::WithinCategory
        } else {
            SubcategoryMatch::Standalone
        }
    }

    pub fn resolve(&self, catalog: &Catalog) -> Result<AssetFilter> {
        Ok(catalog.filter_for(
            self.category.as_deref(),
            self.subcategory.as_deref(),
            self.policy(),
        )?)
    }
}

/// Catalog and destination overrides.
#[derive(Debug, Clone, Default, Args)]
pub struct PathArgs {
    /// Catalog JSON (default: `catalog_path` from config.toml).
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Destination directory (default: `dest_dir` from config.toml).
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,
}

impl PathArgs {
    pub fn catalog_path(&self, cfg: &AerialsConfig) -> PathBuf {
        self.catalog.clone().unwrap_or_else(|| cfg.catalog_path.clone())
    }

    pub fn dest_dir(&self, cfg: &AerialsConfig) -> PathBuf {
        self.dest.clone().unwrap_or_else(|| cfg.dest_dir.clone())
    }
}

#[derive(Debug, Clone, Args)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    #[command(flatten)]
    pub paths: PathArgs,

    /// Only download this asset (id or label). Repeatable.
    #[arg(long = "asset", value_name = "ID_OR_LABEL")]
    pub assets: Vec<String>,

    /// Concurrent transfers. Overrides DOWNLOAD_THREADS and `download_threads`.
    #[arg(long, short = 't', value_name = "N")]
    pub threads: Option<usize>,

    /// Do not touch the asset database after the batch.
    #[arg(long)]
    pub skip_db_update: bool,

    /// Do not restart the screensaver service after the batch.
    #[arg(long)]
    pub skip_restart: bool,
}

fn load_config() -> Result<AerialsConfig> {
    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Categories { catalog } => {
                let cfg = load_config()?;
                run_categories(&catalog.unwrap_or_else(|| cfg.catalog_path.clone()))?;
            }
            CliCommand::List { filter, paths } => run_list(&load_config()?, &filter, &paths)?,
            CliCommand::Download(args) => run_download(&load_config()?, args).await?,
            CliCommand::Status { paths } => run_status(&load_config()?, &paths)?,
            CliCommand::Completions { shell } => run_completions(shell)?,
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
