//! `aerials list` – print the selection for a filter.

use aerials_core::catalog::load_catalog;
use aerials_core::config::AerialsConfig;
use aerials_core::selector::select;
use aerials_core::transfer::AssetPaths;
use anyhow::Result;

use super::describe_local;
use crate::cli::{FilterArgs, PathArgs};

pub fn run_list(cfg: &AerialsConfig, filter: &FilterArgs, paths: &PathArgs) -> Result<()> {
    let catalog = load_catalog(&paths.catalog_path(cfg))?;
    let asset_filter = filter.resolve(&catalog)?;
    let selected = select(&catalog.assets, &asset_filter);
    let dest = paths.dest_dir(cfg);

    if selected.is_empty() {
        println!("No assets match.");
        return Ok(());
    }
    println!("{:<38} {:<28} {:<24} {}", "ID", "LABEL", "NAME KEY", "LOCAL");
    for asset in &selected {
        let local = AssetPaths::new(&dest, &asset.id).local_state();
        println!(
            "{:<38} {:<28} {:<24} {}",
            asset.id,
            asset.display_label,
            asset.name_key,
            describe_local(&local)
        );
    }
    println!("{} asset(s)", selected.len());
    Ok(())
}
