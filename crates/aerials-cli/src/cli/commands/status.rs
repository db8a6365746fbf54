//! `aerials status` – local state of every catalog asset.

use aerials_core::catalog::load_catalog;
use aerials_core::config::AerialsConfig;
use aerials_core::selector::{select, AssetFilter};
use aerials_core::transfer::{AssetPaths, LocalState};
use anyhow::Result;

use super::describe_local;
use crate::cli::PathArgs;

pub fn run_status(cfg: &AerialsConfig, paths: &PathArgs) -> Result<()> {
    let catalog = load_catalog(&paths.catalog_path(cfg))?;
    let dest = paths.dest_dir(cfg);
    let assets = select(&catalog.assets, &AssetFilter::All);

    let (mut complete, mut partial, mut missing) = (0usize, 0usize, 0usize);
    println!("{:<38} {}", "ID", "STATE");
    for asset in &assets {
        let state = AssetPaths::new(&dest, &asset.id).local_state();
        match state {
            Ok(LocalState::Complete { .. }) => complete += 1,
            Ok(LocalState::Partial { .. }) => partial += 1,
            _ => missing += 1,
        }
        println!("{:<38} {}", asset.id, describe_local(&state));
    }
    println!(
        "{} complete, {} partial, {} missing in {}",
        complete,
        partial,
        missing,
        dest.display()
    );
    Ok(())
}
