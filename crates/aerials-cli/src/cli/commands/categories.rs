//! `aerials categories` – list the category taxonomy.

use aerials_core::catalog::load_catalog;
use anyhow::Result;
use std::path::Path;

pub fn run_categories(catalog_path: &Path) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    if catalog.categories.is_empty() {
        println!("No categories in {}.", catalog_path.display());
        return Ok(());
    }
    for category in &catalog.categories {
        let members = catalog
            .assets
            .iter()
            .filter(|a| a.category_ids.contains(&category.id))
            .count();
        println!("{} ({} assets)  [{}]", category.display_name(), members, category.id);
        for sub in &category.subcategories {
            println!("    {}  [{}]", sub.display_name(), sub.id);
        }
    }
    Ok(())
}
