//! Catalog model: assets and the two-level category taxonomy.
//!
//! Mirrors the `entries.json` file shipped with the screensaver service. Only
//! the fields the downloader needs are deserialized; everything else is ignored.

mod taxonomy;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub use taxonomy::LookupError;

/// One downloadable asset from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    /// Unique identifier; also names the local file.
    pub id: String,
    #[serde(rename = "accessibilityLabel", default)]
    pub display_label: String,
    #[serde(rename = "localizedNameKey", default)]
    pub name_key: String,
    /// Payload URL. May still contain escaped separators (`\/`).
    #[serde(rename = "url-4K-SDR-240FPS", default)]
    pub download_url: Option<String>,
    #[serde(rename = "categories", default)]
    pub category_ids: Vec<String>,
    #[serde(rename = "subcategories", default)]
    pub subcategory_ids: Vec<String>,
}

impl Asset {
    /// Label used in progress lines and diagnostics, e.g. `Greenland: 8C31...mov`.
    pub fn describe(&self) -> String {
        let file = crate::url_model::asset_file_name(&self.id);
        if self.display_label.is_empty() {
            file
        } else {
            format!("{}: {}", self.display_label, file)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Subcategory {
    pub id: String,
    #[serde(rename = "localizedNameKey", default)]
    pub name_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(rename = "localizedNameKey", default)]
    pub name_key: String,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

/// Whole catalog: assets in file order plus the taxonomy tree.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Catalog {
    pub fn from_json(data: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(data).context("parse catalog JSON")?;
        Ok(catalog)
    }
}

/// Read the catalog once from disk.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read catalog {}", path.display()))?;
    let catalog = Catalog::from_json(&data)
        .with_context(|| format!("load catalog {}", path.display()))?;
    tracing::debug!(
        assets = catalog.assets.len(),
        categories = catalog.categories.len(),
        "catalog loaded from {}",
        path.display()
    );
    Ok(catalog)
}
