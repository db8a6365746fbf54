//! Asset selection: dedup by id, then filter by taxonomy membership.
//!
//! Selection is a pure function of the catalog and the filter; nothing is
//! accumulated across calls.

use std::collections::HashSet;

use crate::catalog::Asset;

/// How a subcategory filter relates to its parent category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubcategoryMatch {
    /// Subcategory membership alone decides inclusion.
    #[default]
    Standalone,
    /// The asset must also belong to the parent category.
    WithinCategory,
}

/// Taxonomy filter, keyed by ids (see `Catalog::filter_for` for name lookup).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssetFilter {
    #[default]
    All,
    Category(String),
    Subcategory {
        category: String,
        subcategory: String,
        policy: SubcategoryMatch,
    },
}

impl AssetFilter {
    pub fn matches(&self, asset: &Asset) -> bool {
        match self {
            AssetFilter::All => true,
            AssetFilter::Category(id) => asset.category_ids.contains(id),
            AssetFilter::Subcategory {
                category,
                subcategory,
                policy,
            } => {
                let in_sub = asset.subcategory_ids.contains(subcategory);
                match policy {
                    SubcategoryMatch::Standalone => in_sub,
                    SubcategoryMatch::WithinCategory => {
                        in_sub && asset.category_ids.contains(category)
                    }
                }
            }
        }
    }
}

/// Returns the assets to download, in catalog order.
///
/// Dedup happens before filtering: the first asset with a given id is the only
/// candidate for that id, so a later duplicate is dropped even when the first
/// one is filtered out.
pub fn select(assets: &[Asset], filter: &AssetFilter) -> Vec<Asset> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(assets.len());
    assets
        .iter()
        .filter(|&a| seen.insert(a.id.as_str()))
        .filter(|a| filter.matches(a))
        .cloned()
        .collect()
}

/// Keeps only the assets named in `picks` (by id, or by label ignoring case).
/// An empty `picks` keeps everything.
pub fn narrow_to(selected: Vec<Asset>, picks: &[String]) -> Vec<Asset> {
    if picks.is_empty() {
        return selected;
    }
    selected
        .into_iter()
        .filter(|a| {
            picks.iter().any(|p| {
                let p = p.trim();
                a.id == p || a.display_label.eq_ignore_ascii_case(p)
            })
        })
        .collect()
}
