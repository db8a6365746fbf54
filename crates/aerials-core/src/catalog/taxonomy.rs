//! Category lookup by id or display name, and filter construction.

use thiserror::Error;

use super::{Catalog, Category, Subcategory};
use crate::selector::{AssetFilter, SubcategoryMatch};

const CATEGORY_KEY_PREFIX: &str = "AerialCategory";
const SUBCATEGORY_KEY_PREFIX: &str = "AerialSubcategory";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    #[error("unknown subcategory '{subcategory}' in category '{category}'")]
    UnknownSubcategory {
        category: String,
        subcategory: String,
    },
    #[error("a subcategory filter needs a category")]
    SubcategoryWithoutCategory,
}

fn strip_key_prefix<'a>(key: &'a str, prefix: &str) -> &'a str {
    key.strip_prefix(prefix).unwrap_or(key)
}

fn matches_query(id: &str, name_key: &str, display: &str, query: &str) -> bool {
    let query = query.trim();
    id == query || name_key == query || display.eq_ignore_ascii_case(query)
}

impl Category {
    /// Name shown to users: the localization key without its `AerialCategory` prefix.
    pub fn display_name(&self) -> &str {
        strip_key_prefix(&self.name_key, CATEGORY_KEY_PREFIX)
    }

    pub fn find_subcategory(&self, query: &str) -> Option<&Subcategory> {
        self.subcategories
            .iter()
            .find(|s| matches_query(&s.id, &s.name_key, s.display_name(), query))
    }
}

impl Subcategory {
    pub fn display_name(&self) -> &str {
        strip_key_prefix(&self.name_key, SUBCATEGORY_KEY_PREFIX)
    }
}

impl Catalog {
    /// Find a category by id, full localization key, or display name (case-insensitive).
    pub fn find_category(&self, query: &str) -> Result<&Category, LookupError> {
        self.categories
            .iter()
            .find(|c| matches_query(&c.id, &c.name_key, c.display_name(), query))
            .ok_or_else(|| LookupError::UnknownCategory(query.to_string()))
    }

    /// Resolve user-supplied names into an [`AssetFilter`] keyed by taxonomy ids.
    pub fn filter_for(
        &self,
        category: Option<&str>,
        subcategory: Option<&str>,
        policy: SubcategoryMatch,
    ) -> Result<AssetFilter, LookupError> {
        match (category, subcategory) {
            (None, None) => Ok(AssetFilter::All),
            (None, Some(_)) => Err(LookupError::SubcategoryWithoutCategory),
            (Some(c), None) => Ok(AssetFilter::Category(self.find_category(c)?.id.clone())),
            (Some(c), Some(s)) => {
                let cat = self.find_category(c)?;
                let sub =
                    cat.find_subcategory(s)
                        .ok_or_else(|| LookupError::UnknownSubcategory {
                            category: cat.display_name().to_string(),
                            subcategory: s.to_string(),
                        })?;
                Ok(AssetFilter::Subcategory {
                    category: cat.id.clone(),
                    subcategory: sub.id.clone(),
                    policy,
                })
            }
        }
    }
}
