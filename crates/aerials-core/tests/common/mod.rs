#![allow(dead_code)]

pub mod fake_fetcher;
pub mod range_server;

use aerials_core::catalog::Asset;

/// Deterministic body of `len` bytes.
pub fn body(len: usize) -> Vec<u8> {
    (0u8..251).cycle().take(len).collect()
}

pub fn asset(id: &str, url: Option<&str>) -> Asset {
    Asset {
        id: id.to_string(),
        display_label: format!("Label {}", id),
        name_key: String::new(),
        download_url: url.map(str::to_string),
        category_ids: Vec::new(),
        subcategory_ids: Vec::new(),
    }
}

pub fn cdn_url(id: &str) -> String {
    format!("https://cdn.test/aerials/{}.mov", id)
}
