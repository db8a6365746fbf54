//! URL cleanup and local filename derivation.
//!
//! Catalog URLs can carry escaped path separators (`\/`) that must be removed
//! before use; local files are named after the asset id, sanitized for the
//! filesystem.

mod path;
mod sanitize;

pub use path::{asset_file_name, STAGING_SUFFIX};
pub use sanitize::{sanitize_file_stem, strip_escaped_separators};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UrlError {
    #[error("invalid download URL: {0}")]
    Parse(#[from] url::ParseError),
    #[error("unsupported URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),
}

/// Strips escaped separators and checks the result is an absolute http(s) URL.
pub fn sanitize_download_url(raw: &str) -> Result<String, UrlError> {
    let cleaned = strip_escaped_separators(raw.trim());
    let parsed = url::Url::parse(&cleaned)?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed.into()),
        other => Err(UrlError::UnsupportedScheme(other.to_string())),
    }
}
