//! Local file names for assets.
//!
//! The mapping from id to file name is injective: ids that are already plain
//! file names (catalog ids are UUIDs) are used as-is, anything else gets a
//! sanitized stem plus `~` and a digest of the raw id. `~` never appears in a
//! plain name, so the two forms cannot meet.

use sha2::{Digest, Sha256};

use super::sanitize::sanitize_file_stem;

/// Suffix appended to the final path while a transfer is in progress.
pub const STAGING_SUFFIX: &str = ".downloading";

const FILE_EXTENSION: &str = ".mov";
const FALLBACK_STEM: &str = "asset";
const DIGEST_SEPARATOR: char = '~';
/// Hex characters of the SHA-256 of the raw id kept in the suffix.
const DIGEST_HEX_LEN: usize = 16;
const PLAIN_MAX: usize = 200;

/// ASCII letters, digits, `-`, `_` and non-leading `.`; bounded length.
fn is_plain_name(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= PLAIN_MAX
        && !id.starts_with('.')
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

fn id_digest(id: &str) -> String {
    let digest = Sha256::digest(id.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(DIGEST_HEX_LEN);
    hex
}

/// Final filename for an asset id: `<id>.mov`, or `<stem>~<digest>.mov` when
/// the id is not a plain file name.
pub fn asset_file_name(id: &str) -> String {
    if is_plain_name(id) {
        return format!("{}{}", id, FILE_EXTENSION);
    }
    let stem = sanitize_file_stem(id);
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem.as_str() };
    format!(
        "{}{}{}{}",
        stem,
        DIGEST_SEPARATOR,
        id_digest(id),
        FILE_EXTENSION
    )
}
