//! String-level cleanup for URLs and filenames.

/// Removes backslashes left over from JSON-escaped separators (`https:\/\/host\/a.mov`).
pub fn strip_escaped_separators(raw: &str) -> String {
    raw.replace('\\', "")
}

/// Sanitizes an asset id for use as a filename stem.
///
/// - Replaces NUL, `/`, `\`, whitespace, and control characters with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing dots and underscores
/// - Limits length so the stem plus suffixes stays under 255 bytes (NAME_MAX)
pub fn sanitize_file_stem(name: &str) -> String {
    const STEM_MAX: usize = 200;

    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let replacement = if c == '\0' || c == '/' || c == '\\' || c.is_control() || c.is_whitespace()
        {
            '_'
        } else {
            c
        };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');

    if trimmed.len() > STEM_MAX {
        let mut take = STEM_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}
