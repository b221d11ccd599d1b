//! Organization slug rules.

use rand::RngExt;

/// Maximum slug length in characters.
pub const MAX_SLUG_LEN: usize = 50;

/// Length of the random suffix appended when a slug is taken.
pub const ALTERNATE_SUFFIX_LEN: usize = 6;

const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Validate a slug: 1–50 chars, lowercase ASCII alphanumerics and `-`,
/// not starting or ending with `-`, not purely numeric.
pub fn validate_slug(slug: &str) -> bool {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return false;
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return false;
    }
    if slug.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    slug.bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Derive an alternate slug `"{base}-{suffix}"`, truncating `base` so the
/// result stays within [`MAX_SLUG_LEN`].
pub fn alternate_slug(base: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ALTERNATE_SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.random_range(0..SUFFIX_CHARSET.len())] as char)
        .collect();
    let keep = MAX_SLUG_LEN - ALTERNATE_SUFFIX_LEN - 1;
    let trimmed = base.get(..keep.min(base.len())).unwrap_or(base);
    format!("{}-{suffix}", trimmed.trim_end_matches('-'))
}
