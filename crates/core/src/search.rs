//! Listing and search helpers shared by the repository and API layers.

/// Default number of rows per page.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Maximum number of rows per page.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Maximum length of a free-text search term.
pub const MAX_SEARCH_TERM_LENGTH: usize = 100;

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Turn an optional `?q=` value into an `ILIKE` pattern.
///
/// Blank input yields `None` (no filtering). `%`, `_` and `\` are escaped so
/// they match literally, and overly long terms are truncated.
pub fn like_pattern(query: Option<&str>) -> Option<String> {
    let term = query?.trim();
    if term.is_empty() {
        return None;
    }
    let escaped: String = term
        .chars()
        .take(MAX_SEARCH_TERM_LENGTH)
        .flat_map(|c| match c {
            '%' | '_' | '\\' => vec!['\\', c],
            other => vec![other],
        })
        .collect();
    Some(format!("%{escaped}%"))
}
