//! Cursor pagination shared by every list endpoint.
//!
//! Lists are ordered newest first by internal id. A page is fetched with
//! `limit + 1` rows; the extra row only signals that another page exists.
//! The `next_token` handed to clients encodes the last id of the page and
//! is treated as opaque on their side.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

/// Default page size when the client does not pass `limit`.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Largest page a client may request.
pub const MAX_PAGE_LIMIT: i64 = 200;

const TOKEN_PREFIX: char = 'c';

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a page limit with the standard defaults.
pub fn page_limit(limit: Option<i64>) -> i64 {
    clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT)
}

/// Encode the last id of a page as a continuation token.
pub fn encode_token(last_id: DbId) -> String {
    format!("{TOKEN_PREFIX}{last_id:x}")
}

/// Decode a continuation token back into the id to continue below.
pub fn decode_token(token: &str) -> Result<DbId, CoreError> {
    let invalid = || CoreError::Validation(format!("Invalid next_token '{token}'"));
    let hex = token.strip_prefix(TOKEN_PREFIX).ok_or_else(invalid)?;
    let id = DbId::from_str_radix(hex, 16).map_err(|_| invalid())?;
    if id <= 0 {
        return Err(invalid());
    }
    Ok(id)
}

/// Decode an optional token, passing `None` through.
pub fn decode_cursor(token: Option<&str>) -> Result<Option<DbId>, CoreError> {
    match token {
        Some(t) if !t.trim().is_empty() => decode_token(t.trim()).map(Some),
        _ => Ok(None),
    }
}

/// One page of results plus the token for the following page.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// Build a page from rows fetched with `LIMIT limit + 1`.
    ///
    /// `id_of` extracts the ordering id from a row.
    pub fn from_rows(mut rows: Vec<T>, limit: i64, id_of: impl Fn(&T) -> DbId) -> Self {
        let limit = usize::try_from(limit).unwrap_or(0);
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        let next_token = if has_more {
            rows.last().map(|r| encode_token(id_of(r)))
        } else {
            None
        };
        Self {
            items: rows,
            next_token,
        }
    }

    /// Convert the items while keeping the continuation token.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_token: self.next_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(page_limit(None), DEFAULT_PAGE_LIMIT);
        assert_eq!(page_limit(Some(0)), 1);
        assert_eq!(page_limit(Some(-5)), 1);
        assert_eq!(page_limit(Some(10_000)), MAX_PAGE_LIMIT);
        assert_eq!(page_limit(Some(20)), 20);
    }

    #[test]
    fn token_decodes_to_encoded_id() {
        let token = encode_token(4096);
        assert_eq!(token, "c1000");
        assert_eq!(decode_token(&token).unwrap(), 4096);
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert!(decode_token("").is_err());
        assert!(decode_token("1000").is_err());
        assert!(decode_token("czz").is_err());
        assert!(decode_token("c0").is_err());
    }

    #[test]
    fn blank_cursor_means_first_page() {
        assert_eq!(decode_cursor(None).unwrap(), None);
        assert_eq!(decode_cursor(Some("  ")).unwrap(), None);
        assert_eq!(decode_cursor(Some("ca")).unwrap(), Some(10));
    }

    #[test]
    fn full_page_carries_token_for_last_kept_row() {
        let rows = vec![9, 8, 7, 6];
        let page = Page::from_rows(rows, 3, |r| *r);
        assert_eq!(page.items, vec![9, 8, 7]);
        assert_eq!(page.next_token.as_deref(), Some("c7"));
    }

    #[test]
    fn short_page_has_no_token() {
        let page = Page::from_rows(vec![3, 2], 3, |r| *r);
        assert_eq!(page.items.len(), 2);
        assert!(page.next_token.is_none());
    }
}
