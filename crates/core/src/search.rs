//! Free-text filter helpers.
//!
//! List endpoints accept a `text` filter that matches a handful of columns
//! case-insensitively. The repository layer binds the pattern built here to
//! `ILIKE ... ESCAPE '\'`.

/// Build an `ILIKE` substring pattern from user input.
///
/// Escapes `\`, `%` and `_` so they match literally. Returns `None` for
/// empty or whitespace-only input, meaning "no text filter".
///
/// # Examples
///
/// ```
/// use tnc_core::search::like_pattern;
/// assert_eq!(like_pattern("aws"), Some("%aws%".to_string()));
/// assert_eq!(like_pattern("100%"), Some("%100\\%%".to_string()));
/// assert_eq!(like_pattern("  "), None);
/// ```
pub fn like_pattern(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut escaped = String::with_capacity(trimmed.len() + 2);
    escaped.push('%');
    for c in trimmed.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    Some(escaped)
}

/// Normalize an optional equality filter: trims and drops blanks.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_plain_text() {
        assert_eq!(like_pattern("Cloud"), Some("%Cloud%".to_string()));
    }

    #[test]
    fn trims_input() {
        assert_eq!(like_pattern("  ec2 "), Some("%ec2%".to_string()));
    }

    #[test]
    fn escapes_wildcards() {
        assert_eq!(like_pattern("a_b"), Some("%a\\_b%".to_string()));
        assert_eq!(like_pattern("c:\\x"), Some("%c:\\\\x%".to_string()));
    }

    #[test]
    fn blank_is_no_filter() {
        assert_eq!(like_pattern(""), None);
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(Some(" draft ")), Some("draft"));
        assert_eq!(non_blank(None), None);
    }
}
