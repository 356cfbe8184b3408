// SPDX-License-Identifier: Apache-2.0

//! Input sanitization and validation.
//!
//! Everything a caller hands to the request wrappers, and every owner or
//! repository name extracted from a remote URL, passes through here before
//! it reaches a URL path, a search query or an error message.

use crate::error::TechDebtError;

/// Maximum issue title length in characters.
pub const MAX_TITLE_CHARS: usize = 256;

/// Maximum issue body or comment length in characters.
pub const MAX_BODY_CHARS: usize = 65_536;

/// Maximum search query length in characters, after sanitization.
pub const MAX_QUERY_CHARS: usize = 256;

/// Longest untrusted value echoed back inside an error message.
const MAX_DISPLAY_CHARS: usize = 200;

/// Punctuation that is unsafe in URL paths or shell contexts.
const UNSAFE_CHARS: &[char] = &[
    '<', '>', '"', '\'', '`', '{', '}', '[', ']', '(', ')', '%', '$', '#', '@', '&', '*', '!',
    ';', '|', '=', '+', ',', '~', '^',
];

/// Path-traversal characters.
const TRAVERSAL_CHARS: &[char] = &['.', '/', '\\'];

fn is_stripped(c: char) -> bool {
    c.is_control() || TRAVERSAL_CHARS.contains(&c) || UNSAFE_CHARS.contains(&c)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sanitizes an owner, repository or user name for use as a URL path segment.
///
/// Strips path-traversal characters (`.`, `/`, `\`), URL/shell punctuation
/// and control characters, then collapses runs of whitespace. Case is
/// preserved. The function is idempotent.
///
/// # Errors
///
/// Returns `TechDebtError::Validation` if nothing is left after stripping.
///
/// # Examples
///
/// ```
/// use techdebt_core::sanitize::sanitize_path_component;
///
/// assert_eq!(sanitize_path_component("owner", "../../etc/passwd").unwrap(), "etcpasswd");
/// assert_eq!(sanitize_path_component("owner", "octocat").unwrap(), "octocat");
/// ```
pub fn sanitize_path_component(field: &'static str, value: &str) -> Result<String, TechDebtError> {
    let stripped: String = value.chars().filter(|c| !is_stripped(*c)).collect();
    let collapsed = collapse_whitespace(&stripped);

    if collapsed.is_empty() {
        return Err(TechDebtError::validation(
            field,
            format!(
                "'{}' contains no usable characters",
                escape_for_display(value)
            ),
        ));
    }

    Ok(collapsed)
}

/// Sanitizes a GitHub username used as an assignee or creator filter.
///
/// # Errors
///
/// Returns `TechDebtError::Validation` if nothing is left after stripping.
pub fn sanitize_username(value: &str) -> Result<String, TechDebtError> {
    sanitize_path_component("username", value)
}

/// Validates an issue title: trimmed, control characters flattened to
/// spaces, 1 to [`MAX_TITLE_CHARS`] characters.
///
/// # Errors
///
/// Returns `TechDebtError::Validation` if the title is empty or too long.
pub fn validate_title(title: &str) -> Result<String, TechDebtError> {
    let flattened: String = title
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let title = flattened.trim();

    if title.is_empty() {
        return Err(TechDebtError::validation("title", "must not be empty"));
    }

    let len = title.chars().count();
    if len > MAX_TITLE_CHARS {
        return Err(TechDebtError::validation(
            "title",
            format!("must be at most {MAX_TITLE_CHARS} characters (got {len})"),
        ));
    }

    Ok(title.to_string())
}

/// Validates an issue body. Empty bodies are allowed.
///
/// # Errors
///
/// Returns `TechDebtError::Validation` if the body exceeds [`MAX_BODY_CHARS`].
pub fn validate_body(body: &str) -> Result<String, TechDebtError> {
    check_body_length("body", body)
}

/// Validates a comment body: must contain non-whitespace text and fit in
/// [`MAX_BODY_CHARS`].
///
/// # Errors
///
/// Returns `TechDebtError::Validation` if the comment is blank or too long.
pub fn validate_comment(body: &str) -> Result<String, TechDebtError> {
    if body.trim().is_empty() {
        return Err(TechDebtError::validation("comment", "must not be empty"));
    }
    check_body_length("comment", body)
}

fn check_body_length(field: &'static str, body: &str) -> Result<String, TechDebtError> {
    let cleaned: String = body.chars().filter(|c| *c != '\0').collect();
    let len = cleaned.chars().count();
    if len > MAX_BODY_CHARS {
        return Err(TechDebtError::validation(
            field,
            format!("must be at most {MAX_BODY_CHARS} characters (got {len})"),
        ));
    }
    Ok(cleaned)
}

/// Validates an issue number: must be a positive integer.
///
/// # Errors
///
/// Returns `TechDebtError::Validation` for zero.
pub fn validate_issue_number(number: u64) -> Result<u64, TechDebtError> {
    if number == 0 {
        return Err(TechDebtError::validation(
            "issue number",
            "must be a positive integer",
        ));
    }
    Ok(number)
}

/// Parses a caller-supplied issue number such as `42` or `#42`.
///
/// # Errors
///
/// Returns `TechDebtError::Validation` if the input is not a positive integer.
pub fn parse_issue_number(input: &str) -> Result<u64, TechDebtError> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

    let number = digits.parse::<u64>().map_err(|_| {
        TechDebtError::validation(
            "issue number",
            format!(
                "'{}' is not a positive integer",
                escape_for_display(trimmed)
            ),
        )
    })?;

    validate_issue_number(number)
}

/// Reduces a free-text search query to word characters, `-`, `_` and
/// single spaces, capped at [`MAX_QUERY_CHARS`].
///
/// Search qualifiers (`repo:`, `label:`) cannot be smuggled in because `:`
/// is stripped.
///
/// # Errors
///
/// Returns `TechDebtError::Validation` if nothing searchable remains.
pub fn sanitize_search_query(query: &str) -> Result<String, TechDebtError> {
    let kept: String = query
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();
    let collapsed: String = collapse_whitespace(&kept)
        .chars()
        .take(MAX_QUERY_CHARS)
        .collect();
    let collapsed = collapsed.trim_end().to_string();

    if collapsed.is_empty() {
        return Err(TechDebtError::validation(
            "search query",
            "must contain letters, digits, '-' or '_'",
        ));
    }

    Ok(collapsed)
}

/// Makes an untrusted string safe to embed in an error message.
///
/// HTML-sensitive characters are escaped, control characters are replaced
/// with `?`, and long values are cut to a bounded length.
#[must_use]
pub fn escape_for_display(value: &str) -> String {
    let mut out = String::with_capacity(value.len().min(MAX_DISPLAY_CHARS));
    for (i, c) in value.chars().enumerate() {
        if i == MAX_DISPLAY_CHARS {
            out.push_str("...");
            break;
        }
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c if c.is_control() => out.push('?'),
            c => out.push(c),
        }
    }
    out
}
