//! Field validation shared by the services.

use std::sync::LazyLock;

use regex::Regex;
use yatube_common::{AppError, AppResult};

/// Usernames: letters, digits and `@.+-_`.
#[allow(clippy::unwrap_used)]
pub static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").unwrap());

/// Slugs: letters, digits, hyphens and underscores.
#[allow(clippy::unwrap_used)]
pub static SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").unwrap());

/// Require a non-blank text field.
pub fn required_text(field: &'static str, value: Option<String>) -> AppResult<String> {
    let value = value.ok_or_else(|| AppError::field(field, "This field is required."))?;
    if value.trim().is_empty() {
        return Err(AppError::field(field, "This field may not be blank."));
    }
    Ok(value)
}

/// Reject a present but blank text field.
pub fn optional_text(field: &'static str, value: Option<String>) -> AppResult<Option<String>> {
    value.map(|v| required_text(field, Some(v))).transpose()
}
