use regex::Regex;

use crate::error::{CommerceError, CommerceResult};

lazy_static::lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles");
}

/// Trimmed, lowercased email or a validation error naming the field.
pub fn normalize_email(field: &str, email: Option<&str>) -> CommerceResult<String> {
    let email = email.map(str::trim).unwrap_or_default();
    if email.is_empty() {
        return Err(CommerceError::validation(format!("{} is required", field)));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(CommerceError::validation(format!("{} is not a valid email address", field)));
    }
    Ok(email.to_lowercase())
}

pub fn required_text(field: &str, value: Option<&str>) -> CommerceResult<String> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(CommerceError::validation(format!("{} is required", field))),
    }
}
