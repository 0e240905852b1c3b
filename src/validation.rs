use crate::error::{Error, Result};

const MAX_SLUG_LEN: usize = 64;
const MAX_DISPLAY_NAME_LEN: usize = 255;
const MAX_EMAIL_LEN: usize = 254;

fn is_valid_slug_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'
}

/// Slugs name organizations and spaces in URLs.
pub fn validate_slug(slug: &str, entity: &str) -> Result<()> {
    if slug.is_empty() {
        return Err(Error::BadRequest(format!("{entity} slug cannot be empty")));
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(Error::BadRequest(format!(
            "{entity} slug cannot exceed {MAX_SLUG_LEN} characters"
        )));
    }
    if !slug.chars().all(is_valid_slug_char) {
        return Err(Error::BadRequest(format!(
            "{entity} slug can only contain lowercase letters, digits, hyphens, and underscores"
        )));
    }
    if slug.starts_with('-') || slug.starts_with('_') {
        return Err(Error::BadRequest(format!(
            "{entity} slug cannot start with a hyphen or underscore"
        )));
    }
    Ok(())
}

/// Free-form names: pages, users, organizations, spaces.
pub fn validate_display_name(name: &str, entity: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::BadRequest(format!("{entity} name cannot be empty")));
    }
    if name.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(Error::BadRequest(format!(
            "{entity} name cannot exceed {MAX_DISPLAY_NAME_LEN} characters"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(Error::BadRequest(format!(
            "{entity} name cannot contain control characters"
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<()> {
    let valid = email.len() <= MAX_EMAIL_LEN
        && !email.chars().any(char::is_whitespace)
        && matches!(email.split_once('@'), Some((local, domain))
            if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.') && !domain.contains('@'));

    if !valid {
        return Err(Error::BadRequest(format!("Invalid email '{email}'")));
    }
    Ok(())
}

/// Emails are compared case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
