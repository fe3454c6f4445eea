//! Input validation for user-supplied values.
//!
//! Anything typed or pasted by the user (image URLs, icon names, geometry
//! coming from scripts) is checked here before it reaches the document.

use thiserror::Error;

use crate::geometry::MIN_ELEMENT_SIZE;

/// Scheme prefix every externally loaded resource must use.
pub const SECURE_SCHEME_PREFIX: &str = "https://";

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The URL does not use secure transport.
    #[error("URL must start with {SECURE_SCHEME_PREFIX}: {0}")]
    InsecureUrl(String),
    /// An icon was requested without a name.
    #[error("icon name must not be empty")]
    EmptyIconName,
    /// A coordinate or size is NaN or infinite.
    #[error("geometry value for {0} is not finite")]
    NonFiniteGeometry(&'static str),
    /// A width or height is smaller than the minimum element size.
    #[error("{0} must be at least {MIN_ELEMENT_SIZE}px")]
    BelowMinimumSize(&'static str),
}

/// Validate a URL for an image or background image.
///
/// Only `https://` URLs with something after the scheme are accepted.
///
/// # Errors
///
/// Returns [`ValidationError::InsecureUrl`] for any other value.
pub fn validate_secure_url(url: &str) -> Result<(), ValidationError> {
    let trimmed = url.trim();
    match trimmed.strip_prefix(SECURE_SCHEME_PREFIX) {
        Some(rest) if !rest.is_empty() && !rest.chars().any(char::is_whitespace) => Ok(()),
        _ => Err(ValidationError::InsecureUrl(trimmed.to_string())),
    }
}

/// Validate an icon identifier.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyIconName`] if the name is blank.
pub fn validate_icon_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyIconName);
    }
    Ok(())
}

/// Validate a single geometry value.
///
/// # Errors
///
/// Returns [`ValidationError::NonFiniteGeometry`] if the value is NaN or infinite.
pub fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFiniteGeometry(field))
    }
}

/// Validate a width or height.
///
/// # Errors
///
/// Returns [`ValidationError::BelowMinimumSize`] below [`MIN_ELEMENT_SIZE`].
pub fn validate_min_size(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value >= MIN_ELEMENT_SIZE {
        Ok(())
    } else {
        Err(ValidationError::BelowMinimumSize(field))
    }
}
