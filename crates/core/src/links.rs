//! External link validation shared by lessons and profiles.

use validator::ValidateUrl;

use crate::error::CoreError;

/// Validate that `url` is an absolute http or https URL.
///
/// `field` names the input in the error message.
pub fn validate_web_url(field: &str, url: &str) -> Result<(), CoreError> {
    let lower = url.to_ascii_lowercase();
    let has_web_scheme = lower.starts_with("https://") || lower.starts_with("http://");
    if !has_web_scheme || !url.validate_url() {
        return Err(CoreError::Validation(format!(
            "{field} must be an absolute http or https URL"
        )));
    }
    Ok(())
}
