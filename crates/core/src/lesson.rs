//! Lesson field validation.

use crate::error::CoreError;
use crate::links::validate_web_url;

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_PART_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;
pub const MAX_REFERENCE_LENGTH: usize = 500;

fn validate_required(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    validate_max(field, value, max)
}

fn validate_max(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Validate a lesson title (non-empty, <= 200 chars). Also used for the Urdu title.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    validate_required("Title", title, MAX_TITLE_LENGTH)
}

/// Validate the syllabus part a lesson belongs to.
pub fn validate_part(part: &str) -> Result<(), CoreError> {
    validate_required("Part", part, MAX_PART_LENGTH)
}

pub fn validate_description(description: &str) -> Result<(), CoreError> {
    validate_max("Description", description, MAX_DESCRIPTION_LENGTH)
}

pub fn validate_reference(reference: &str) -> Result<(), CoreError> {
    validate_max("Reference", reference, MAX_REFERENCE_LENGTH)
}

/// Validate an external presentation link. Only absolute http(s) URLs are accepted.
pub fn validate_presentation_url(url: &str) -> Result<(), CoreError> {
    validate_web_url("Presentation URL", url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_rules() {
        assert!(validate_title("Surah Al-Fatiha").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).is_err());
    }

    #[test]
    fn urdu_title_length_counts_characters() {
        let urdu: String = std::iter::repeat('ق').take(MAX_TITLE_LENGTH).collect();
        assert!(validate_title(&urdu).is_ok());
    }

    #[test]
    fn part_must_not_be_blank() {
        assert!(validate_part("  ").is_err());
        assert!(validate_part("Part 1").is_ok());
    }

    #[test]
    fn description_may_be_empty() {
        assert!(validate_description("").is_ok());
        assert!(validate_description(&"a".repeat(MAX_DESCRIPTION_LENGTH + 1)).is_err());
    }

    #[test]
    fn presentation_url_requires_web_scheme() {
        assert!(validate_presentation_url("https://docs.google.com/presentation/d/abc").is_ok());
        assert!(validate_presentation_url("http://example.com/slides.pdf").is_ok());
        assert!(validate_presentation_url("javascript:alert(1)").is_err());
        assert!(validate_presentation_url("ftp://example.com/file").is_err());
        assert!(validate_presentation_url("/relative/path").is_err());
    }
}
