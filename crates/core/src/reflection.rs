//! Reflection (user note) rules: content limits and text direction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const MAX_CONTENT_LENGTH: usize = 50_000;

pub const DIRECTION_LTR: &str = "ltr";
pub const DIRECTION_RTL: &str = "rtl";

/// Writing direction of a reflection, used by the editor and the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            TextDirection::Ltr => DIRECTION_LTR,
            TextDirection::Rtl => DIRECTION_RTL,
        }
    }
}

impl fmt::Display for TextDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            DIRECTION_LTR => Ok(TextDirection::Ltr),
            DIRECTION_RTL => Ok(TextDirection::Rtl),
            other => Err(CoreError::Validation(format!(
                "Invalid direction '{other}'. Valid directions: {DIRECTION_LTR}, {DIRECTION_RTL}"
            ))),
        }
    }
}

/// Validate reflection content (non-blank, <= 50 000 chars).
pub fn validate_content(content: &str) -> Result<(), CoreError> {
    if content.trim().is_empty() {
        return Err(CoreError::Validation(
            "Reflection content must not be empty".into(),
        ));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Reflection content must be at most {MAX_CONTENT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Arabic-script blocks (covers Arabic, Urdu and Persian letters and presentation forms).
fn is_arabic_script(c: char) -> bool {
    matches!(
        c as u32,
        0x0600..=0x06FF | 0x0750..=0x077F | 0x08A0..=0x08FF | 0xFB50..=0xFDFF | 0xFE70..=0xFEFF
    )
}

/// Guess the writing direction of `text`.
///
/// Returns [`TextDirection::Rtl`] when Arabic-script letters outnumber all
/// other letters. Text without letters is left-to-right.
pub fn detect_direction(text: &str) -> TextDirection {
    let (rtl, other) = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(rtl, other), c| {
            if is_arabic_script(c) {
                (rtl + 1, other)
            } else {
                (rtl, other + 1)
            }
        });
    if rtl > other {
        TextDirection::Rtl
    } else {
        TextDirection::Ltr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn content_must_not_be_blank() {
        assert_matches!(validate_content(" \n\t"), Err(CoreError::Validation(_)));
        assert!(validate_content("A thought").is_ok());
    }

    #[test]
    fn content_length_limit() {
        assert!(validate_content(&"a".repeat(MAX_CONTENT_LENGTH)).is_ok());
        assert!(validate_content(&"a".repeat(MAX_CONTENT_LENGTH + 1)).is_err());
    }

    #[test]
    fn detects_urdu_as_rtl() {
        assert_eq!(detect_direction("اللہ کی رحمت"), TextDirection::Rtl);
    }

    #[test]
    fn detects_english_as_ltr() {
        assert_eq!(detect_direction("Mercy of Allah"), TextDirection::Ltr);
    }

    #[test]
    fn majority_wins_in_mixed_text() {
        assert_eq!(detect_direction("Ayah: بسم الله الرحمن الرحيم"), TextDirection::Rtl);
        assert_eq!(detect_direction("The word رب means Lord"), TextDirection::Ltr);
    }

    #[test]
    fn digits_and_punctuation_only_is_ltr() {
        assert_eq!(detect_direction("2:255 ..."), TextDirection::Ltr);
        assert_eq!(detect_direction(""), TextDirection::Ltr);
    }

    #[test]
    fn parses_direction_names() {
        assert_eq!("rtl".parse::<TextDirection>().unwrap(), TextDirection::Rtl);
        assert!("RTL".parse::<TextDirection>().is_err());
    }
}
