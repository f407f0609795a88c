//! PII (Personally Identifiable Information) detection types
//!
//! Pattern names come from the rules file (`pii_patterns`); the types
//! here only carry what was matched and how it gets masked.

use serde::{Deserialize, Serialize};

/// A detected PII match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiiEntity {
    /// Name of the rule that matched (e.g. "phone_number")
    pub pattern: String,
    /// The matched text
    pub text: String,
    /// Start position in the original text (byte offset)
    pub start: usize,
    /// End position in the original text (byte offset)
    pub end: usize,
}

impl PiiEntity {
    /// Create a new entity
    pub fn new(
        pattern: impl Into<String>,
        text: impl Into<String>,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            text: text.into(),
            start,
            end,
        }
    }
}

/// How detected PII is replaced in the masked text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskStyle {
    /// Replace with a fixed `****`
    #[default]
    Fixed,
    /// Replace with the pattern name: `[PHONE_NUMBER]`
    Label,
    /// Replace with asterisks of equal character length
    Equal,
}

impl MaskStyle {
    /// Produce the replacement for one match
    pub fn apply(&self, pattern: &str, text: &str) -> String {
        match self {
            Self::Fixed => "****".to_string(),
            Self::Label => format!("[{}]", pattern.to_uppercase()),
            Self::Equal => "*".repeat(text.chars().count()),
        }
    }
}


impl std::str::FromStr for MaskStyle {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(Self::Fixed),
            "label" => Ok(Self::Label),
            "equal" => Ok(Self::Equal),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown mask style '{}'",
                other
            ))),
        }
    }
}

/// Result of the PII check stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiiCheckResult {
    /// Whether any PII pattern or sensitive word matched
    pub detected: bool,
    /// Input text with pattern matches masked
    pub masked_text: String,
    /// Pattern matches with positions in the original text
    pub entities: Vec<PiiEntity>,
    /// Sensitive words found (flagged, not masked)
    pub sensitive_words: Vec<String>,
}

impl PiiCheckResult {
    /// Result for text with no PII
    pub fn clean(text: impl Into<String>) -> Self {
        Self {
            detected: false,
            masked_text: text.into(),
            entities: Vec::new(),
            sensitive_words: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_mask() {
        assert_eq!(MaskStyle::Fixed.apply("phone_number", "9876543210"), "****");
    }

    #[test]
    fn test_label_mask() {
        assert_eq!(
            MaskStyle::Label.apply("phone_number", "9876543210"),
            "[PHONE_NUMBER]"
        );
    }

    #[test]
    fn test_equal_mask() {
        assert_eq!(MaskStyle::Equal.apply("email", "a@b.co"), "******");
    }

    #[test]
    fn test_clean_result() {
        let result = PiiCheckResult::clean("no secrets here");
        assert!(!result.detected);
        assert_eq!(result.masked_text, "no secrets here");
        assert!(result.entities.is_empty());
    }
}
