//! Phrase compliance types
//!
//! Required phrases (greetings, disclaimers) that must appear in a
//! call, and forbidden phrases that must not.

use serde::{Deserialize, Serialize};

/// A forbidden phrase found in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForbiddenPhraseViolation {
    /// The configured phrase that matched
    pub phrase: String,
    /// The matched text as it appeared
    pub text: String,
    /// Start position in the transcript (byte offset)
    pub start: usize,
    /// End position in the transcript (byte offset)
    pub end: usize,
}

impl ForbiddenPhraseViolation {
    /// Create a new violation
    pub fn new(
        phrase: impl Into<String>,
        text: impl Into<String>,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            phrase: phrase.into(),
            text: text.into(),
            start,
            end,
        }
    }
}

/// Result of the phrase compliance stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseCheckResult {
    /// Whether at least one required phrase is present
    pub required_present: bool,
    /// Required phrases that were found
    pub present_phrases: Vec<String>,
    /// Required phrases that were not found
    pub missing_phrases: Vec<String>,
    /// Forbidden phrases that were found
    pub violations: Vec<ForbiddenPhraseViolation>,
}

impl PhraseCheckResult {
    /// True when no forbidden phrase matched
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// True when every required phrase is present and nothing
    /// forbidden matched
    pub fn is_compliant(&self) -> bool {
        self.missing_phrases.is_empty() && self.violations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compliance_flags() {
        let result = PhraseCheckResult {
            required_present: true,
            present_phrases: vec!["thank you for calling".to_string()],
            missing_phrases: Vec::new(),
            violations: Vec::new(),
        };
        assert!(result.is_compliant());
        assert!(!result.has_violations());
    }

    #[test]
    fn test_violation_breaks_compliance() {
        let result = PhraseCheckResult {
            required_present: true,
            present_phrases: vec!["hello".to_string()],
            missing_phrases: Vec::new(),
            violations: vec![ForbiddenPhraseViolation::new(
                "guaranteed refund",
                "guaranteed refund",
                10,
                27,
            )],
        };
        assert!(!result.is_compliant());
        assert!(result.has_violations());
    }
}
