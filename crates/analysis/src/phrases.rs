//! Phrase compliance checking
//!
//! Required phrases are treated as case-insensitive regex patterns,
//! so a rule like `how can I (help|assist)` works. Forbidden phrases
//! are literals matched on word boundaries.

use call_audit_config::AnalysisRules;
use call_audit_core::{Error, ForbiddenPhraseViolation, PhraseCheckResult, Result};
use regex::Regex;

/// Checks transcripts against the configured phrase lists
pub struct PhraseChecker {
    required: Vec<CompiledPhrase>,
    forbidden: Vec<CompiledPhrase>,
}

struct CompiledPhrase {
    pattern: Regex,
    phrase: String,
}

impl PhraseChecker {
    /// Compile the phrase lists from the rules
    pub fn new(rules: &AnalysisRules) -> Result<Self> {
        let required = rules
            .required_phrases
            .iter()
            .map(|phrase| {
                Regex::new(&format!("(?i){}", phrase))
                    .map(|pattern| CompiledPhrase {
                        pattern,
                        phrase: phrase.clone(),
                    })
                    .map_err(|e| Error::InvalidRule {
                        key: format!("required_phrases: {}", phrase),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let forbidden = rules
            .forbidden_phrases
            .iter()
            .map(|phrase| {
                Regex::new(&format!(r"(?i)\b{}\b", regex::escape(phrase)))
                    .map(|pattern| CompiledPhrase {
                        pattern,
                        phrase: phrase.clone(),
                    })
                    .map_err(|e| Error::InvalidRule {
                        key: format!("forbidden_phrases: {}", phrase),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            required,
            forbidden,
        })
    }

    /// Check a transcript for required and forbidden phrases
    pub fn check(&self, text: &str) -> PhraseCheckResult {
        let mut present_phrases = Vec::new();
        let mut missing_phrases = Vec::new();

        for rule in &self.required {
            if rule.pattern.is_match(text) {
                present_phrases.push(rule.phrase.clone());
            } else {
                missing_phrases.push(rule.phrase.clone());
            }
        }

        let violations: Vec<ForbiddenPhraseViolation> = self
            .forbidden
            .iter()
            .filter_map(|rule| {
                rule.pattern.find(text).map(|m| {
                    ForbiddenPhraseViolation::new(&rule.phrase, m.as_str(), m.start(), m.end())
                })
            })
            .collect();

        if present_phrases.is_empty() {
            tracing::warn!("No required phrases found in the transcript");
        }
        if !violations.is_empty() {
            tracing::warn!(count = violations.len(), "Forbidden phrases detected");
        }

        PhraseCheckResult {
            required_present: !present_phrases.is_empty(),
            present_phrases,
            missing_phrases,
            violations,
        }
    }
}
