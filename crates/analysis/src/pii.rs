//! PII detection and masking
//!
//! Regex patterns from the rules file are masked in the output text;
//! sensitive words only flag detection, mirroring how agents confirm
//! e.g. a password without the word itself being secret.

use call_audit_config::AnalysisRules;
use call_audit_core::{Error, MaskStyle, PiiCheckResult, PiiEntity, Result};
use regex::Regex;

/// Detects and masks PII in transcripts
pub struct PiiDetector {
    patterns: Vec<CompiledPattern>,
    sensitive_words: Vec<String>,
    mask: MaskStyle,
}

struct CompiledPattern {
    name: String,
    regex: Regex,
}

impl PiiDetector {
    /// Compile the PII patterns from the rules
    pub fn new(rules: &AnalysisRules, mask: MaskStyle) -> Result<Self> {
        let patterns = rules
            .pii_patterns
            .iter()
            .map(|(name, pattern)| {
                Regex::new(pattern)
                    .map(|regex| CompiledPattern {
                        name: name.clone(),
                        regex,
                    })
                    .map_err(|e| Error::InvalidRule {
                        key: format!("pii_patterns.{}", name),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let sensitive_words = rules
            .sensitive_words
            .iter()
            .map(|w| w.to_lowercase())
            .collect();

        Ok(Self {
            patterns,
            sensitive_words,
            mask,
        })
    }

    /// Detect PII and produce the masked text
    pub fn check(&self, text: &str) -> PiiCheckResult {
        let mut entities = Vec::new();
        let mut masked_text = text.to_string();

        for pattern in &self.patterns {
            for m in pattern.regex.find_iter(text) {
                entities.push(PiiEntity::new(
                    &pattern.name,
                    m.as_str(),
                    m.start(),
                    m.end(),
                ));
            }

            // Masks are applied per pattern over the running text, so
            // overlapping rules see each other's replacements.
            masked_text = pattern
                .regex
                .replace_all(&masked_text, |caps: &regex::Captures| {
                    self.mask.apply(&pattern.name, &caps[0])
                })
                .into_owned();
        }

        let lowered = text.to_lowercase();
        let sensitive_words: Vec<String> = self
            .sensitive_words
            .iter()
            .filter(|word| lowered.contains(word.as_str()))
            .cloned()
            .collect();

        let detected = !entities.is_empty() || !sensitive_words.is_empty();
        if detected {
            tracing::warn!(
                entities = entities.len(),
                sensitive = sensitive_words.len(),
                "PII detected and masked"
            );
        }

        PiiCheckResult {
            detected,
            masked_text,
            entities,
            sensitive_words,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(mask: MaskStyle) -> PiiDetector {
        PiiDetector::new(&AnalysisRules::default(), mask).unwrap()
    }

    #[test]
    fn test_phone_number_masked() {
        let result = detector(MaskStyle::Fixed).check("call me on 9876 543 210 tomorrow");
        assert!(result.detected);
        assert_eq!(result.masked_text, "call me on **** tomorrow");
        assert_eq!(result.entities[0].pattern, "phone_number");
    }

    #[test]
    fn test_email_label_mask() {
        let result = detector(MaskStyle::Label).check("send it to jane.doe@example.com please");
        assert!(result.detected);
        assert_eq!(result.masked_text, "send it to [EMAIL] please");
    }

    #[test]
    fn test_entity_spans_index_original_text() {
        let text = "my email is jane@example.org";
        let result = detector(MaskStyle::Fixed).check(text);
        let entity = result
            .entities
            .iter()
            .find(|e| e.pattern == "email")
            .unwrap();
        assert_eq!(&text[entity.start..entity.end], "jane@example.org");
    }

    #[test]
    fn test_sensitive_word_flags_without_masking() {
        let result = detector(MaskStyle::Fixed).check("I will read you my PASSWORD now");
        assert!(result.detected);
        assert!(result.entities.is_empty());
        assert_eq!(result.sensitive_words, vec!["password"]);
        assert_eq!(result.masked_text, "I will read you my PASSWORD now");
    }

    #[test]
    fn test_clean_text() {
        let result = detector(MaskStyle::Fixed).check("the weather is lovely today");
        assert!(!result.detected);
        assert_eq!(result.masked_text, "the weather is lovely today");
    }
}
