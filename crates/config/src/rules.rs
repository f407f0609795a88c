//! Analysis rule sets
//!
//! The YAML file mirrors what the analysis stages consume: PII regex
//! patterns, sensitive words, required/forbidden phrases, category
//! keywords, and the profanity word list. Every section has a
//! built-in default so the pipeline runs without a rules file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Rule sets consumed by the analysis stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRules {
    /// PII regex patterns keyed by rule name
    #[serde(default = "default_pii_patterns")]
    pub pii_patterns: BTreeMap<String, String>,

    /// Words that flag detection without masking
    #[serde(default = "default_sensitive_words")]
    pub sensitive_words: Vec<String>,

    /// Phrases (regex, case-insensitive) expected in every call
    #[serde(default = "default_required_phrases")]
    pub required_phrases: Vec<String>,

    /// Literal phrases that must never appear
    #[serde(default = "default_forbidden_phrases")]
    pub forbidden_phrases: Vec<String>,

    /// Category keywords keyed by category name
    #[serde(default = "default_categories")]
    pub categories: BTreeMap<String, Vec<String>>,

    /// Profanity words added to the built-in lexicon
    #[serde(default)]
    pub profanity_words: Vec<String>,
}

impl Default for AnalysisRules {
    fn default() -> Self {
        Self {
            pii_patterns: default_pii_patterns(),
            sensitive_words: default_sensitive_words(),
            required_phrases: default_required_phrases(),
            forbidden_phrases: default_forbidden_phrases(),
            categories: default_categories(),
            profanity_words: Vec::new(),
        }
    }
}

fn default_pii_patterns() -> BTreeMap<String, String> {
    let mut patterns = BTreeMap::new();
    patterns.insert(
        "phone_number".to_string(),
        r"\+?\d[\d\s\-]{8,13}\d".to_string(),
    );
    patterns.insert(
        "email".to_string(),
        r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}".to_string(),
    );
    patterns.insert(
        "card_number".to_string(),
        r"\b(?:\d[ -]?){13,16}\b".to_string(),
    );
    patterns.insert(
        "national_id".to_string(),
        r"\b\d{3}-\d{2}-\d{4}\b".to_string(),
    );
    patterns
}

fn default_sensitive_words() -> Vec<String> {
    ["password", "passcode", "cvv", "pin number", "security answer"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_required_phrases() -> Vec<String> {
    [
        "thank you for calling",
        "how can I help",
        "is there anything else",
        "have a great day",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_forbidden_phrases() -> Vec<String> {
    [
        "guaranteed refund",
        "I promise",
        "just trust me",
        "off the record",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_categories() -> BTreeMap<String, Vec<String>> {
    let mut categories = BTreeMap::new();
    categories.insert(
        "Billing".to_string(),
        ["bill", "invoice", "charge", "refund", "payment", "overcharged"]
            .into_iter()
            .map(String::from)
            .collect(),
    );
    categories.insert(
        "Technical Support".to_string(),
        ["error", "not working", "crash", "install", "reset", "troubleshoot"]
            .into_iter()
            .map(String::from)
            .collect(),
    );
    categories.insert(
        "Sales".to_string(),
        ["upgrade", "plan", "pricing", "discount", "purchase", "subscribe"]
            .into_iter()
            .map(String::from)
            .collect(),
    );
    categories.insert(
        "Complaint".to_string(),
        ["complaint", "unhappy", "disappointed", "escalate", "manager"]
            .into_iter()
            .map(String::from)
            .collect(),
    );
    categories
}

impl AnalysisRules {
    /// Load rules from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        Self::from_yaml(&raw)
    }

    /// Parse rules from a YAML string
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let rules: Self =
            serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        rules.validate()?;
        Ok(rules)
    }

    /// Load rules from the configured path, falling back to defaults
    /// when the file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            let rules = Self::from_yaml_file(path)?;
            tracing::info!(path = %path.display(), "Loaded analysis rules");
            Ok(rules)
        } else {
            tracing::info!(path = %path.display(), "Rules file not found, using built-in rules");
            Ok(Self::default())
        }
    }

    /// Validate every regex-bearing section
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, pattern) in &self.pii_patterns {
            regex::Regex::new(pattern).map_err(|e| ConfigError::InvalidValue {
                field: format!("pii_patterns.{}", key),
                message: e.to_string(),
            })?;
        }

        for (index, phrase) in self.required_phrases.iter().enumerate() {
            regex::Regex::new(&format!("(?i){}", phrase)).map_err(|e| {
                ConfigError::InvalidValue {
                    field: format!("required_phrases[{}]", index),
                    message: e.to_string(),
                }
            })?;
        }

        for (name, keywords) in &self.categories {
            if keywords.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("categories.{}", name),
                    message: "Category has no keywords".to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(AnalysisRules::default().validate().is_ok());
    }

    #[test]
    fn test_yaml_round_trip() {
        let yaml = r#"
pii_patterns:
  phone_number: '\d{10}'
sensitive_words:
  - password
required_phrases:
  - "thank you for calling"
forbidden_phrases:
  - "guaranteed refund"
categories:
  Billing:
    - refund
profanity_words:
  - blast
"#;
        let rules = AnalysisRules::from_yaml(yaml).unwrap();
        assert_eq!(rules.pii_patterns.len(), 1);
        assert_eq!(rules.categories["Billing"], vec!["refund"]);
        assert_eq!(rules.profanity_words, vec!["blast"]);
    }

    #[test]
    fn test_bad_regex_names_the_key() {
        let yaml = r#"
pii_patterns:
  broken: '(unclosed'
"#;
        let err = AnalysisRules::from_yaml(yaml).unwrap_err();
        match err {
            ConfigError::InvalidValue { field, .. } => {
                assert_eq!(field, "pii_patterns.broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_category_rejected() {
        let yaml = r#"
categories:
  Empty: []
"#;
        assert!(AnalysisRules::from_yaml(yaml).is_err());
    }
}
