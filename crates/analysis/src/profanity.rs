//! Profanity detection and censoring
//!
//! Word-list lexicon behind the `ProfanityLexicon` trait; matched
//! words are replaced by asterisks of equal length.

use std::collections::HashSet;
use std::sync::Arc;

use call_audit_core::{ProfanityCheckResult, ProfanityLexicon};
use once_cell::sync::Lazy;
use regex::Regex;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z']+").expect("static word pattern"));

/// Built-in censor list, extended by `profanity_words` in the rules
const DEFAULT_WORDS: &[&str] = &[
    "arsehole", "asshole", "bastard", "bitch", "bloody", "bullshit", "crap", "damn",
    "dammit", "dick", "fuck", "fucking", "goddamn", "piss", "prick", "shit", "wanker",
];

/// Lexicon backed by a lowercased word set
pub struct WordListLexicon {
    words: HashSet<String>,
}

impl WordListLexicon {
    /// Built-in list plus extra words from the rules
    pub fn with_defaults(extra: &[String]) -> Self {
        let mut words: HashSet<String> = DEFAULT_WORDS.iter().map(|w| w.to_string()).collect();
        words.extend(extra.iter().map(|w| w.to_lowercase()));
        Self { words }
    }
}

impl Default for WordListLexicon {
    fn default() -> Self {
        Self::with_defaults(&[])
    }
}

impl ProfanityLexicon for WordListLexicon {
    fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    fn name(&self) -> &str {
        "word-list"
    }
}

/// Censors transcripts using a profanity lexicon
pub struct ProfanityFilter {
    lexicon: Arc<dyn ProfanityLexicon>,
}

impl ProfanityFilter {
    pub fn new(lexicon: Arc<dyn ProfanityLexicon>) -> Self {
        Self { lexicon }
    }

    /// Censor profane words, keeping everything else byte-identical
    pub fn check(&self, text: &str) -> ProfanityCheckResult {
        let mut censored = String::with_capacity(text.len());
        let mut cursor = 0;
        let mut hits = 0u32;

        for m in WORD.find_iter(text) {
            if self.lexicon.contains(m.as_str()) {
                censored.push_str(&text[cursor..m.start()]);
                censored.push_str(&"*".repeat(m.as_str().chars().count()));
                cursor = m.end();
                hits += 1;
            }
        }
        censored.push_str(&text[cursor..]);

        if hits > 0 {
            tracing::warn!(hits, lexicon = self.lexicon.name(), "Profanity detected");
        }

        ProfanityCheckResult {
            detected: hits > 0,
            censored_text: censored,
            hits,
        }
    }
}

impl Default for ProfanityFilter {
    fn default() -> Self {
        Self::new(Arc::new(WordListLexicon::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_censors_equal_length() {
        let result = ProfanityFilter::default().check("that is damn annoying");
        assert!(result.detected);
        assert_eq!(result.censored_text, "that is **** annoying");
        assert_eq!(result.hits, 1);
    }

    #[test]
    fn test_case_insensitive() {
        let result = ProfanityFilter::default().check("DAMN it all");
        assert_eq!(result.censored_text, "**** it all");
    }

    #[test]
    fn test_clean_text_untouched() {
        let result = ProfanityFilter::default().check("a perfectly polite sentence");
        assert!(!result.detected);
        assert_eq!(result.censored_text, "a perfectly polite sentence");
        assert_eq!(result.hits, 0);
    }

    #[test]
    fn test_extra_words_from_rules() {
        let lexicon = WordListLexicon::with_defaults(&["frak".to_string()]);
        let filter = ProfanityFilter::new(Arc::new(lexicon));
        let result = filter.check("what the frak");
        assert_eq!(result.censored_text, "what the ****");
    }

    #[test]
    fn test_substring_not_censored() {
        // "class" contains "ass" but is not a word-level match
        let result = ProfanityFilter::default().check("the class was fine");
        assert!(!result.detected);
    }
}
