//! Call categorization
//!
//! Counts how many of each category's keywords appear in the
//! transcript (presence, not occurrences) and picks the best count.
//! Ties go to the first category in rule order; no match at all
//! yields "Unknown".

use std::collections::BTreeMap;

use call_audit_config::AnalysisRules;
use call_audit_core::CategoryResult;
use regex::Regex;

/// Keyword-based call categorizer
pub struct Categorizer {
    categories: Vec<CompiledCategory>,
}

struct CompiledCategory {
    name: String,
    keywords: Vec<Regex>,
}

impl Categorizer {
    /// Compile keyword patterns from the rules
    pub fn new(rules: &AnalysisRules) -> Self {
        let categories = rules
            .categories
            .iter()
            .map(|(name, keywords)| CompiledCategory {
                name: name.clone(),
                keywords: keywords
                    .iter()
                    .filter_map(|keyword| {
                        Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword))).ok()
                    })
                    .collect(),
            })
            .collect();

        Self { categories }
    }

    /// Pick the category with the most keyword hits
    pub fn categorize(&self, text: &str) -> CategoryResult {
        let mut hits: BTreeMap<String, u32> = BTreeMap::new();
        let mut best: Option<(&str, u32)> = None;

        for category in &self.categories {
            let count = category
                .keywords
                .iter()
                .filter(|keyword| keyword.is_match(text))
                .count() as u32;
            if count == 0 {
                continue;
            }
            hits.insert(category.name.clone(), count);
            // Strictly-greater keeps the first category on ties.
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((&category.name, count));
            }
        }

        match best {
            Some((name, count)) => {
                tracing::info!(category = name, hits = count, "Call categorized");
                CategoryResult {
                    category: name.to_string(),
                    hits,
                }
            }
            None => {
                tracing::warn!("No matching category found, categorizing as 'Unknown'");
                CategoryResult::unknown()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categorizer() -> Categorizer {
        Categorizer::new(&AnalysisRules::default())
    }

    #[test]
    fn test_billing_wins() {
        let result =
            categorizer().categorize("I was overcharged on my bill and want a refund");
        assert_eq!(result.category, "Billing");
        assert_eq!(result.hits["Billing"], 3);
    }

    #[test]
    fn test_unknown_when_no_match() {
        let result = categorizer().categorize("completely unrelated chatter");
        assert_eq!(result.category, "Unknown");
        assert!(result.hits.is_empty());
    }

    #[test]
    fn test_presence_counts_once() {
        // Repeating a keyword must not inflate its category.
        let result = categorizer().categorize("refund refund refund");
        assert_eq!(result.hits["Billing"], 1);
    }

    #[test]
    fn test_tie_goes_to_first_category() {
        // One keyword each for Billing and Sales; Billing sorts first.
        let result = categorizer().categorize("the invoice mentions an upgrade");
        assert_eq!(result.hits["Billing"], 1);
        assert_eq!(result.hits["Sales"], 1);
        assert_eq!(result.category, "Billing");
    }

    #[test]
    fn test_word_boundaries() {
        // "billboard" must not count as "bill"
        let result = categorizer().categorize("the billboard was huge");
        assert!(result.hits.get("Billing").is_none());
    }
}
