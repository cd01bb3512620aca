//! Keyword-scored document categorization.

use once_cell::sync::Lazy;
use tracing::debug;

use fillkit_core::{Category, FormField};

/// Category keyword tables, in declaration order.
///
/// Declaration order is the tie-break: when two categories score equal and
/// non-zero, the earlier entry wins. Housing precedes financial so
/// overlapping mortgage/lease paperwork resolves to the more specific
/// housing list. Keyword sets may overlap; the order here is the contract.
pub static CATEGORY_KEYWORDS: Lazy<Vec<(Category, Vec<&'static str>)>> = Lazy::new(|| {
    vec![
        (
            Category::Medical,
            vec![
                "insurance", "doctor", "hospital", "pharmacy", "health", "medical", "patient",
                "diagnosis", "prescription", "clinic", "dental", "vision", "therapy", "copay",
                "deductible", "blue cross", "aetna", "cigna", "united health", "kaiser",
            ],
        ),
        (
            Category::Housing,
            vec![
                "lease", "rent", "mortgage", "utility", "hoa", "landlord", "tenant", "property",
                "electric", "gas", "water", "sewer", "maintenance", "inspection",
            ],
        ),
        (
            Category::Financial,
            vec![
                "tax", "bank", "loan", "credit", "investment", "1099", "w-2", "w2", "irs",
                "income", "deposit", "withdrawal", "mortgage", "interest", "dividend",
                "portfolio", "401k", "savings", "checking", "routing", "account number",
            ],
        ),
        (
            Category::Legal,
            vec![
                "contract", "agreement", "court", "attorney", "will", "power of attorney",
                "notary", "affidavit", "deposition", "settlement", "lawsuit", "arbitration",
                "legal",
            ],
        ),
        (
            Category::Vehicle,
            vec![
                "dmv", "registration", "title", "vin", "odometer", "vehicle", "auto", "car",
                "truck", "motorcycle", "license plate", "emission", "smog",
            ],
        ),
        (
            Category::Government,
            vec![
                "irs", "ssa", "passport", "visa", "license", "social security", "citizenship",
                "immigration", "permit", "census", "voter", "selective service",
            ],
        ),
        (
            Category::Personal,
            vec![
                "school", "employment", "certificate", "resume", "transcript", "diploma",
                "birth", "marriage", "death", "adoption", "membership",
            ],
        ),
    ]
});

/// Scores a document against the category keyword tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct Categorizer;

impl Categorizer {
    pub fn new() -> Self {
        Self
    }

    /// Pick the best-scoring category for the document.
    ///
    /// Score per category is the count of keywords present (case-insensitive
    /// substring) in the concatenation of document text and field
    /// labels/values. A zero maximum returns the fallback
    /// [`Category::Uncategorized`] rather than an arbitrary zero-score pick.
    pub fn categorize(&self, document_text: &str, fields: &[FormField]) -> Category {
        let mut combined = String::from(document_text);
        for field in fields {
            combined.push(' ');
            combined.push_str(&field.label);
            if let Some(value) = &field.value {
                combined.push(' ');
                combined.push_str(value);
            }
        }
        let combined = combined.to_lowercase();

        let mut best: Option<(Category, usize)> = None;
        for (category, keywords) in CATEGORY_KEYWORDS.iter() {
            let score = keywords.iter().filter(|kw| combined.contains(*kw)).count();
            // Strictly-greater keeps the first-declared winner on ties.
            if score > 0 && best.map(|(_, s)| score > s).unwrap_or(true) {
                best = Some((*category, score));
            }
        }

        match best {
            Some((category, score)) => {
                debug!(category = category.as_str(), score, "Categorized document");
                category
            }
            None => {
                debug!("No category keyword matched, using fallback");
                Category::Uncategorized
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fillkit_core::FieldType;

    fn labeled(labels: &[&str]) -> Vec<FormField> {
        labels
            .iter()
            .enumerate()
            .map(|(i, l)| FormField::new(format!("f{i}"), *l, FieldType::Text))
            .collect()
    }

    #[test]
    fn test_categorize_medical() {
        let cat = Categorizer::new().categorize(
            "patient intake",
            &labeled(&["Diagnosis", "Insurance Provider"]),
        );
        assert_eq!(cat, Category::Medical);
    }

    #[test]
    fn test_categorize_housing_wins_mortgage_tie() {
        // "mortgage" scores for both housing and financial, "lease" only for
        // housing, "irs" only for financial/government. Housing and financial
        // tie at 2; the earlier-declared housing wins.
        let cat = Categorizer::new().categorize("mortgage lease irs", &[]);
        assert_eq!(cat, Category::Housing);
    }

    #[test]
    fn test_categorize_zero_scores_fall_back() {
        let cat = Categorizer::new().categorize("zzzz qqqq", &labeled(&["Nothing Relevant"]));
        assert_eq!(cat, Category::Uncategorized);
    }

    #[test]
    fn test_categorize_empty_input_falls_back() {
        assert_eq!(Categorizer::new().categorize("", &[]), Category::Uncategorized);
    }

    #[test]
    fn test_categorize_case_insensitive() {
        let cat = Categorizer::new().categorize("DMV REGISTRATION Renewal", &[]);
        assert_eq!(cat, Category::Vehicle);
    }

    #[test]
    fn test_categorize_uses_field_values() {
        let mut fields = labeled(&["Issuer"]);
        fields[0].value = Some("Blue Cross".to_string());
        fields[0].filled = true;

        let cat = Categorizer::new().categorize("form", &fields);
        assert_eq!(cat, Category::Medical);
    }

    #[test]
    fn test_categorize_strict_maximum_wins() {
        // Three financial keywords against one medical keyword.
        let cat = Categorizer::new().categorize("tax 1099 irs health", &[]);
        assert_eq!(cat, Category::Financial);
    }

    #[test]
    fn test_categorize_deterministic() {
        let a = Categorizer::new().categorize("passport visa permit", &[]);
        let b = Categorizer::new().categorize("passport visa permit", &[]);
        assert_eq!(a, b);
        assert_eq!(a, Category::Government);
    }
}
