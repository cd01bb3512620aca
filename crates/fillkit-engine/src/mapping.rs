//! Label-to-profile-path resolution.
//!
//! Three cascading strategies, tried in strict priority order: exact table
//! lookup, fuzzy similarity against the table keys, and escalation to an
//! external semantic-mapping assistant. The first strategy to produce a
//! result wins.

use std::sync::Arc;

use similar::TextDiff;
use tracing::debug;

use fillkit_core::defaults::{EXACT_MATCH_CONFIDENCE, FUZZY_MATCH_THRESHOLD};
use fillkit_core::{FieldMapping, FormField, MappingAssistant, ProfilePath, Result};

/// Static label→path table, keyed by normalized label.
///
/// Declaration order doubles as the tie-break order for fuzzy matches, so
/// equal-similarity candidates resolve deterministically.
pub const LABEL_TABLE: &[(&str, &str)] = &[
    ("name", "identity.full_name"),
    ("full name", "identity.full_name"),
    ("patient name", "identity.full_name"),
    ("applicant name", "identity.full_name"),
    ("employee name", "identity.full_name"),
    ("first name", "identity.first_name"),
    ("last name", "identity.last_name"),
    ("middle name", "identity.middle_name"),
    ("dob", "identity.date_of_birth"),
    ("date of birth", "identity.date_of_birth"),
    ("birth date", "identity.date_of_birth"),
    ("ssn", "identity.ssn"),
    ("social security", "identity.ssn"),
    ("social security number", "identity.ssn"),
    ("tax id", "identity.tax_id"),
    ("ein", "identity.tax_id"),
    ("passport number", "identity.passport_number"),
    ("drivers license", "identity.drivers_license"),
    ("driver license number", "identity.drivers_license"),
    ("email", "contact.email"),
    ("email address", "contact.email"),
    ("phone", "contact.phone"),
    ("phone number", "contact.phone"),
    ("telephone", "contact.phone"),
    ("address", "contact.address.street"),
    ("street address", "contact.address.street"),
    ("mailing address", "contact.address.street"),
    ("city", "contact.address.city"),
    ("state", "contact.address.state"),
    ("zip", "contact.address.zip"),
    ("zip code", "contact.address.zip"),
    ("postal code", "contact.address.zip"),
    ("employer", "employment.employer"),
    ("employer name", "employment.employer"),
    ("occupation", "employment.occupation"),
    ("job title", "employment.occupation"),
    ("account number", "finance.account_number"),
    ("routing number", "finance.routing_number"),
];

/// AcroForm container prefixes that carry no label information.
const ACROFORM_PREFIXES: &[&str] = &["form1[0].", "topmostsubform[0].", "page1[0]."];

/// Normalize a field label for table lookup.
///
/// Lowercases, trims, strips AcroForm container prefixes, treats the
/// separators `_ - .` as spaces, and collapses runs of whitespace.
pub fn normalize_label(label: &str) -> String {
    let mut label = label.to_lowercase();
    for prefix in ACROFORM_PREFIXES {
        if let Some(rest) = label.strip_prefix(prefix) {
            label = rest.to_string();
            break;
        }
    }
    label
        .chars()
        .map(|c| if matches!(c, '_' | '-' | '.') { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Character-level similarity in [0, 1] between two normalized labels.
fn similarity(a: &str, b: &str) -> f32 {
    TextDiff::from_chars(a, b).ratio()
}

/// Resolves a field's label to a profile path.
///
/// A pure function of the label string plus the static table, except for
/// the assisted strategy, which escalates to the external collaborator.
#[derive(Clone)]
pub struct FieldMapper {
    assistant: Option<Arc<dyn MappingAssistant>>,
}

impl FieldMapper {
    /// Mapper using only the static strategies.
    pub fn new() -> Self {
        Self { assistant: None }
    }

    /// Attach a semantic-mapping assistant as the final strategy.
    pub fn with_assistant(mut self, assistant: Arc<dyn MappingAssistant>) -> Self {
        self.assistant = Some(assistant);
        self
    }

    /// Map a field to a profile path, or `None` if no strategy produces one.
    pub async fn map(&self, field: &FormField) -> Result<Option<FieldMapping>> {
        let normalized = normalize_label(&field.label);

        // Strategy 1: exact table lookup.
        if let Some((_, path)) = LABEL_TABLE.iter().find(|(key, _)| *key == normalized) {
            debug!(
                field_id = %field.id,
                profile_path = path,
                strategy = "exact",
                "Mapped field label"
            );
            return Ok(Some(FieldMapping {
                field_id: field.id.clone(),
                path: ProfilePath::new(*path),
                confidence: EXACT_MATCH_CONFIDENCE,
            }));
        }

        // Strategy 2: best fuzzy match against the table keys, accepted only
        // above the threshold. Earlier table entries win score ties.
        let mut best: Option<(&str, f32)> = None;
        for (key, path) in LABEL_TABLE {
            let score = similarity(&normalized, key);
            if best.map(|(_, s)| score > s).unwrap_or(true) {
                best = Some((*path, score));
            }
        }
        if let Some((path, score)) = best {
            if score > FUZZY_MATCH_THRESHOLD {
                debug!(
                    field_id = %field.id,
                    profile_path = path,
                    strategy = "fuzzy",
                    confidence = score,
                    "Mapped field label"
                );
                return Ok(Some(FieldMapping {
                    field_id: field.id.clone(),
                    path: ProfilePath::new(path),
                    confidence: score,
                }));
            }
        }

        // Strategy 3: escalate the raw label to the assistant.
        if let Some(assistant) = &self.assistant {
            if let Some(suggested) = assistant.suggest(&field.label).await? {
                debug!(
                    field_id = %field.id,
                    profile_path = %suggested.path,
                    strategy = "assisted",
                    confidence = suggested.confidence,
                    "Mapped field label"
                );
                return Ok(Some(FieldMapping {
                    field_id: field.id.clone(),
                    path: suggested.path,
                    confidence: suggested.confidence,
                }));
            }
        }

        debug!(field_id = %field.id, label = %field.label, "No mapping found");
        Ok(None)
    }
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fillkit_core::FieldType;

    struct TableAssistant;

    #[async_trait]
    impl MappingAssistant for TableAssistant {
        async fn suggest(&self, label: &str) -> Result<Option<FieldMapping>> {
            if label.contains("Guardian") {
                Ok(Some(FieldMapping {
                    field_id: String::new(),
                    path: ProfilePath::new("family.guardian_name"),
                    confidence: 0.7,
                }))
            } else {
                Ok(None)
            }
        }
    }

    fn field(label: &str) -> FormField {
        FormField::new("f1", label, FieldType::Text)
    }

    #[test]
    fn test_normalize_lowercases_and_trims() {
        assert_eq!(normalize_label("  Patient Name  "), "patient name");
    }

    #[test]
    fn test_normalize_strips_acroform_prefix() {
        assert_eq!(normalize_label("form1[0].Last_Name"), "last name");
        assert_eq!(normalize_label("topmostsubform[0].SSN"), "ssn");
    }

    #[test]
    fn test_normalize_collapses_separators() {
        assert_eq!(normalize_label("date-of_birth"), "date of birth");
        assert_eq!(normalize_label("zip..code"), "zip code");
    }

    #[tokio::test]
    async fn test_exact_match_confidence_one() {
        let mapper = FieldMapper::new();

        for label in ["Patient Name", "PATIENT NAME", "  patient name "] {
            let mapping = mapper.map(&field(label)).await.unwrap().unwrap();
            assert_eq!(mapping.path.as_str(), "identity.full_name");
            assert_eq!(mapping.confidence, 1.0);
        }
    }

    #[tokio::test]
    async fn test_exact_match_all_table_entries() {
        let mapper = FieldMapper::new();
        for (key, path) in LABEL_TABLE {
            let mapping = mapper.map(&field(key)).await.unwrap().unwrap();
            assert_eq!(mapping.path.as_str(), *path, "entry {key}");
            assert_eq!(mapping.confidence, 1.0, "entry {key}");
        }
    }

    #[tokio::test]
    async fn test_fuzzy_match_above_threshold() {
        let mapper = FieldMapper::new();

        // One character off "email address"
        let mapping = mapper.map(&field("emall address")).await.unwrap().unwrap();
        assert_eq!(mapping.path.as_str(), "contact.email");
        assert!(mapping.confidence > 0.8);
        assert!(mapping.confidence < 1.0);
    }

    #[tokio::test]
    async fn test_fuzzy_never_accepts_at_or_below_threshold() {
        let mapper = FieldMapper::new();

        // Unrelated labels must not produce a low-confidence fuzzy result.
        for label in ["favorite color", "qqqq", "emergency contact relationship"] {
            let result = mapper.map(&field(label)).await.unwrap();
            if let Some(mapping) = result {
                assert!(
                    mapping.confidence > 0.8,
                    "fuzzy mapping for '{label}' leaked at confidence {}",
                    mapping.confidence
                );
            }
        }
    }

    #[tokio::test]
    async fn test_assisted_mapping_used_as_last_resort() {
        let mapper = FieldMapper::new().with_assistant(Arc::new(TableAssistant));

        let mapping = mapper
            .map(&field("Parent or Guardian"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mapping.path.as_str(), "family.guardian_name");
        assert_eq!(mapping.confidence, 0.7);
        // The assistant's mapping is rebound to the field under consideration.
        assert_eq!(mapping.field_id, "f1");
    }

    #[tokio::test]
    async fn test_absent_when_no_strategy_matches() {
        let mapper = FieldMapper::new().with_assistant(Arc::new(TableAssistant));
        assert!(mapper.map(&field("favorite color")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mapping_deterministic_for_repeated_labels() {
        let mapper = FieldMapper::new();

        let a = mapper.map(&field("emall address")).await.unwrap().unwrap();
        let b = mapper.map(&field("emall address")).await.unwrap().unwrap();
        assert_eq!(a.path, b.path);
        assert_eq!(a.confidence, b.confidence);
    }
}
