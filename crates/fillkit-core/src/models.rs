//! Core data models for fillkit.
//!
//! These types are shared across all fillkit crates and represent the
//! core domain entities of form filling and GTD filing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// DOCUMENT & FIELD TYPES
// =============================================================================

/// A source PDF document handed to the extraction and writer collaborators.
///
/// The `id` is the session-unique identity that feeds filename
/// disambiguation when two documents collide on a base name.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub id: Uuid,
    pub filename: String,
    pub data: Vec<u8>,
}

impl SourceDocument {
    /// Create a document with a fresh identity.
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            data,
        }
    }

    /// Filename without its final extension.
    pub fn stem(&self) -> &str {
        self.filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.filename)
    }
}

/// PDF form field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Checkbox,
    Radio,
    Dropdown,
    Signature,
    Date,
    Unknown,
}

/// A single form field discovered in a document.
///
/// Invariant: `filled` implies `value` is present. `source` is present only
/// when the value came from a profile mapping; manually answered fields
/// carry `filled = true` with `source = None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    /// Opaque identity, unique within one session.
    pub id: String,
    /// Human-readable label as it appears on the form.
    pub label: String,
    pub field_type: FieldType,
    /// Page the field appears on (0-indexed).
    pub page: u32,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub filled: bool,
    /// Profile path that supplied the value, if mapping-filled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ProfilePath>,
    /// Confidence of the fill, in [0, 1].
    pub confidence: f32,
    /// Declared options for dropdown/radio fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl FormField {
    /// Create an unfilled field with the given identity and label.
    pub fn new(id: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_type,
            page: 0,
            required: false,
            value: None,
            filled: false,
            source: None,
            confidence: 0.0,
            options: Vec::new(),
        }
    }

    /// Mark the field required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the page index.
    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the declared options (dropdown/radio).
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }
}

/// A resolved mapping from a form field to a profile path.
///
/// Produced by the mapper, consumed by the auto-filler. Not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    pub field_id: String,
    pub path: ProfilePath,
    pub confidence: f32,
}

/// A dot-delimited address into the profile's nested key-value structure,
/// e.g. `contact.address.city`. Resolves to at most one value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfilePath(String);

impl ProfilePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate the dot-delimited segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl std::fmt::Display for ProfilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProfilePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// =============================================================================
// MISSING-FIELD REPORTING
// =============================================================================

/// Why a field is still missing after an auto-fill pass.
///
/// The three causes are distinguishable so a caller can decide whether to
/// re-prompt, escalate a disclosure decision, or give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingReason {
    /// No mapping strategy produced a profile path for the label.
    NoMapping,
    /// A mapping exists but the disclosure gate denied the read.
    DisclosureDenied,
    /// The field awaits an externally collected answer.
    AnswerPending,
}

/// A field that still needs a value, with the reason it is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingField {
    pub field_id: String,
    pub label: String,
    pub required: bool,
    pub reason: MissingReason,
}

/// Summary of one auto-fill pass over a catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FillReport {
    pub fields_total: usize,
    pub fields_filled: usize,
    pub fields_skipped: usize,
    /// Fields filled from profile mappings.
    pub fields_auto: usize,
    /// Fields filled from manually supplied answers.
    pub fields_manual: usize,
}

// =============================================================================
// FILING TYPES
// =============================================================================

/// GTD workflow statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GtdStatus {
    Inbox,
    Action,
    WaitingFor,
    Reference,
    Archive,
}

impl GtdStatus {
    /// Canonical lowercase name, as stored in sidecar metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            GtdStatus::Inbox => "inbox",
            GtdStatus::Action => "action",
            GtdStatus::WaitingFor => "waiting-for",
            GtdStatus::Reference => "reference",
            GtdStatus::Archive => "archive",
        }
    }
}

/// Document filing categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Medical,
    Housing,
    Financial,
    Legal,
    Vehicle,
    Government,
    Personal,
    Uncategorized,
}

impl Category {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Medical => "medical",
            Category::Housing => "housing",
            Category::Financial => "financial",
            Category::Legal => "legal",
            Category::Vehicle => "vehicle",
            Category::Government => "government",
            Category::Personal => "personal",
            Category::Uncategorized => "uncategorized",
        }
    }

    /// Title-case folder name, e.g. `Medical`.
    pub fn folder_name(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }
}

/// Metadata sidecar for a filed PDF.
///
/// Written as YAML alongside the filed document for searchability and
/// audit trails. Written exactly once at filing time; re-filing produces a
/// new sidecar rather than updating this one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidecarMetadata {
    pub original_filename: String,
    pub filed_date: DateTime<Utc>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// Document source/issuer, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_date: Option<DateTime<Utc>>,
    pub fields_filled: usize,
    pub fields_auto: usize,
    pub fields_manual: usize,
    /// Profile paths and field labels disclosed this session. Audit only.
    pub sensitive_fields: Vec<String>,
    pub filed_by: String,
    pub filed_to: Vec<String>,
    pub tags: Vec<String>,
}

/// Result of filing a PDF to storage. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingResult {
    /// Final destination path of the filed document.
    pub path: String,
    pub category: Category,
    pub gtd_status: GtdStatus,
    /// Path to the YAML metadata sidecar.
    pub metadata_path: String,
    pub filed_at: DateTime<Utc>,
    /// Backend URIs written to, as `backend:dest` pairs.
    pub destinations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_document_stem() {
        let doc = SourceDocument::new("intake_form.pdf", vec![1, 2, 3]);
        assert_eq!(doc.stem(), "intake_form");

        let no_ext = SourceDocument::new("intake", vec![]);
        assert_eq!(no_ext.stem(), "intake");
    }

    #[test]
    fn test_source_document_ids_unique() {
        let a = SourceDocument::new("a.pdf", vec![]);
        let b = SourceDocument::new("a.pdf", vec![]);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_field_type_serde_lowercase() {
        let json = serde_json::to_string(&FieldType::Checkbox).unwrap();
        assert_eq!(json, "\"checkbox\"");
        let back: FieldType = serde_json::from_str("\"signature\"").unwrap();
        assert_eq!(back, FieldType::Signature);
    }

    #[test]
    fn test_form_field_builder() {
        let field = FormField::new("f1", "Patient Name", FieldType::Text)
            .required()
            .on_page(2);
        assert_eq!(field.id, "f1");
        assert!(field.required);
        assert_eq!(field.page, 2);
        assert!(!field.filled);
        assert!(field.value.is_none());
        assert!(field.source.is_none());
    }

    #[test]
    fn test_profile_path_segments() {
        let path = ProfilePath::new("contact.address.city");
        let segments: Vec<&str> = path.segments().collect();
        assert_eq!(segments, vec!["contact", "address", "city"]);
    }

    #[test]
    fn test_profile_path_display() {
        let path = ProfilePath::from("identity.ssn");
        assert_eq!(path.to_string(), "identity.ssn");
    }

    #[test]
    fn test_gtd_status_serde_kebab() {
        let json = serde_json::to_string(&GtdStatus::WaitingFor).unwrap();
        assert_eq!(json, "\"waiting-for\"");
        assert_eq!(GtdStatus::WaitingFor.as_str(), "waiting-for");
    }

    #[test]
    fn test_category_folder_name() {
        assert_eq!(Category::Medical.folder_name(), "Medical");
        assert_eq!(Category::Uncategorized.folder_name(), "Uncategorized");
    }

    #[test]
    fn test_missing_reason_serde() {
        let json = serde_json::to_string(&MissingReason::DisclosureDenied).unwrap();
        assert_eq!(json, "\"disclosure_denied\"");
    }

    #[test]
    fn test_sidecar_metadata_yaml_round_trip() {
        let meta = SidecarMetadata {
            original_filename: "form.pdf".to_string(),
            filed_date: Utc::now(),
            category: "medical".to_string(),
            subcategory: None,
            source: Some("clinic".to_string()),
            status: "reference".to_string(),
            follow_up_date: None,
            fields_filled: 4,
            fields_auto: 3,
            fields_manual: 1,
            sensitive_fields: vec!["identity.ssn".to_string()],
            filed_by: "fillkit".to_string(),
            filed_to: vec!["local:@Reference/Medical/2026/form.pdf".to_string()],
            tags: vec!["medical".to_string(), "2026".to_string()],
        };
        let yaml = serde_yaml::to_string(&meta).unwrap();
        assert!(yaml.contains("original_filename: form.pdf"));
        let back: SidecarMetadata = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.fields_auto, 3);
        assert_eq!(back.sensitive_fields, vec!["identity.ssn".to_string()]);
    }
}
