//! Ordered collection of form fields discovered in one document.

use serde::{Deserialize, Serialize};

use crate::defaults::MANUAL_FILL_CONFIDENCE;
use crate::models::{FormField, MissingField, MissingReason, ProfilePath};

/// The discovered form fields of one document, in extraction order.
///
/// Owned exclusively by one session for its lifetime; no field is ever
/// mutated by two call paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldCatalog {
    fields: Vec<FormField>,
}

impl FieldCatalog {
    /// Build a catalog from extracted fields, preserving order.
    pub fn new(fields: Vec<FormField>) -> Self {
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [FormField] {
        &mut self.fields
    }

    /// Look up a field by its session-unique id.
    pub fn get(&self, field_id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == field_id)
    }

    /// Mutable lookup by field id.
    pub fn get_mut(&mut self, field_id: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.id == field_id)
    }

    /// Apply a mapped profile value to a field in one step.
    ///
    /// Sets value, filled, source, and confidence together so no partially
    /// updated field state is observable.
    pub fn fill_from_profile(
        &mut self,
        field_id: &str,
        value: String,
        source: ProfilePath,
        confidence: f32,
    ) -> bool {
        match self.get_mut(field_id) {
            Some(field) => {
                field.value = Some(value);
                field.filled = true;
                field.source = Some(source);
                field.confidence = confidence;
                true
            }
            None => false,
        }
    }

    /// Apply a manually collected answer to a field.
    ///
    /// Manual fills carry no source path and full confidence.
    pub fn fill_manual(&mut self, field_id: &str, value: String) -> bool {
        match self.get_mut(field_id) {
            Some(field) => {
                field.value = Some(value);
                field.filled = true;
                field.source = None;
                field.confidence = MANUAL_FILL_CONFIDENCE;
                true
            }
            None => false,
        }
    }

    /// Fields that are filled.
    pub fn filled(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(|f| f.filled)
    }

    /// Fields that are not yet filled.
    pub fn unfilled(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(|f| !f.filled)
    }

    /// Required fields that are not yet filled.
    pub fn missing_required(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(|f| f.required && !f.filled)
    }

    /// Build the missing-field report for the unfilled subset.
    ///
    /// `reason_for` supplies the cause per field id; fields without a
    /// recorded cause default to [`MissingReason::AnswerPending`].
    pub fn missing_report<F>(&self, reason_for: F) -> Vec<MissingField>
    where
        F: Fn(&str) -> Option<MissingReason>,
    {
        self.unfilled()
            .map(|f| MissingField {
                field_id: f.id.clone(),
                label: f.label.clone(),
                required: f.required,
                reason: reason_for(&f.id).unwrap_or(MissingReason::AnswerPending),
            })
            .collect()
    }

    /// Count of fields filled from profile mappings vs manual answers.
    pub fn fill_counts(&self) -> (usize, usize) {
        let auto = self.filled().filter(|f| f.source.is_some()).count();
        let manual = self.filled().filter(|f| f.source.is_none()).count();
        (auto, manual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldType;

    fn sample_catalog() -> FieldCatalog {
        FieldCatalog::new(vec![
            FormField::new("f1", "Name", FieldType::Text).required(),
            FormField::new("f2", "Email", FieldType::Text),
            FormField::new("f3", "Signature", FieldType::Signature).required(),
        ])
    }

    #[test]
    fn test_catalog_preserves_order() {
        let catalog = sample_catalog();
        let ids: Vec<&str> = catalog.fields().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["f1", "f2", "f3"]);
    }

    #[test]
    fn test_fill_from_profile_sets_all_fields() {
        let mut catalog = sample_catalog();
        assert!(catalog.fill_from_profile(
            "f1",
            "Jane Doe".to_string(),
            ProfilePath::new("identity.full_name"),
            1.0,
        ));

        let field = catalog.get("f1").unwrap();
        assert!(field.filled);
        assert_eq!(field.value.as_deref(), Some("Jane Doe"));
        assert_eq!(field.source.as_ref().unwrap().as_str(), "identity.full_name");
        assert_eq!(field.confidence, 1.0);
    }

    #[test]
    fn test_fill_manual_clears_source() {
        let mut catalog = sample_catalog();
        assert!(catalog.fill_manual("f3", "signed".to_string()));

        let field = catalog.get("f3").unwrap();
        assert!(field.filled);
        assert!(field.source.is_none());
        assert_eq!(field.confidence, 1.0);
    }

    #[test]
    fn test_fill_unknown_field_returns_false() {
        let mut catalog = sample_catalog();
        assert!(!catalog.fill_manual("missing", "x".to_string()));
    }

    #[test]
    fn test_missing_required() {
        let mut catalog = sample_catalog();
        catalog.fill_manual("f1", "Jane".to_string());

        let missing: Vec<&str> = catalog.missing_required().map(|f| f.id.as_str()).collect();
        assert_eq!(missing, vec!["f3"]);
    }

    #[test]
    fn test_fill_counts() {
        let mut catalog = sample_catalog();
        catalog.fill_from_profile("f1", "Jane".into(), ProfilePath::new("identity.full_name"), 1.0);
        catalog.fill_manual("f3", "signed".into());

        assert_eq!(catalog.fill_counts(), (1, 1));
    }

    #[test]
    fn test_missing_report_reasons() {
        let catalog = sample_catalog();
        let report = catalog.missing_report(|id| {
            if id == "f1" {
                Some(MissingReason::DisclosureDenied)
            } else {
                None
            }
        });

        assert_eq!(report.len(), 3);
        let f1 = report.iter().find(|m| m.field_id == "f1").unwrap();
        assert_eq!(f1.reason, MissingReason::DisclosureDenied);
        let f2 = report.iter().find(|m| m.field_id == "f2").unwrap();
        assert_eq!(f2.reason, MissingReason::AnswerPending);
    }
}
