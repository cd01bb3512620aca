//! Auto-fill pass combining mapper, disclosure gate, and profile accessor.

use std::collections::HashMap;

use tracing::{debug, trace};

use fillkit_core::{
    FieldCatalog, FillReport, MissingField, MissingReason, ProfileAccessor, ProfilePath, Result,
};

use crate::disclosure::DisclosureGate;
use crate::mapping::FieldMapper;

/// Outcome of one auto-fill pass.
#[derive(Debug, Clone, Default)]
pub struct FillOutcome {
    pub report: FillReport,
    /// Fields still unfilled after the pass, with the cause.
    pub missing: Vec<MissingField>,
    /// Sensitive profile paths the gate approved for release in this pass.
    pub disclosed: Vec<ProfilePath>,
}

/// Populates a [`FieldCatalog`] from the profile, gating sensitive reads.
///
/// Idempotent: fields already filled are never touched, so re-running on a
/// filled catalog changes nothing.
#[derive(Clone)]
pub struct AutoFiller {
    mapper: FieldMapper,
    gate: DisclosureGate,
    accessor: ProfileAccessor,
}

impl AutoFiller {
    pub fn new(mapper: FieldMapper, gate: DisclosureGate, accessor: ProfileAccessor) -> Self {
        Self {
            mapper,
            gate,
            accessor,
        }
    }

    /// Fill every mappable, approvable field in the catalog.
    ///
    /// Each field is resolved fully (mapping, gate, value) before its state
    /// is mutated in a single step, so cancellation at any await point
    /// leaves no partially updated field behind.
    pub async fn fill(&self, catalog: &mut FieldCatalog) -> Result<FillOutcome> {
        let total = catalog.len();
        let mut reasons: HashMap<String, MissingReason> = HashMap::new();
        let mut disclosed: Vec<ProfilePath> = Vec::new();
        let mut auto_filled = 0usize;

        let ids: Vec<String> = catalog.fields().iter().map(|f| f.id.clone()).collect();
        for id in ids {
            let field = match catalog.get(&id) {
                Some(f) => f.clone(),
                None => continue,
            };
            if field.filled {
                trace!(field_id = %id, "Field already filled, skipping");
                continue;
            }

            let mapping = match self.mapper.map(&field).await? {
                Some(m) => m,
                None => {
                    reasons.insert(id, MissingReason::NoMapping);
                    continue;
                }
            };

            // Gate before any read of a sensitive value, never after.
            let sensitive = self.gate.is_sensitive(&mapping.path);
            if sensitive {
                if !self.gate.approve(&mapping.path).await {
                    reasons.insert(id, MissingReason::DisclosureDenied);
                    continue;
                }
                disclosed.push(mapping.path.clone());
            }

            let value = if sensitive {
                self.accessor.get_decrypted(&mapping.path).await?
            } else {
                self.accessor.get(&mapping.path)
            };

            match value {
                Some(value) => {
                    catalog.fill_from_profile(&id, value, mapping.path, mapping.confidence);
                    auto_filled += 1;
                }
                None => {
                    // Mapped and approved, but the profile holds nothing usable.
                    reasons.insert(id, MissingReason::AnswerPending);
                }
            }
        }

        let (fields_auto, fields_manual) = catalog.fill_counts();
        let missing = catalog.missing_report(|id| reasons.get(id).copied());
        debug!(
            field_count = total,
            filled = auto_filled,
            missing = missing.len(),
            "Auto-fill pass complete"
        );

        Ok(FillOutcome {
            report: FillReport {
                fields_total: total,
                fields_filled: catalog.filled().count(),
                fields_skipped: missing.len(),
                fields_auto,
                fields_manual,
            },
            missing,
            disclosed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{ApprovalPolicy, MockAdvocate, MockDecryptor};
    use fillkit_core::{FieldType, FormField, Profile, ProfileAccessor};
    use serde_json::json;
    use std::sync::Arc;

    fn accessor(decryptor: MockDecryptor) -> ProfileAccessor {
        let profile = Profile::new(json!({
            "identity": {
                "full_name": "Jane Doe",
                "date_of_birth": "1990-01-01"
            },
            "contact": {
                "email": "jane@example.com",
                "phone": ""
            }
        }))
        .unwrap();
        ProfileAccessor::new(Arc::new(profile), Arc::new(decryptor))
    }

    fn filler(policy: ApprovalPolicy) -> AutoFiller {
        AutoFiller::new(
            FieldMapper::new(),
            DisclosureGate::new(Arc::new(MockAdvocate::new(policy))),
            accessor(MockDecryptor::with_value("identity.ssn", "123-45-6789")),
        )
    }

    fn catalog() -> FieldCatalog {
        FieldCatalog::new(vec![
            FormField::new("f1", "Patient Name", FieldType::Text).required(),
            FormField::new("f2", "Email", FieldType::Text),
            FormField::new("f3", "Social Security", FieldType::Text).required(),
            FormField::new("f4", "Favorite Color", FieldType::Text),
            FormField::new("f5", "Phone", FieldType::Text),
        ])
    }

    #[tokio::test]
    async fn test_fill_populates_mapped_fields() {
        let filler = filler(ApprovalPolicy::ApproveAll);
        let mut catalog = catalog();

        let outcome = filler.fill(&mut catalog).await.unwrap();

        assert_eq!(catalog.get("f1").unwrap().value.as_deref(), Some("Jane Doe"));
        assert_eq!(
            catalog.get("f2").unwrap().value.as_deref(),
            Some("jane@example.com")
        );
        assert_eq!(
            catalog.get("f3").unwrap().value.as_deref(),
            Some("123-45-6789")
        );
        assert_eq!(outcome.report.fields_auto, 3);
        assert_eq!(outcome.disclosed, vec![ProfilePath::new("identity.ssn")]);
    }

    #[tokio::test]
    async fn test_fill_distinguishes_missing_reasons() {
        let filler = filler(ApprovalPolicy::DenyAll);
        let mut catalog = catalog();

        let outcome = filler.fill(&mut catalog).await.unwrap();

        let reason = |id: &str| {
            outcome
                .missing
                .iter()
                .find(|m| m.field_id == id)
                .unwrap()
                .reason
        };
        // Sensitive path denied by the gate.
        assert_eq!(reason("f3"), MissingReason::DisclosureDenied);
        // No strategy maps this label.
        assert_eq!(reason("f4"), MissingReason::NoMapping);
        // Mapped, approved implicitly, but profile value is empty.
        assert_eq!(reason("f5"), MissingReason::AnswerPending);
        assert!(outcome.disclosed.is_empty());
    }

    #[tokio::test]
    async fn test_no_value_reaches_field_without_approval() {
        let filler = filler(ApprovalPolicy::DenyAll);
        let mut catalog = catalog();

        filler.fill(&mut catalog).await.unwrap();

        let field = catalog.get("f3").unwrap();
        assert!(!field.filled);
        assert!(field.value.is_none());
        assert!(field.source.is_none());
    }

    #[tokio::test]
    async fn test_fill_is_idempotent() {
        let filler = filler(ApprovalPolicy::ApproveAll);
        let mut once = catalog();
        filler.fill(&mut once).await.unwrap();
        let snapshot: Vec<_> = once
            .fields()
            .iter()
            .map(|f| (f.id.clone(), f.value.clone(), f.confidence))
            .collect();

        filler.fill(&mut once).await.unwrap();
        let again: Vec<_> = once
            .fields()
            .iter()
            .map(|f| (f.id.clone(), f.value.clone(), f.confidence))
            .collect();

        assert_eq!(snapshot, again);
    }

    #[tokio::test]
    async fn test_fill_does_not_overwrite_manual_answers() {
        let filler = filler(ApprovalPolicy::ApproveAll);
        let mut catalog = catalog();
        catalog.fill_manual("f1", "Custom Name".to_string());

        filler.fill(&mut catalog).await.unwrap();

        assert_eq!(
            catalog.get("f1").unwrap().value.as_deref(),
            Some("Custom Name")
        );
        assert!(catalog.get("f1").unwrap().source.is_none());
    }

    #[tokio::test]
    async fn test_empty_profile_value_is_not_a_fill() {
        let filler = filler(ApprovalPolicy::ApproveAll);
        let mut catalog = FieldCatalog::new(vec![FormField::new("p", "Phone", FieldType::Text)]);

        let outcome = filler.fill(&mut catalog).await.unwrap();

        assert!(!catalog.get("p").unwrap().filled);
        assert_eq!(outcome.report.fields_filled, 0);
    }
}
