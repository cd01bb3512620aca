//! Sensitivity gating for profile reads, plus sensitive-label flagging
//! for the filing audit trail.

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use fillkit_core::{DisclosureAdvocate, FormField, ProfilePath};

/// Profile paths whose disclosure requires explicit policy approval.
///
/// Static configuration, loaded once. Paths outside this set are always
/// approved implicitly.
pub static SENSITIVE_PATHS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "identity.ssn",
        "identity.tax_id",
        "identity.passport_number",
        "identity.drivers_license",
        "finance.account_number",
        "finance.routing_number",
        "finance.credit_card",
    ]
    .into_iter()
    .collect()
});

/// Label patterns that flag a field as sensitive in sidecar metadata.
///
/// Audit-only: these drive what gets recorded at filing time, not whether
/// a value may be read. Gating is decided by [`SENSITIVE_PATHS`].
static SENSITIVE_LABEL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\bssn\b",
        r"social.?security",
        r"tax.?id",
        r"\bein\b",
        r"policy.?number",
        r"account.?(?:number|num|no)",
        r"routing.?(?:number|num|no)",
        r"credit.?card",
        r"passport.?(?:number|num|no)",
        r"driver.?license",
        r"\bdob\b|date.?of.?birth",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).expect("static pattern"))
    .collect()
});

/// Policy checkpoint consulted before any sensitive profile read.
///
/// Denials and advocate failures both resolve to "not approved" — the gate
/// fails closed, and a denied field simply stays unfilled.
#[derive(Clone)]
pub struct DisclosureGate {
    advocate: Arc<dyn DisclosureAdvocate>,
}

impl DisclosureGate {
    pub fn new(advocate: Arc<dyn DisclosureAdvocate>) -> Self {
        Self { advocate }
    }

    /// Whether the path belongs to the configured sensitive set.
    pub fn is_sensitive(&self, path: &ProfilePath) -> bool {
        SENSITIVE_PATHS.contains(path.as_str())
    }

    /// Approve release of the value at `path`.
    ///
    /// Non-sensitive paths approve without consulting the advocate. Must be
    /// called before the accessor read, never after.
    pub async fn approve(&self, path: &ProfilePath) -> bool {
        if !self.is_sensitive(path) {
            return true;
        }
        match self.advocate.approve(path).await {
            Ok(approved) => {
                debug!(profile_path = %path, approved, "Disclosure decision");
                approved
            }
            Err(err) => {
                warn!(profile_path = %path, error = %err, "Disclosure advocate failed, denying");
                false
            }
        }
    }
}

/// Flag field labels that look sensitive, for the metadata audit list.
pub fn detect_sensitive_labels(fields: &[FormField]) -> Vec<String> {
    let mut flagged = Vec::new();
    for field in fields {
        let label = field.label.to_lowercase().replace(['_', '-'], " ");
        if SENSITIVE_LABEL_PATTERNS.iter().any(|p| p.is_match(&label)) {
            flagged.push(field.label.clone());
        }
    }
    flagged
}
