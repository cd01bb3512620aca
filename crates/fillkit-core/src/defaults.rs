//! Centralized default constants for fillkit.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// MAPPING
// =============================================================================

/// Minimum similarity a fuzzy label match must strictly exceed to be
/// accepted. Matches at or below this score fall through to assisted
/// mapping.
pub const FUZZY_MATCH_THRESHOLD: f32 = 0.8;

/// Confidence reported for exact-table label matches.
pub const EXACT_MATCH_CONFIDENCE: f32 = 1.0;

/// Confidence assigned to manually answered fields.
pub const MANUAL_FILL_CONFIDENCE: f32 = 1.0;

// =============================================================================
// FILING
// =============================================================================

/// Default identity recorded in sidecar metadata as the filer.
pub const FILED_BY: &str = "fillkit";

/// Extension of the metadata sidecar written next to filed documents.
pub const SIDECAR_EXTENSION: &str = ".meta.yml";

/// Hex characters of the content fingerprint appended to colliding
/// filenames.
pub const FINGERPRINT_LEN: usize = 8;
