//! Structured logging field name constants for fillkit.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Backend/collaborator failure requiring attention |
//! | WARN  | Recoverable issue, fallback applied (OCR fallback, denied disclosure) |
//! | INFO  | Session lifecycle transitions, filing completions |
//! | DEBUG | Mapping decisions, categorization scores |
//! | TRACE | Per-field iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Session UUID the event belongs to.
pub const SESSION_ID: &str = "session_id";

/// Source document filename.
pub const DOCUMENT: &str = "document";

/// Form field id being operated on.
pub const FIELD_ID: &str = "field_id";

/// Profile path involved in a mapping or disclosure decision.
pub const PROFILE_PATH: &str = "profile_path";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Number of fields discovered, filled, or missing.
pub const FIELD_COUNT: &str = "field_count";

/// Confidence score of a mapping decision.
pub const CONFIDENCE: &str = "confidence";

/// Keyword score of a categorization decision.
pub const SCORE: &str = "score";

// ─── Decision fields ───────────────────────────────────────────────────────

/// Mapping strategy that produced a result ("exact", "fuzzy", "assisted").
pub const STRATEGY: &str = "strategy";

/// Resolved filing category.
pub const CATEGORY: &str = "category";

/// GTD status applied at filing time.
pub const GTD_STATUS: &str = "gtd_status";

/// Storage backend name.
pub const BACKEND: &str = "backend";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
