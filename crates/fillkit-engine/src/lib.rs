//! # fillkit-engine
//!
//! The fillkit decision engine: field-to-profile mapping, disclosure
//! gating, auto-filling, document categorization, filing-location
//! planning, and the session lifecycle that drives them.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use fillkit_core::{GtdStatus, Profile, ProfileAccessor, SourceDocument};
//! use fillkit_engine::{
//!     AutoFiller, CompletionMode, DisclosureGate, FieldMapper, FilingConfig,
//!     FilingOptions, FilingPlanner, FillSession, SessionHooks,
//! };
//!
//! let accessor = ProfileAccessor::new(profile, decryptor);
//! let filler = AutoFiller::new(
//!     FieldMapper::new().with_assistant(assistant),
//!     DisclosureGate::new(advocate),
//!     accessor,
//! );
//!
//! let mut session = FillSession::new(
//!     SourceDocument::new("intake.pdf", bytes),
//!     filler,
//!     FilingPlanner::new(FilingConfig::from_env()),
//!     SessionHooks { extractor, ocr: Some(ocr), writer, backends },
//! );
//!
//! session.extract().await?;
//! session.fill().await?;
//! session.collect_answers(&prompt).await?;
//! session.write(CompletionMode::Strict).await?;
//! let filed = session.file(GtdStatus::Reference, FilingOptions::default()).await?;
//! ```

pub mod categorize;
pub mod disclosure;
pub mod filing;
pub mod filler;
pub mod mapping;
pub mod mock;
pub mod session;

// Re-export the engine surface
pub use categorize::{Categorizer, CATEGORY_KEYWORDS};
pub use disclosure::{detect_sensitive_labels, DisclosureGate, SENSITIVE_PATHS};
pub use filing::{FilingConfig, FilingOptions, FilingPlan, FilingPlanner};
pub use filler::{AutoFiller, FillOutcome};
pub use mapping::{normalize_label, FieldMapper, LABEL_TABLE};
pub use session::{AnswerOutcome, CompletionMode, FillSession, SessionHooks, SessionState};
