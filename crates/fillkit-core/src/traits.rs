//! Collaborator contracts the core calls out to.
//!
//! These traits define the seams between the decision engine and its
//! external collaborators (PDF parsing, OCR, semantic mapping, disclosure
//! policy, decryption, document writing, storage, answer collection),
//! enabling pluggable implementations and testability.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::catalog::FieldCatalog;
use crate::error::Result;
use crate::models::{FieldMapping, FormField, MissingField, ProfilePath, SourceDocument};

// =============================================================================
// FIELD DISCOVERY
// =============================================================================

/// Primary form-field discovery over the document's AcroForm structure.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    /// Extract form fields from the document. May return empty.
    async fn extract(&self, document: &SourceDocument) -> Result<Vec<FormField>>;
}

/// OCR-based fallback discovery, invoked only when extraction yields empty.
#[async_trait]
pub trait OcrFieldDetector: Send + Sync {
    /// Detect likely form fields from rendered page text.
    async fn detect_fields(&self, document: &SourceDocument) -> Result<Vec<FormField>>;
}

// =============================================================================
// MAPPING & DISCLOSURE
// =============================================================================

/// Semantic-mapping assistant consulted when static strategies fail.
#[async_trait]
pub trait MappingAssistant: Send + Sync {
    /// Suggest a profile path for a raw field label.
    ///
    /// The returned mapping's `field_id` is ignored; the caller rebinds it
    /// to the field under consideration. A low-confidence or absent
    /// suggestion is a normal outcome, not an error.
    async fn suggest(&self, label: &str) -> Result<Option<FieldMapping>>;
}

/// Disclosure-policy collaborator deciding whether a sensitive profile
/// path may be read. May be interactive and slow.
#[async_trait]
pub trait DisclosureAdvocate: Send + Sync {
    /// Approve or deny release of the value at `path`.
    async fn approve(&self, path: &ProfilePath) -> Result<bool>;
}

/// Decrypting accessor capability for sensitive profile values.
#[async_trait]
pub trait ValueDecryptor: Send + Sync {
    /// Decrypt the value at `path`, or `None` if the path holds nothing.
    async fn decrypt(&self, path: &ProfilePath) -> Result<Option<String>>;
}

// =============================================================================
// OUTPUT & STORAGE
// =============================================================================

/// External PDF writer producing the filled document bytes.
#[async_trait]
pub trait DocumentWriter: Send + Sync {
    /// Render the catalog's values into the document, returning output bytes.
    async fn write(&self, document: &SourceDocument, catalog: &FieldCatalog) -> Result<Vec<u8>>;
}

/// A storage destination for filed documents, selectable by name.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Backend identifier (e.g. "local", "nextcloud").
    fn name(&self) -> &str;

    /// Store bytes at a destination path relative to the backend root.
    ///
    /// Returns the full destination path/URI. Re-transferring to an
    /// already-occupied destination must be rejected as a duplicate rather
    /// than silently overwriting.
    async fn transfer(&self, bytes: &[u8], dest_path: &str) -> Result<String>;

    /// Store a metadata sidecar next to an already-stored document.
    ///
    /// `pdf_dest_path` is the document's destination; the sidecar path is
    /// derived from it.
    async fn store_metadata(&self, metadata_yaml: &str, pdf_dest_path: &str) -> Result<String>;

    /// Check whether a path exists on this backend.
    async fn exists(&self, path: &str) -> Result<bool>;
}

// =============================================================================
// ANSWER COLLECTION
// =============================================================================

/// Supplies values for missing required fields.
///
/// How answers are gathered (interactive prompt, batched exchange, API
/// response) is entirely the implementation's concern; the core only
/// reports which fields need answers and applies what comes back.
#[async_trait]
pub trait AnswerSource: Send + Sync {
    /// Collect answers for the given missing fields, keyed by field id.
    ///
    /// Fields absent from the returned map remain unanswered.
    async fn collect(&self, missing: &[MissingField]) -> Result<HashMap<String, String>>;
}
