//! Mock collaborators for deterministic testing.
//!
//! Provides in-memory implementations of every external collaborator the
//! engine calls, with call logging and configurable failure so lifecycle
//! and error paths can be exercised without real PDF, OCR, policy, or
//! storage machinery.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use fillkit_core::{
    AnswerSource, DisclosureAdvocate, DocumentWriter, Error, FieldCatalog, FieldExtractor,
    FieldMapping, FormField, MappingAssistant, MissingField, OcrFieldDetector, ProfilePath,
    Result, SourceDocument, StorageBackend, ValueDecryptor,
};

// =============================================================================
// FIELD DISCOVERY
// =============================================================================

/// Extractor returning a fixed field list.
#[derive(Clone, Default)]
pub struct MockExtractor {
    fields: Vec<FormField>,
    fail: bool,
}

impl MockExtractor {
    /// Extractor that discovers the given fields.
    pub fn with_fields(fields: Vec<FormField>) -> Self {
        Self {
            fields,
            fail: false,
        }
    }

    /// Extractor that discovers nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Make every call fail.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl FieldExtractor for MockExtractor {
    async fn extract(&self, _document: &SourceDocument) -> Result<Vec<FormField>> {
        if self.fail {
            return Err(Error::Internal("simulated extractor failure".into()));
        }
        Ok(self.fields.clone())
    }
}

/// OCR detector returning a fixed field list, with a call counter.
#[derive(Clone, Default)]
pub struct MockOcrDetector {
    fields: Vec<FormField>,
    calls: Arc<Mutex<usize>>,
}

impl MockOcrDetector {
    pub fn with_fields(fields: Vec<FormField>) -> Self {
        Self {
            fields,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of detect calls made.
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl OcrFieldDetector for MockOcrDetector {
    async fn detect_fields(&self, _document: &SourceDocument) -> Result<Vec<FormField>> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.fields.clone())
    }
}

// =============================================================================
// MAPPING & DISCLOSURE
// =============================================================================

/// Assistant answering from a fixed label→(path, confidence) table.
#[derive(Clone, Default)]
pub struct MockAssistant {
    suggestions: HashMap<String, (String, f32)>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockAssistant {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a suggestion for a raw label.
    pub fn with_suggestion(
        mut self,
        label: impl Into<String>,
        path: impl Into<String>,
        confidence: f32,
    ) -> Self {
        self.suggestions
            .insert(label.into(), (path.into(), confidence));
        self
    }

    /// Labels escalated to this assistant, in order.
    pub fn escalated(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MappingAssistant for MockAssistant {
    async fn suggest(&self, label: &str) -> Result<Option<FieldMapping>> {
        self.calls.lock().unwrap().push(label.to_string());
        Ok(self.suggestions.get(label).map(|(path, confidence)| {
            FieldMapping {
                field_id: String::new(),
                path: ProfilePath::new(path.clone()),
                confidence: *confidence,
            }
        }))
    }
}

/// How a [`MockAdvocate`] answers approval requests.
#[derive(Clone)]
pub enum ApprovalPolicy {
    ApproveAll,
    DenyAll,
    /// Approve only the listed profile paths.
    ApproveOnly(Vec<String>),
    /// Fail every call, for fail-closed testing.
    Unreachable,
}

/// Disclosure advocate with a fixed policy and a consultation log.
#[derive(Clone)]
pub struct MockAdvocate {
    policy: ApprovalPolicy,
    consulted: Arc<Mutex<Vec<String>>>,
}

impl MockAdvocate {
    pub fn new(policy: ApprovalPolicy) -> Self {
        Self {
            policy,
            consulted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Paths this advocate was consulted about, in order.
    pub fn consulted(&self) -> Vec<String> {
        self.consulted.lock().unwrap().clone()
    }
}

#[async_trait]
impl DisclosureAdvocate for MockAdvocate {
    async fn approve(&self, path: &ProfilePath) -> Result<bool> {
        self.consulted.lock().unwrap().push(path.to_string());
        match &self.policy {
            ApprovalPolicy::ApproveAll => Ok(true),
            ApprovalPolicy::DenyAll => Ok(false),
            ApprovalPolicy::ApproveOnly(paths) => Ok(paths.iter().any(|p| p == path.as_str())),
            ApprovalPolicy::Unreachable => {
                Err(Error::Internal("simulated advocate outage".into()))
            }
        }
    }
}

/// Decryptor answering from a fixed path→value table.
#[derive(Clone, Default)]
pub struct MockDecryptor {
    values: HashMap<String, String>,
}

impl MockDecryptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new().and_value(path, value)
    }

    pub fn and_value(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(path.into(), value.into());
        self
    }
}

#[async_trait]
impl ValueDecryptor for MockDecryptor {
    async fn decrypt(&self, path: &ProfilePath) -> Result<Option<String>> {
        Ok(self.values.get(path.as_str()).cloned())
    }
}

// =============================================================================
// OUTPUT & STORAGE
// =============================================================================

/// Writer producing deterministic pseudo-PDF bytes from the catalog.
#[derive(Clone, Default)]
pub struct MockWriter {
    fail: bool,
}

impl MockWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl DocumentWriter for MockWriter {
    async fn write(&self, document: &SourceDocument, catalog: &FieldCatalog) -> Result<Vec<u8>> {
        if self.fail {
            return Err(Error::Write("simulated writer failure".into()));
        }
        let mut bytes = b"%PDF-mock ".to_vec();
        bytes.extend_from_slice(document.filename.as_bytes());
        for field in catalog.filled() {
            bytes.push(b'\n');
            bytes.extend_from_slice(field.id.as_bytes());
            bytes.push(b'=');
            bytes.extend_from_slice(field.value.as_deref().unwrap_or("").as_bytes());
        }
        Ok(bytes)
    }
}

/// In-memory storage backend with duplicate rejection.
pub struct MemoryBackend {
    name: String,
    files: Mutex<HashMap<String, Vec<u8>>>,
    fail: bool,
}

impl MemoryBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Mutex::new(HashMap::new()),
            fail: false,
        }
    }

    /// Make every transfer fail.
    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Whether a path was stored.
    pub fn contains(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    /// Stored bytes for a path.
    pub fn stored(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn transfer(&self, bytes: &[u8], dest_path: &str) -> Result<String> {
        if self.fail {
            return Err(Error::Storage(format!(
                "simulated failure on backend '{}'",
                self.name
            )));
        }
        let mut files = self.files.lock().unwrap();
        if files.contains_key(dest_path) {
            return Err(Error::Storage(format!("duplicate destination: {dest_path}")));
        }
        files.insert(dest_path.to_string(), bytes.to_vec());
        Ok(format!("{}:{}", self.name, dest_path))
    }

    async fn store_metadata(&self, metadata_yaml: &str, pdf_dest_path: &str) -> Result<String> {
        if self.fail {
            return Err(Error::Storage(format!(
                "simulated failure on backend '{}'",
                self.name
            )));
        }
        let meta_path = match pdf_dest_path.rsplit_once('.') {
            Some((base, _)) => format!("{base}.meta.yml"),
            None => format!("{pdf_dest_path}.meta.yml"),
        };
        self.files
            .lock()
            .unwrap()
            .insert(meta_path.clone(), metadata_yaml.as_bytes().to_vec());
        Ok(format!("{}:{}", self.name, meta_path))
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.files.lock().unwrap().contains_key(path))
    }
}

// =============================================================================
// ANSWER COLLECTION
// =============================================================================

/// Answer source replying from a fixed field-id→answer table.
///
/// Answers are handed out once; a second collect round for the same field
/// returns nothing, so drive loops terminate.
#[derive(Clone, Default)]
pub struct MockAnswerSource {
    answers: Arc<Mutex<HashMap<String, String>>>,
}

impl MockAnswerSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(self, field_id: impl Into<String>, answer: impl Into<String>) -> Self {
        self.answers
            .lock()
            .unwrap()
            .insert(field_id.into(), answer.into());
        self
    }
}

#[async_trait]
impl AnswerSource for MockAnswerSource {
    async fn collect(&self, missing: &[MissingField]) -> Result<HashMap<String, String>> {
        let mut answers = self.answers.lock().unwrap();
        let mut collected = HashMap::new();
        for m in missing {
            if let Some(answer) = answers.remove(&m.field_id) {
                collected.insert(m.field_id.clone(), answer);
            }
        }
        Ok(collected)
    }
}
