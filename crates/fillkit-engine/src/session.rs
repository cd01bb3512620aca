//! Stateful driver of one document's fill-and-file pipeline.
//!
//! Lifecycle: Created → Extracted → Filled ⇄ AwaitingAnswers → Written →
//! Filed, plus terminal Failed. Each method validates the session state
//! first, so illegal transitions (writing before answers resolve, filing
//! before writing) are rejected rather than silently tolerated.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use fillkit_core::{
    AnswerSource, DocumentWriter, Error, FieldCatalog, FieldExtractor, FieldType, FillReport,
    FilingResult, FormField, GtdStatus, MissingField, MissingReason, OcrFieldDetector,
    ProfilePath, Result, SourceDocument, StorageBackend,
};

use crate::categorize::Categorizer;
use crate::disclosure::detect_sensitive_labels;
use crate::filler::AutoFiller;
use crate::filing::{FilingOptions, FilingPlanner};

/// Where a session stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Extracted,
    Filled,
    AwaitingAnswers,
    Written,
    Filed,
    Failed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Created => "Created",
            SessionState::Extracted => "Extracted",
            SessionState::Filled => "Filled",
            SessionState::AwaitingAnswers => "AwaitingAnswers",
            SessionState::Written => "Written",
            SessionState::Filed => "Filed",
            SessionState::Failed => "Failed",
        }
    }
}

/// Whether a write may proceed with required fields still missing.
///
/// Partial completion is a caller decision, never an implicit behavior:
/// `Strict` refuses to write an incomplete form, `Partial` writes with the
/// missing fields left blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionMode {
    #[default]
    Strict,
    Partial,
}

/// Result of applying a batch of collected answers.
#[derive(Debug, Clone, Default)]
pub struct AnswerOutcome {
    pub accepted: usize,
    /// Rejected answers with the validation reason, for re-prompting.
    pub rejected: Vec<(String, String)>,
}

/// External collaborators a session drives.
pub struct SessionHooks {
    pub extractor: Arc<dyn FieldExtractor>,
    /// OCR fallback, consulted only when primary extraction yields nothing.
    pub ocr: Option<Arc<dyn OcrFieldDetector>>,
    pub writer: Arc<dyn DocumentWriter>,
    pub backends: Vec<Arc<dyn StorageBackend>>,
}

/// One document's journey from blank form to filed PDF.
///
/// Single-owner and single-threaded over its own lifecycle; the catalog is
/// never mutated across an await point, so cancelling the session at any
/// suspension leaves the last fully-consistent state.
pub struct FillSession {
    id: Uuid,
    document: SourceDocument,
    state: SessionState,
    catalog: FieldCatalog,
    hooks: SessionHooks,
    filler: AutoFiller,
    categorizer: Categorizer,
    planner: FilingPlanner,
    /// Missing-cause bookkeeping from the last fill pass.
    missing: Vec<MissingField>,
    /// Sensitive profile paths disclosed during this session (audit).
    disclosed: Vec<ProfilePath>,
    report: FillReport,
    output: Option<Vec<u8>>,
    /// Plan computed on the first filing attempt, reused on retries so a
    /// retried transfer targets the same destination.
    plan: Option<crate::filing::FilingPlan>,
    filing: Option<FilingResult>,
}

impl FillSession {
    pub fn new(
        document: SourceDocument,
        filler: AutoFiller,
        planner: FilingPlanner,
        hooks: SessionHooks,
    ) -> Self {
        let id = Uuid::new_v4();
        info!(session_id = %id, document = %document.filename, "Session created");
        Self {
            id,
            document,
            state: SessionState::Created,
            catalog: FieldCatalog::default(),
            hooks,
            filler,
            categorizer: Categorizer::new(),
            planner,
            missing: Vec::new(),
            disclosed: Vec::new(),
            report: FillReport::default(),
            output: None,
            plan: None,
            filing: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    pub fn document(&self) -> &SourceDocument {
        &self.document
    }

    /// The unfilled fields with their causes, from the last fill pass.
    pub fn missing_fields(&self) -> &[MissingField] {
        &self.missing
    }

    /// The required subset of [`missing_fields`](Self::missing_fields).
    pub fn missing_required(&self) -> Vec<MissingField> {
        self.missing.iter().filter(|m| m.required).cloned().collect()
    }

    /// The filled PDF bytes, once written.
    pub fn output(&self) -> Option<&[u8]> {
        self.output.as_deref()
    }

    /// The filing result, once filed.
    pub fn filing_result(&self) -> Option<&FilingResult> {
        self.filing.as_ref()
    }

    fn guard(&self, allowed: &[SessionState], operation: &str) -> Result<()> {
        if self.state == SessionState::Failed {
            return Err(Error::invalid_transition("Failed", operation));
        }
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::invalid_transition(self.state.as_str(), operation))
        }
    }

    /// Discover the document's form fields.
    ///
    /// Falls back to the OCR detector when primary extraction yields zero
    /// fields. Both strategies empty is an unfillable document: the session
    /// fails terminally. Safe to retry from Created after a collaborator
    /// error; recomputes the same catalog from the same bytes.
    pub async fn extract(&mut self) -> Result<usize> {
        self.guard(&[SessionState::Created], "extract")?;

        let fields = match self.hooks.extractor.extract(&self.document).await {
            Ok(fields) => fields,
            Err(err) => {
                self.state = SessionState::Failed;
                return Err(Error::Extraction(format!("extractor failed: {err}")));
            }
        };

        let fields = if fields.is_empty() {
            match &self.hooks.ocr {
                Some(ocr) => {
                    warn!(
                        session_id = %self.id,
                        document = %self.document.filename,
                        "Primary extraction empty, falling back to OCR detection"
                    );
                    match ocr.detect_fields(&self.document).await {
                        Ok(fields) => fields,
                        Err(err) => {
                            self.state = SessionState::Failed;
                            return Err(Error::Extraction(format!("OCR fallback failed: {err}")));
                        }
                    }
                }
                None => fields,
            }
        } else {
            fields
        };

        if fields.is_empty() {
            self.state = SessionState::Failed;
            return Err(Error::Extraction(format!(
                "no fillable fields discovered in {}",
                self.document.filename
            )));
        }

        let count = fields.len();
        self.catalog = FieldCatalog::new(fields);
        self.state = SessionState::Extracted;
        info!(session_id = %self.id, field_count = count, "Fields extracted");
        Ok(count)
    }

    /// Run the auto-fill pass.
    ///
    /// Re-invocation is harmless: already-filled fields are never
    /// overwritten. Ends in Filled, or AwaitingAnswers when required
    /// fields remain missing.
    pub async fn fill(&mut self) -> Result<FillReport> {
        self.guard(
            &[
                SessionState::Extracted,
                SessionState::Filled,
                SessionState::AwaitingAnswers,
            ],
            "fill",
        )?;

        let outcome = self.filler.fill(&mut self.catalog).await?;
        for path in outcome.disclosed {
            if !self.disclosed.contains(&path) {
                self.disclosed.push(path);
            }
        }
        self.missing = outcome.missing;
        self.report = outcome.report.clone();

        self.state = if self.missing.iter().any(|m| m.required) {
            SessionState::AwaitingAnswers
        } else {
            SessionState::Filled
        };
        info!(
            session_id = %self.id,
            field_count = self.report.fields_filled,
            state = self.state.as_str(),
            "Auto-fill complete"
        );
        Ok(outcome.report)
    }

    /// Apply externally collected answers, keyed by field id.
    ///
    /// Each answer is validated against the field's declared type; invalid
    /// answers are rejected individually and reported for re-prompting
    /// while the rest apply. Manual fills carry no source path.
    pub fn apply_answers(&mut self, answers: &HashMap<String, String>) -> Result<AnswerOutcome> {
        self.guard(
            &[SessionState::AwaitingAnswers, SessionState::Filled],
            "apply_answers",
        )?;

        let mut outcome = AnswerOutcome::default();
        for (field_id, answer) in answers {
            let field = match self.catalog.get(field_id) {
                Some(field) => field,
                None => {
                    outcome
                        .rejected
                        .push((field_id.clone(), "unknown field id".to_string()));
                    continue;
                }
            };
            match validate_answer(field, answer) {
                Ok(()) => {
                    self.catalog.fill_manual(field_id, answer.clone());
                    outcome.accepted += 1;
                }
                Err(reason) => {
                    warn!(
                        session_id = %self.id,
                        field_id = %field_id,
                        error = %reason,
                        "Answer rejected"
                    );
                    outcome.rejected.push((field_id.clone(), reason));
                }
            }
        }

        self.refresh_missing();
        Ok(outcome)
    }

    /// Drive an [`AnswerSource`] until no required field is missing or the
    /// source stops producing applicable answers.
    pub async fn collect_answers(&mut self, source: &dyn AnswerSource) -> Result<AnswerOutcome> {
        self.guard(&[SessionState::AwaitingAnswers], "collect_answers")?;

        let mut combined = AnswerOutcome::default();
        loop {
            let missing = self.missing_required();
            if missing.is_empty() {
                break;
            }
            let answers = source.collect(&missing).await?;
            if answers.is_empty() {
                break;
            }
            let outcome = self.apply_answers(&answers)?;
            let made_progress = outcome.accepted > 0;
            combined.accepted += outcome.accepted;
            combined.rejected.extend(outcome.rejected);
            if !made_progress {
                break;
            }
        }
        Ok(combined)
    }

    /// Produce the filled PDF bytes through the external writer.
    ///
    /// `Strict` refuses while required fields are missing; `Partial` is the
    /// caller's explicit choice to emit an incomplete form. A writer
    /// failure leaves the catalog and state untouched for retry.
    pub async fn write(&mut self, mode: CompletionMode) -> Result<usize> {
        self.guard(
            &[SessionState::Filled, SessionState::AwaitingAnswers],
            "write",
        )?;

        let missing_required = self.missing_required();
        if !missing_required.is_empty() && mode == CompletionMode::Strict {
            return Err(Error::Incomplete(missing_required.len()));
        }

        let bytes = self
            .hooks
            .writer
            .write(&self.document, &self.catalog)
            .await
            .map_err(|err| Error::Write(err.to_string()))?;

        let len = bytes.len();
        self.output = Some(bytes);
        self.state = SessionState::Written;
        info!(session_id = %self.id, bytes = len, "Document written");
        Ok(len)
    }

    /// Categorize the finished document and file it to the configured
    /// backends.
    ///
    /// A filing failure preserves the Written state and the output bytes;
    /// the caller may retry filing without rewriting.
    pub async fn file(
        &mut self,
        status: GtdStatus,
        options: FilingOptions,
    ) -> Result<FilingResult> {
        self.guard(&[SessionState::Written], "file")?;

        let bytes = self
            .output
            .clone()
            .ok_or_else(|| Error::Internal("written session without output bytes".into()))?;

        let plan = match &self.plan {
            Some(plan) => plan.clone(),
            None => {
                // Filename stem plus field labels/values feed the keyword scorer.
                let text = self.document.stem().replace(['_', '-'], " ");
                let category = self.categorizer.categorize(&text, self.catalog.fields());
                let plan = self
                    .planner
                    .plan(&self.document, category, status, &options);
                self.plan = Some(plan.clone());
                plan
            }
        };

        let mut sensitive: Vec<String> =
            self.disclosed.iter().map(|p| p.to_string()).collect();
        for label in detect_sensitive_labels(self.catalog.fields()) {
            if !sensitive.contains(&label) {
                sensitive.push(label);
            }
        }

        let sidecar = self.planner.build_sidecar(
            &self.document,
            &plan,
            &self.report,
            sensitive,
            &[],
            &options,
        );

        let result = self
            .planner
            .file(&plan, &bytes, &sidecar, &self.hooks.backends)
            .await?;

        info!(
            session_id = %self.id,
            category = plan.category.as_str(),
            gtd_status = status.as_str(),
            dest = %result.path,
            "Document filed"
        );
        self.filing = Some(result.clone());
        self.state = SessionState::Filed;
        Ok(result)
    }

    fn refresh_missing(&mut self) {
        // Preserve fill-pass causes; fields that gained a value drop out.
        let previous: HashMap<String, MissingReason> = self
            .missing
            .iter()
            .map(|m| (m.field_id.clone(), m.reason))
            .collect();
        self.missing = self
            .catalog
            .missing_report(|id| previous.get(id).copied());

        let (auto, manual) = self.catalog.fill_counts();
        self.report.fields_auto = auto;
        self.report.fields_manual = manual;
        self.report.fields_filled = auto + manual;
        self.report.fields_skipped = self.missing.len();

        if self.state == SessionState::AwaitingAnswers
            && !self.missing.iter().any(|m| m.required)
        {
            self.state = SessionState::Filled;
        }
    }
}

/// Validate an answer against the field's declared type.
fn validate_answer(field: &FormField, answer: &str) -> std::result::Result<(), String> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Err("empty answer".to_string());
    }
    match field.field_type {
        FieldType::Checkbox => {
            const TOKENS: &[&str] = &[
                "yes", "no", "true", "false", "on", "off", "1", "0", "checked", "unchecked", "x",
            ];
            if TOKENS.contains(&answer.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!("'{answer}' is not a checkbox value"))
            }
        }
        FieldType::Date => {
            const FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d %b %Y"];
            if FORMATS
                .iter()
                .any(|f| NaiveDate::parse_from_str(answer, f).is_ok())
            {
                Ok(())
            } else {
                Err(format!("'{answer}' is not a recognized date"))
            }
        }
        FieldType::Dropdown | FieldType::Radio => {
            if field.options.is_empty()
                || field
                    .options
                    .iter()
                    .any(|o| o.eq_ignore_ascii_case(answer))
            {
                Ok(())
            } else {
                Err(format!("'{answer}' is not one of the declared options"))
            }
        }
        FieldType::Text | FieldType::Signature | FieldType::Unknown => Ok(()),
    }
}
