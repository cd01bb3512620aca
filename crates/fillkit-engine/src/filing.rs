//! Filing-location planning: destination folder, canonical filename, and
//! metadata sidecar for a finished document.
//!
//! GTD folder structure:
//!     @Inbox/           — New/unprocessed
//!     @Action/          — Needs follow-up
//!       Waiting-For/    — Sent, awaiting response
//!       Next-Actions/   — Your next steps
//!     @Reference/       — Filed for future reference, by category and year
//!     @Archive/         — Completed

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};

use fillkit_core::defaults::{FILED_BY, FINGERPRINT_LEN, SIDECAR_EXTENSION};
use fillkit_core::{
    Category, Error, FillReport, FilingResult, GtdStatus, Result, SidecarMetadata, SourceDocument,
    StorageBackend,
};

static SLUG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("static pattern"));

/// Reduce free text to a lowercase hyphenated slug.
fn slugify(text: &str) -> String {
    SLUG_PATTERN
        .replace_all(&text.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// GTD folder for a status.
fn gtd_folder(status: GtdStatus) -> &'static str {
    match status {
        GtdStatus::Inbox => "@Inbox",
        GtdStatus::Action => "@Action/Next-Actions",
        GtdStatus::WaitingFor => "@Action/Waiting-For",
        GtdStatus::Reference => "@Reference",
        GtdStatus::Archive => "@Archive",
    }
}

/// Filing configuration.
#[derive(Debug, Clone)]
pub struct FilingConfig {
    /// Identity recorded in sidecar metadata as the filer.
    pub filed_by: String,
}

impl Default for FilingConfig {
    fn default() -> Self {
        Self {
            filed_by: FILED_BY.to_string(),
        }
    }
}

impl FilingConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `FILLKIT_FILED_BY` | `fillkit` | Filer identity in sidecar metadata |
    pub fn from_env() -> Self {
        let filed_by = std::env::var("FILLKIT_FILED_BY").unwrap_or_else(|_| FILED_BY.to_string());
        Self { filed_by }
    }
}

/// A computed filing plan: where the document and its sidecar will land.
#[derive(Debug, Clone, PartialEq)]
pub struct FilingPlan {
    pub filename: String,
    pub dest_path: String,
    pub sidecar_path: String,
    pub category: Category,
    pub gtd_status: GtdStatus,
}

/// Optional filing inputs supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct FilingOptions {
    /// Document source/issuer, folded into filename and metadata.
    pub source: Option<String>,
    /// Subcategory folder under the category (reference filings only).
    pub subcategory: Option<String>,
    pub follow_up_date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

/// Computes filing plans and drives the storage transfer.
///
/// The planner remembers every destination it has issued, so two distinct
/// documents computing the same base filename in one run diverge via a
/// content fingerprint instead of colliding.
pub struct FilingPlanner {
    config: FilingConfig,
    issued: HashSet<String>,
}

impl FilingPlanner {
    pub fn new(config: FilingConfig) -> Self {
        Self {
            config,
            issued: HashSet::new(),
        }
    }

    /// Generate the standardized filename `YYYY-MM-DD_description[_source].pdf`.
    pub fn generate_filename(
        &self,
        document: &SourceDocument,
        date: DateTime<Utc>,
        source: Option<&str>,
    ) -> String {
        let mut parts = vec![date.format("%Y-%m-%d").to_string(), slugify(document.stem())];
        if let Some(source) = source {
            let slug = slugify(source);
            if !slug.is_empty() {
                parts.push(slug);
            }
        }
        format!("{}.pdf", parts.join("_"))
    }

    /// Build the destination path within the GTD folder structure.
    ///
    /// Reference filings nest under `Category[/Subcategory]/YYYY`; every
    /// other status files flat into its GTD folder.
    pub fn build_dest_path(
        &self,
        filename: &str,
        category: Category,
        status: GtdStatus,
        subcategory: Option<&str>,
        year: i32,
    ) -> String {
        let folder = gtd_folder(status);
        if status == GtdStatus::Reference {
            match subcategory {
                Some(sub) => format!(
                    "{folder}/{}/{}/{year}/{filename}",
                    category.folder_name(),
                    title_case(sub)
                ),
                None => format!("{folder}/{}/{year}/{filename}", category.folder_name()),
            }
        } else {
            format!("{folder}/{filename}")
        }
    }

    /// Compute the filing plan for a document.
    ///
    /// If the computed destination was already issued to a different
    /// document this run, an 8-hex content fingerprint is inserted before
    /// the extension to keep the paths distinct.
    pub fn plan(
        &mut self,
        document: &SourceDocument,
        category: Category,
        status: GtdStatus,
        options: &FilingOptions,
    ) -> FilingPlan {
        let now = Utc::now();
        let filename = self.generate_filename(document, now, options.source.as_deref());
        let mut dest_path = self.build_dest_path(
            &filename,
            category,
            status,
            options.subcategory.as_deref(),
            now.year(),
        );

        if self.issued.contains(&dest_path) {
            let fingerprint = content_fingerprint(&document.data);
            let disambiguated = filename.replace(".pdf", &format!("_{fingerprint}.pdf"));
            warn!(
                document = %document.filename,
                dest = %dest_path,
                "Destination collision, appending content fingerprint"
            );
            dest_path = self.build_dest_path(
                &disambiguated,
                category,
                status,
                options.subcategory.as_deref(),
                now.year(),
            );
            self.issued.insert(dest_path.clone());
            return FilingPlan {
                filename: disambiguated,
                sidecar_path: sidecar_path_for(&dest_path),
                dest_path,
                category,
                gtd_status: status,
            };
        }

        self.issued.insert(dest_path.clone());
        FilingPlan {
            filename,
            sidecar_path: sidecar_path_for(&dest_path),
            dest_path,
            category,
            gtd_status: status,
        }
    }

    /// Build the sidecar metadata record for a filing.
    pub fn build_sidecar(
        &self,
        document: &SourceDocument,
        plan: &FilingPlan,
        report: &FillReport,
        sensitive_fields: Vec<String>,
        destinations: &[String],
        options: &FilingOptions,
    ) -> SidecarMetadata {
        let now = Utc::now();
        let mut tags = vec![plan.category.as_str().to_string()];
        if let Some(sub) = &options.subcategory {
            tags.push(sub.to_lowercase());
        }
        tags.push(now.format("%Y").to_string());
        if let Some(source) = &options.source {
            tags.push(source.to_lowercase().replace(' ', "-"));
        }
        tags.extend(options.tags.iter().cloned());

        SidecarMetadata {
            original_filename: document.filename.clone(),
            filed_date: now,
            category: plan.category.as_str().to_string(),
            subcategory: options.subcategory.clone(),
            source: options.source.clone(),
            status: plan.gtd_status.as_str().to_string(),
            follow_up_date: options.follow_up_date,
            fields_filled: report.fields_filled,
            fields_auto: report.fields_auto,
            fields_manual: report.fields_manual,
            sensitive_fields,
            filed_by: self.config.filed_by.clone(),
            filed_to: destinations.to_vec(),
            tags,
        }
    }

    /// Transfer the finished bytes to every backend and construct the
    /// immutable [`FilingResult`].
    ///
    /// Requires at least one backend to accept the document. The sidecar is
    /// written exactly once, to the first backend that takes it; a sidecar
    /// refusal does not fail the filing.
    pub async fn file(
        &self,
        plan: &FilingPlan,
        bytes: &[u8],
        sidecar: &SidecarMetadata,
        backends: &[Arc<dyn StorageBackend>],
    ) -> Result<FilingResult> {
        if backends.is_empty() {
            return Err(Error::Filing("no storage backends configured".into()));
        }

        let mut destinations: Vec<String> = Vec::new();
        let mut primary_path = String::new();
        for backend in backends {
            match backend.transfer(bytes, &plan.dest_path).await {
                Ok(uri) => {
                    info!(
                        backend = backend.name(),
                        dest = %plan.dest_path,
                        "Filed document"
                    );
                    destinations.push(format!("{}:{}", backend.name(), plan.dest_path));
                    if primary_path.is_empty() {
                        primary_path = uri;
                    }
                }
                Err(err) => {
                    error!(backend = backend.name(), error = %err, "Backend transfer failed");
                }
            }
        }

        if destinations.is_empty() {
            return Err(Error::Filing("all storage backends failed".into()));
        }

        // The sidecar records where the document actually landed.
        let mut sidecar = sidecar.clone();
        sidecar.filed_to = destinations.clone();
        let sidecar_yaml = serde_yaml::to_string(&sidecar)?;
        let mut metadata_path = String::new();
        for backend in backends {
            match backend.store_metadata(&sidecar_yaml, &plan.dest_path).await {
                Ok(path) => {
                    metadata_path = path;
                    break;
                }
                Err(err) => {
                    warn!(backend = backend.name(), error = %err, "Sidecar store failed");
                }
            }
        }
        if metadata_path.is_empty() {
            metadata_path = plan.sidecar_path.clone();
        }

        Ok(FilingResult {
            path: primary_path,
            category: plan.category,
            gtd_status: plan.gtd_status,
            metadata_path,
            filed_at: Utc::now(),
            destinations,
        })
    }
}

/// Sidecar path for a PDF destination: extension swapped for `.meta.yml`.
fn sidecar_path_for(dest_path: &str) -> String {
    match dest_path.rsplit_once('.') {
        Some((base, _)) => format!("{base}{SIDECAR_EXTENSION}"),
        None => format!("{dest_path}{SIDECAR_EXTENSION}"),
    }
}

/// Short hex fingerprint of the document bytes.
fn content_fingerprint(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    hex::encode(digest)[..FINGERPRINT_LEN].to_string()
}

fn title_case(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
