//! Analysis orchestration
//!
//! Loader → page-one typography and geometry, plus section classification
//! over every page → evaluator. Documents are owned values and are released
//! when each entry point returns.

use std::path::Path;

use shared_pdf::{PageLayout, PdfDocument};
use shared_types::ComplianceReport;

use crate::config::AnalyzerConfig;
use crate::evaluator::{evaluate, PageOneFindings};
use crate::geometry;
use crate::loader::{self, load_bytes, Rejection};
use crate::rubric::FormatRubric;
use crate::sections::SectionTally;
use crate::typography::Typography;

/// ComplianceEngine entry point
#[derive(Debug, Clone, Default)]
pub struct ComplianceEngine {
    config: AnalyzerConfig,
}

impl ComplianceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze an in-memory document. `source_name` is only used for the
    /// extension check.
    pub fn check_bytes(&self, source_name: &str, bytes: &[u8]) -> ComplianceReport {
        self.report(source_name, load_bytes(source_name, bytes))
    }

    /// Analyze a document on disk
    pub fn check_file(&self, path: &Path) -> ComplianceReport {
        self.report(&path.display().to_string(), loader::load_file(path))
    }

    fn report(&self, source: &str, loaded: Result<PdfDocument, Rejection>) -> ComplianceReport {
        match loaded {
            Ok(doc) => {
                let report = self.check_document(&doc);
                tracing::info!(
                    source,
                    pages = doc.page_count(),
                    compliant = report.is_compliant(),
                    "Analyzed document"
                );
                report
            }
            Err(rejection) => {
                tracing::info!(source, reason = %rejection, "Rejected document");
                ComplianceReport::rejected()
            }
        }
    }

    /// Analyze an already opened document
    pub fn check_document(&self, doc: &PdfDocument) -> ComplianceReport {
        let rubric = FormatRubric::STANDARD;
        let mut first: Option<PageLayout> = None;
        let mut tally = SectionTally::default();

        let limit = self
            .config
            .page_limit()
            .map_or(doc.page_count(), |max| max.min(doc.page_count()));

        for number in 1..=limit {
            let page = match doc.page(number) {
                Ok(page) => Some(page),
                Err(e) => {
                    tracing::warn!(page = number, error = %e, "Failed to read page content");
                    None
                }
            };

            let text = page.as_ref().map(PageLayout::text).unwrap_or_default();
            tally = tally.observe(&text);
            tracing::debug!(page = number, current = ?tally.current(), "Classified page");

            if number == 1 {
                first = page;
            }
        }

        let findings = match &first {
            Some(page) => page_one_findings(page, &rubric),
            None => PageOneFindings::UNREADABLE,
        };

        evaluate(&findings, &tally)
    }

    /// Analyze in-memory bytes on the blocking pool under the configured
    /// time budget
    #[cfg(feature = "server")]
    pub async fn check_bytes_with_timeout(
        &self,
        source_name: String,
        bytes: Vec<u8>,
    ) -> Result<ComplianceReport, crate::AnalysisError> {
        let engine = self.clone();
        self.run_guarded(move || engine.check_bytes(&source_name, &bytes))
            .await
    }

    /// Analyze a file on the blocking pool under the configured time budget
    #[cfg(feature = "server")]
    pub async fn check_file_with_timeout(
        &self,
        path: std::path::PathBuf,
    ) -> Result<ComplianceReport, crate::AnalysisError> {
        let engine = self.clone();
        self.run_guarded(move || engine.check_file(&path)).await
    }

    #[cfg(feature = "server")]
    async fn run_guarded<F>(&self, task: F) -> Result<ComplianceReport, crate::AnalysisError>
    where
        F: FnOnce() -> ComplianceReport + Send + 'static,
    {
        use crate::AnalysisError;

        let handle = tokio::task::spawn_blocking(task);
        let joined = match self.config.timeout() {
            Some(budget) => match tokio::time::timeout(budget, handle).await {
                Ok(joined) => joined,
                Err(_timeout) => {
                    tracing::warn!(timeout_ms = self.config.timeout_ms, "Analysis timed out");
                    return Err(AnalysisError::Timeout(self.config.timeout_ms));
                }
            },
            None => handle.await,
        };

        joined.map_err(|join_error| {
            AnalysisError::TaskFailed(format!("Analysis task panicked: {}", join_error))
        })
    }
}

fn page_one_findings(page: &PageLayout, rubric: &FormatRubric) -> PageOneFindings {
    let typography = Typography::collect(page);
    PageOneFindings {
        font_family: typography.font_family(rubric),
        font_size: typography.font_size(rubric),
        margin: geometry::margin(page, rubric),
    }
}
