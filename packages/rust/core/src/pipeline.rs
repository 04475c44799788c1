//! End-to-end analysis: upload → text → clauses → records + gaps → report.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument};

use clauseguard_compliance::detect_missing;
use clauseguard_extract::{DocumentFormat, TextExtractor};
use clauseguard_segment::segment_with_strategy;
use clauseguard_shared::{
    AnalysisReport, ArtifactRef, ClauseGuardError, MissingRequirement, ReportSummary, Result,
};
use clauseguard_storage::ArtifactStore;

use crate::analyzer::ClauseAnalyzer;
use crate::augment::build_augmented_document;

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called as each clause record is collected, in clause order.
    fn clause_analyzed(&self, current: usize, total: usize);
    /// Called when the report is ready.
    fn done(&self, report: &AnalysisReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn clause_analyzed(&self, _current: usize, _total: usize) {}
    fn done(&self, _report: &AnalysisReport) {}
}

/// Sequences segmentation, clause analysis, gap detection, and augmentation.
#[derive(Debug, Clone)]
pub struct Pipeline {
    analyzer: ClauseAnalyzer,
    store: ArtifactStore,
}

impl Pipeline {
    pub fn new(analyzer: ClauseAnalyzer, store: ArtifactStore) -> Self {
        Self { analyzer, store }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Analyze an uploaded document.
    ///
    /// The bytes are written to a temporary file for extraction; the file is
    /// removed when extraction finishes, on success or failure. Extraction runs
    /// on the blocking pool.
    #[instrument(skip_all, fields(filename = %filename, size = bytes.len()))]
    pub async fn analyze_upload(
        &self,
        filename: &str,
        bytes: &[u8],
        extractor: Arc<dyn TextExtractor>,
        progress: &dyn ProgressReporter,
    ) -> Result<AnalysisReport> {
        let format = DocumentFormat::from_filename(filename)?;

        progress.phase("Extracting text");
        let tmp_dir = std::env::temp_dir();
        let mut upload = tempfile::Builder::new()
            .prefix("clauseguard_in_")
            .suffix(&format!(".{}", format.extension()))
            .tempfile()
            .map_err(|e| ClauseGuardError::io(&tmp_dir, e))?;

        upload
            .write_all(bytes)
            .and_then(|()| upload.flush())
            .map_err(|e| ClauseGuardError::io(upload.path(), e))?;

        let text = tokio::task::spawn_blocking(move || extractor.extract(upload.path(), format))
            .await
            .map_err(|e| ClauseGuardError::validation(format!("extraction task failed: {e}")))?;

        self.run(&text, progress).await
    }

    /// Analyze already extracted contract text.
    ///
    /// 1. Reject blank text
    /// 2. Segment into clauses
    /// 3. Concurrently: analyze clauses / detect gaps and write the augmented document
    /// 4. Assemble the report
    #[instrument(skip_all, fields(text_len = raw_text.len()))]
    pub async fn run(
        &self,
        raw_text: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<AnalysisReport> {
        let start = Instant::now();

        if raw_text.trim().is_empty() {
            return Err(ClauseGuardError::EmptyInput);
        }

        // --- Phase 1: Segmentation ---
        progress.phase("Segmenting clauses");
        let segmentation = segment_with_strategy(raw_text);
        let Some(strategy) = segmentation.strategy else {
            return Err(ClauseGuardError::NoClausesDetected);
        };
        let clauses = segmentation.clauses;
        info!(%strategy, clauses = clauses.len(), "contract segmented");

        // --- Phase 2: Analysis and compliance, side by side ---
        progress.phase("Analyzing clauses");
        let (analysis, compliance) = tokio::join!(
            self.analyzer.analyze(&clauses, progress),
            self.check_compliance(raw_text),
        );
        let (missing_clauses, augmented_document) = compliance?;

        // --- Phase 3: Report ---
        let report = AnalysisReport {
            total_clauses: analysis.len(),
            summary: ReportSummary::from_records(&analysis),
            analysis,
            missing_clauses,
            augmented_document,
        };

        info!(
            total_clauses = report.total_clauses,
            missing = report.missing_clauses.len(),
            artifact = report.augmented_document.as_ref().map_or("-", |a| a.name.as_str()),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "analysis complete"
        );

        progress.done(&report);
        Ok(report)
    }

    /// Detect missing mandatory clauses; write the augmented document iff any are missing.
    async fn check_compliance(
        &self,
        raw_text: &str,
    ) -> Result<(Vec<MissingRequirement>, Option<ArtifactRef>)> {
        let missing = detect_missing(raw_text);
        if missing.is_empty() {
            return Ok((missing, None));
        }

        let store = self.store.clone();
        let text = raw_text.to_string();
        let requirements = missing.clone();
        let artifact = tokio::task::spawn_blocking(move || {
            build_augmented_document(&store, &text, &requirements)
        })
        .await
        .map_err(|e| ClauseGuardError::validation(format!("augmentation task failed: {e}")))??;

        Ok((missing, Some(artifact)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use clauseguard_extract::DefaultExtractor;
    use clauseguard_services::{
        Classification, ClassificationService, FeatureContribution, RiskAssessment, RiskService,
        ServiceSet,
    };
    use clauseguard_shared::{AnalyzerOptions, ClauseRecord, Regime};

    use super::*;

    fn load_fixture(name: &str) -> String {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/contracts")
            .join(name);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("missing fixture: {}", path.display()))
    }

    fn website_design() -> String {
        load_fixture("website_design.txt")
    }

    struct KeywordClassifier;

    #[async_trait]
    impl ClassificationService for KeywordClassifier {
        async fn classify(&self, text: &str) -> Result<Classification> {
            let label = if text.contains("Payment") {
                "Payment"
            } else if text.contains("Assignment") {
                "Assignment"
            } else {
                "General"
            };
            Ok(Classification {
                label: label.into(),
                confidence: 0.9,
            })
        }
    }

    struct AssignmentRisk;

    #[async_trait]
    impl RiskService for AssignmentRisk {
        async fn assess_risk(&self, text: &str) -> Result<RiskAssessment> {
            let high = text.contains("assign");
            Ok(RiskAssessment {
                label: if high { "high" } else { "low" }.into(),
                confidence: 0.75,
                top_features: Some(vec![FeatureContribution {
                    token: if high { "assignment" } else { "business" }.into(),
                    contribution: if high { 0.8 } else { -0.2 },
                }]),
            })
        }
    }

    /// Returns fixed text and remembers where the upload was stored.
    struct RecordingExtractor {
        text: String,
        seen: Mutex<Option<(PathBuf, bool)>>,
    }

    impl RecordingExtractor {
        fn new(text: impl Into<String>) -> Self {
            Self {
                text: text.into(),
                seen: Mutex::new(None),
            }
        }

        fn seen(&self) -> (PathBuf, bool) {
            self.seen.lock().unwrap().clone().expect("extractor was called")
        }
    }

    impl TextExtractor for RecordingExtractor {
        fn extract(&self, path: &Path, _format: DocumentFormat) -> String {
            *self.seen.lock().unwrap() = Some((path.to_path_buf(), path.exists()));
            self.text.clone()
        }
    }

    fn pipeline(services: ServiceSet) -> (tempfile::TempDir, Pipeline) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path().join("artifacts")).unwrap();
        let analyzer = ClauseAnalyzer::new(services, AnalyzerOptions::default());
        (dir, Pipeline::new(analyzer, store))
    }

    fn full_services() -> ServiceSet {
        ServiceSet {
            classifier: Some(Arc::new(KeywordClassifier)),
            risk: Some(Arc::new(AssignmentRisk)),
        }
    }

    #[tokio::test]
    async fn website_contract_end_to_end() {
        let (_dir, pipeline) = pipeline(full_services());
        let report = pipeline.run(&website_design(), &SilentProgress).await.unwrap();

        assert_eq!(report.total_clauses, 9);
        assert_eq!(report.total_clauses, report.analysis.len());
        assert_eq!(report.analysis[0].clause, "0. WEBSITE DESIGN AGREEMENT");

        let assignment = &report.analysis[4];
        assert!(assignment.clause.starts_with("4. Assignment"));
        assert_eq!(assignment.classification.predicted_clause_type, "Assignment");
        assert_eq!(assignment.risk.risk_level, "high");

        let regimes: Vec<Regime> = report.missing_clauses.iter().map(|m| m.regime).collect();
        assert_eq!(regimes, vec![Regime::Hipaa, Regime::Gdpr]);

        let artifact = report.augmented_document.as_ref().expect("artifact written");
        assert!(artifact.name.ends_with(".docx"));
        let path = pipeline.store().path_of(&artifact.name).unwrap();
        let doc = DefaultExtractor.extract(&path, DocumentFormat::Docx);
        assert!(doc.contains("WEBSITE DESIGN AGREEMENT"));
        assert!(doc.contains("GDPR Data Protection Clause (GDPR)"));

        assert_eq!(report.summary.clause_types["Payment"], 1);
        assert_eq!(report.summary.risk_levels.values().sum::<usize>(), 9);
    }

    #[tokio::test]
    async fn services_down_still_produce_full_report() {
        let (_dir, pipeline) = pipeline(ServiceSet::default());
        let report = pipeline.run(&website_design(), &SilentProgress).await.unwrap();

        assert_eq!(report.total_clauses, 9);
        for record in &report.analysis {
            assert_eq!(record, &ClauseRecord::unavailable(record.clause.clone()));
        }
        assert_eq!(report.summary.risk_levels["Unknown"], 9);
        assert!(report.augmented_document.is_some());
    }

    #[tokio::test]
    async fn compliant_contract_has_no_artifact() {
        let (dir, pipeline) = pipeline(ServiceSet::default());
        let text = "1. Data Protection. Personal data is processed under GDPR.\n\
                    2. Health Data. Protected health information is handled per HIPAA.";
        let report = pipeline.run(text, &SilentProgress).await.unwrap();

        assert!(report.missing_clauses.is_empty());
        assert!(report.augmented_document.is_none());
        let stored = std::fs::read_dir(dir.path().join("artifacts")).unwrap().count();
        assert_eq!(stored, 0);
    }

    #[tokio::test]
    async fn artifact_write_failure_fails_the_request() {
        let (_dir, pipeline) = pipeline(full_services());
        std::fs::remove_dir_all(pipeline.store().root()).unwrap();

        let err = pipeline.run(&website_design(), &SilentProgress).await.unwrap_err();

        match &err {
            ClauseGuardError::Io { path, .. } => {
                assert!(path.to_string_lossy().contains("contract_modified_"));
            }
            other => panic!("expected Io error, got {other:?}"),
        }
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn blank_text_is_empty_input() {
        let (_dir, pipeline) = pipeline(ServiceSet::default());
        let err = pipeline.run("  \n\t ", &SilentProgress).await.unwrap_err();
        assert!(matches!(err, ClauseGuardError::EmptyInput));
        assert_eq!(err.reason(), "no_readable_text");
    }

    #[tokio::test]
    async fn short_text_has_no_clauses() {
        let (_dir, pipeline) = pipeline(ServiceSet::default());
        let err = pipeline.run("Too short.", &SilentProgress).await.unwrap_err();
        assert!(matches!(err, ClauseGuardError::NoClausesDetected));
    }

    #[tokio::test]
    async fn upload_uses_temp_file_and_removes_it() {
        let (_dir, pipeline) = pipeline(ServiceSet::default());
        let extractor = Arc::new(RecordingExtractor::new(website_design()));

        let report = pipeline
            .analyze_upload("Website Design.PDF", b"%PDF-1.4", extractor.clone(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.total_clauses, 9);
        let (path, existed) = extractor.seen();
        assert!(existed, "upload should exist during extraction");
        assert!(!path.exists(), "upload should be removed afterwards");
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pdf"));
    }

    #[tokio::test]
    async fn upload_temp_file_removed_on_failure() {
        let (_dir, pipeline) = pipeline(ServiceSet::default());
        let extractor = Arc::new(RecordingExtractor::new(""));

        let err = pipeline
            .analyze_upload("scan.docx", b"PK", extractor.clone(), &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, ClauseGuardError::EmptyInput));
        let (path, _) = extractor.seen();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn unsupported_upload_is_rejected_before_extraction() {
        let (_dir, pipeline) = pipeline(ServiceSet::default());
        let extractor = Arc::new(RecordingExtractor::new(website_design()));

        let err = pipeline
            .analyze_upload("contract.txt", b"hello", extractor.clone(), &SilentProgress)
            .await
            .unwrap_err();

        assert_eq!(err.reason(), "invalid_file_type");
        assert!(extractor.seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn report_serializes_with_expected_fields() {
        let (_dir, pipeline) = pipeline(ServiceSet::default());
        let report = pipeline.run(&website_design(), &SilentProgress).await.unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["total_clauses"], 9);
        assert_eq!(json["missing_clauses"][0]["regime"], "HIPAA");
        assert_eq!(json["analysis"][0]["risk"]["risk_level"], "Unknown");
        assert!(json["augmented_document"]["name"].is_string());
    }
}
