//! Core domain types for ClauseGuard analysis reports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Clause-type label used when the classification service is unavailable.
pub const UNCLASSIFIED_LABEL: &str = "N/A";

/// Risk label used when the risk service is unavailable.
pub const UNKNOWN_RISK_LABEL: &str = "Unknown";

/// Justification used when the risk service is unavailable.
pub const RISK_MODEL_UNAVAILABLE: &str = "Risk model or vectorizer not loaded.";

// ---------------------------------------------------------------------------
// ClauseRecord
// ---------------------------------------------------------------------------

/// Clause-type prediction for a single clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    /// Predicted clause type.
    pub predicted_clause_type: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

impl ClassificationOutcome {
    /// Sentinel outcome for an absent or failing classifier.
    pub fn unavailable() -> Self {
        Self {
            predicted_clause_type: UNCLASSIFIED_LABEL.to_string(),
            confidence: 0.0,
        }
    }
}

/// Risk prediction and its plain-language justification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskOutcome {
    pub risk_level: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    pub justification: String,
}

impl RiskOutcome {
    /// Sentinel outcome for an absent or failing risk model.
    pub fn unavailable() -> Self {
        Self {
            risk_level: UNKNOWN_RISK_LABEL.to_string(),
            confidence: 0.0,
            justification: RISK_MODEL_UNAVAILABLE.to_string(),
        }
    }
}

/// Merged analysis of one clause. Always produced, even when services fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseRecord {
    /// The clause text as segmented.
    pub clause: String,
    pub classification: ClassificationOutcome,
    pub risk: RiskOutcome,
}

impl ClauseRecord {
    /// Record for a clause whose services were both unavailable.
    pub fn unavailable(clause: impl Into<String>) -> Self {
        Self {
            clause: clause.into(),
            classification: ClassificationOutcome::unavailable(),
            risk: RiskOutcome::unavailable(),
        }
    }
}

// ---------------------------------------------------------------------------
// Regulatory regimes
// ---------------------------------------------------------------------------

/// Regulatory frameworks with a mandatory clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Regime {
    #[serde(rename = "HIPAA")]
    Hipaa,
    #[serde(rename = "GDPR")]
    Gdpr,
}

impl Regime {
    /// Display name of the regime.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hipaa => "HIPAA",
            Self::Gdpr => "GDPR",
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mandatory clause absent from the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingRequirement {
    pub regime: Regime,
    /// Canonical requirement name, e.g. `GDPR Data Protection Clause`.
    pub requirement: String,
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// Reference to a stored artifact, retrievable by its exact `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Unique file name within the artifact directory.
    pub name: String,
    /// Absolute location on disk.
    pub path: String,
    /// SHA-256 of the stored bytes.
    pub sha256: String,
    pub size_bytes: usize,
}

// ---------------------------------------------------------------------------
// AnalysisReport
// ---------------------------------------------------------------------------

/// Label distributions across all clause records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Predicted clause type → number of clauses.
    pub clause_types: BTreeMap<String, usize>,
    /// Risk level → number of clauses.
    pub risk_levels: BTreeMap<String, usize>,
}

impl ReportSummary {
    /// Count the labels of `records`.
    pub fn from_records(records: &[ClauseRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            *summary
                .clause_types
                .entry(record.classification.predicted_clause_type.clone())
                .or_default() += 1;
            *summary
                .risk_levels
                .entry(record.risk.risk_level.clone())
                .or_default() += 1;
        }
        summary
    }
}

/// The full result of analyzing one contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Number of clauses (always equals `analysis.len()`).
    pub total_clauses: usize,
    /// Per-clause records, in clause order.
    pub analysis: Vec<ClauseRecord>,
    /// Missing mandatory clauses, in regime registration order.
    pub missing_clauses: Vec<MissingRequirement>,
    pub summary: ReportSummary,
    /// Generated document, present iff `missing_clauses` is non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub augmented_document: Option<ArtifactRef>,
}

/// Client-facing error body with a machine-readable reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub reason: String,
}

impl From<&crate::ClauseGuardError> for ErrorBody {
    fn from(err: &crate::ClauseGuardError) -> Self {
        Self {
            error: err.to_string(),
            reason: err.reason().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_record_uses_sentinels() {
        let record = ClauseRecord::unavailable("1. The Provider shall deliver the website.");
        assert_eq!(record.classification.predicted_clause_type, "N/A");
        assert_eq!(record.classification.confidence, 0.0);
        assert_eq!(record.risk.risk_level, "Unknown");
        assert_eq!(record.risk.confidence, 0.0);
        assert_eq!(record.risk.justification, "Risk model or vectorizer not loaded.");
    }

    #[test]
    fn regime_serializes_as_display_name() {
        let missing = MissingRequirement {
            regime: Regime::Gdpr,
            requirement: "GDPR Data Protection Clause".into(),
        };
        let json = serde_json::to_string(&missing).expect("serialize");
        assert_eq!(
            json,
            r#"{"regime":"GDPR","requirement":"GDPR Data Protection Clause"}"#
        );
        assert_eq!(Regime::Hipaa.to_string(), "HIPAA");
    }

    #[test]
    fn summary_counts_labels() {
        let mut high = ClauseRecord::unavailable("clause a is long enough to count");
        high.risk.risk_level = "high".into();
        high.classification.predicted_clause_type = "Payment".into();
        let records = vec![
            high.clone(),
            high,
            ClauseRecord::unavailable("clause c is long enough to count"),
        ];

        let summary = ReportSummary::from_records(&records);
        assert_eq!(summary.risk_levels.get("high"), Some(&2));
        assert_eq!(summary.risk_levels.get("Unknown"), Some(&1));
        assert_eq!(summary.clause_types.get("Payment"), Some(&2));
        assert_eq!(summary.clause_types.get("N/A"), Some(&1));
    }

    #[test]
    fn report_omits_absent_artifact() {
        let report = AnalysisReport {
            total_clauses: 0,
            analysis: vec![],
            missing_clauses: vec![],
            summary: ReportSummary::default(),
            augmented_document: None,
        };
        let json = serde_json::to_value(&report).expect("serialize");
        assert!(json.get("augmented_document").is_none());
        assert_eq!(json["total_clauses"], 0);
    }

    #[test]
    fn error_body_from_error() {
        let body = ErrorBody::from(&crate::ClauseGuardError::NoClausesDetected);
        assert_eq!(body.reason, "no_clauses_detected");
        assert_eq!(body.error, "no clauses detected");
    }
}
