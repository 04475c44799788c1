//! Per-clause analysis against the predictive services.
//!
//! Every clause gets a [`ClauseRecord`], whatever happens to the services:
//! an absent, failing, or slow service is replaced by its sentinel outcome.
//! Clauses run concurrently, bounded by a semaphore, and results come back in
//! input order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use clauseguard_services::{ClassificationService, RiskService, ServiceSet};
use clauseguard_shared::{AnalyzerOptions, ClassificationOutcome, ClauseRecord, RiskOutcome};

use crate::justification::{EXPLAINABILITY_UNAVAILABLE, justify};
use crate::pipeline::ProgressReporter;

/// Runs both predictive services over clauses.
#[derive(Debug, Clone)]
pub struct ClauseAnalyzer {
    services: ServiceSet,
    options: AnalyzerOptions,
}

impl ClauseAnalyzer {
    pub fn new(services: ServiceSet, options: AnalyzerOptions) -> Self {
        Self { services, options }
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    /// Analyze one clause. Never fails.
    pub async fn analyze_clause(&self, clause: &str) -> ClauseRecord {
        analyze_one(&self.services, &self.options, clause).await
    }

    /// Analyze all clauses; the output has one record per clause, in order.
    #[instrument(skip_all, fields(clauses = clauses.len(), concurrency = self.options.concurrency))]
    pub async fn analyze(
        &self,
        clauses: &[String],
        progress: &dyn ProgressReporter,
    ) -> Vec<ClauseRecord> {
        let semaphore = Arc::new(Semaphore::new(self.options.concurrency.max(1)));
        let total = clauses.len();

        let handles: Vec<_> = clauses
            .iter()
            .map(|clause| {
                let sem = semaphore.clone();
                let services = self.services.clone();
                let options = self.options.clone();
                let clause = clause.clone();

                tokio::spawn(async move {
                    let Ok(_permit) = sem.acquire().await else {
                        return ClauseRecord::unavailable(clause);
                    };
                    analyze_one(&services, &options, &clause).await
                })
            })
            .collect();

        // Await in spawn order so records line up with their clauses.
        let mut records = Vec::with_capacity(total);
        for (i, (handle, clause)) in handles.into_iter().zip(clauses).enumerate() {
            let record = match handle.await {
                Ok(record) => record,
                Err(e) => {
                    warn!(index = i, error = %e, "clause task failed, using sentinel record");
                    ClauseRecord::unavailable(clause.clone())
                }
            };
            progress.clause_analyzed(i + 1, total);
            records.push(record);
        }

        info!(count = records.len(), "clause analysis complete");
        records
    }
}

async fn analyze_one(services: &ServiceSet, options: &AnalyzerOptions, clause: &str) -> ClauseRecord {
    let (classification, risk) = tokio::join!(
        classify(services.classifier.as_deref(), clause, options.service_timeout),
        assess(services.risk.as_deref(), clause, options.service_timeout, options.top_k),
    );

    ClauseRecord {
        clause: clause.to_string(),
        classification,
        risk,
    }
}

// ---------------------------------------------------------------------------
// Service calls
// ---------------------------------------------------------------------------

async fn classify(
    classifier: Option<&dyn ClassificationService>,
    clause: &str,
    limit: Duration,
) -> ClassificationOutcome {
    let Some(classifier) = classifier else {
        debug!("classifier not loaded");
        return ClassificationOutcome::unavailable();
    };

    match tokio::time::timeout(limit, classifier.classify(clause)).await {
        Ok(Ok(prediction)) => ClassificationOutcome {
            predicted_clause_type: prediction.label,
            confidence: round3(prediction.confidence),
        },
        Ok(Err(e)) => {
            warn!(error = %e, "classification failed");
            ClassificationOutcome::unavailable()
        }
        Err(_) => {
            warn!(timeout_ms = limit.as_millis() as u64, "classification timed out");
            ClassificationOutcome::unavailable()
        }
    }
}

async fn assess(
    risk: Option<&dyn RiskService>,
    clause: &str,
    limit: Duration,
    top_k: usize,
) -> RiskOutcome {
    let Some(risk) = risk else {
        debug!("risk model not loaded");
        return RiskOutcome::unavailable();
    };

    match tokio::time::timeout(limit, risk.assess_risk(clause)).await {
        Ok(Ok(assessment)) => RiskOutcome {
            risk_level: assessment.label,
            confidence: assessment.confidence,
            justification: match assessment.top_features {
                Some(features) => justify(&features, top_k),
                None => EXPLAINABILITY_UNAVAILABLE.to_string(),
            },
        },
        Ok(Err(e)) => {
            warn!(error = %e, "risk assessment failed");
            RiskOutcome::unavailable()
        }
        Err(_) => {
            warn!(timeout_ms = limit.as_millis() as u64, "risk assessment timed out");
            RiskOutcome::unavailable()
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
