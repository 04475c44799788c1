//! Predictive service interfaces for clause analysis.
//!
//! The clause classifier and the risk model are black boxes behind the
//! [`ClassificationService`] and [`RiskService`] traits. Handles are built
//! once at startup ([`ServiceSet::from_config`]) and injected into the
//! analyzer; tests substitute in-process fakes.

mod http;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use clauseguard_shared::{Result, ServicesConfig};

pub use http::{HttpClassifier, HttpRiskModel};

// ---------------------------------------------------------------------------
// Prediction types
// ---------------------------------------------------------------------------

/// Predicted clause type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    /// Probability of `label`, in `[0, 1]`.
    pub confidence: f64,
}

/// Signed contribution of one token to the risk prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub token: String,
    /// Positive values push towards higher risk.
    pub contribution: f64,
}

/// Predicted risk level with its explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub label: String,
    /// Probability of `label`, in `[0, 1]`.
    pub confidence: f64,
    /// Most influential tokens; `None` when the model has no explainer.
    #[serde(default)]
    pub top_features: Option<Vec<FeatureContribution>>,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Predicts the type of a clause.
#[async_trait]
pub trait ClassificationService: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Classification>;
}

/// Predicts the risk level of a clause and explains it.
#[async_trait]
pub trait RiskService: Send + Sync {
    async fn assess_risk(&self, text: &str) -> Result<RiskAssessment>;
}

// ---------------------------------------------------------------------------
// ServiceSet
// ---------------------------------------------------------------------------

/// The loaded predictive services. A `None` handle means "not loaded".
#[derive(Clone, Default)]
pub struct ServiceSet {
    pub classifier: Option<Arc<dyn ClassificationService>>,
    pub risk: Option<Arc<dyn RiskService>>,
}

impl ServiceSet {
    /// Build HTTP clients for every configured endpoint.
    pub fn from_config(config: &ServicesConfig, timeout: Duration) -> Result<Self> {
        let classifier: Option<Arc<dyn ClassificationService>> = match &config.classifier_url {
            Some(url) => {
                info!(%url, "classification service configured");
                Some(Arc::new(HttpClassifier::new(url, timeout)?))
            }
            None => {
                warn!("classification service not configured, clause types will be N/A");
                None
            }
        };

        let risk: Option<Arc<dyn RiskService>> = match &config.risk_url {
            Some(url) => {
                info!(%url, "risk service configured");
                Some(Arc::new(HttpRiskModel::new(url, timeout)?))
            }
            None => {
                warn!("risk service not configured, risk levels will be Unknown");
                None
            }
        };

        Ok(Self { classifier, risk })
    }
}

impl std::fmt::Debug for ServiceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceSet")
            .field("classifier", &self.classifier.is_some())
            .field("risk", &self.risk.is_some())
            .finish()
    }
}
