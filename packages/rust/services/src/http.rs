//! HTTP JSON clients for remotely hosted predictive models.
//!
//! Both endpoints take `POST {"text": "<clause>"}` and answer with a JSON body.
//! Non-2xx statuses, undecodable bodies, and confidences outside `[0, 1]` are
//! all reported as [`ClauseGuardError::ServiceUnavailable`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use clauseguard_shared::{ClauseGuardError, Result};

use crate::{Classification, ClassificationService, RiskAssessment, RiskService};

/// User-Agent string for model requests.
const USER_AGENT: &str = concat!("ClauseGuard/", env!("CARGO_PKG_VERSION"));

/// Maximum number of characters of an error body kept in error messages.
const MAX_ERROR_BODY: usize = 200;

#[derive(Serialize)]
struct PredictRequest<'a> {
    text: &'a str,
}

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// A model endpoint with its own HTTP client.
#[derive(Debug, Clone)]
struct Endpoint {
    client: Client,
    url: Url,
}

impl Endpoint {
    fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| ClauseGuardError::config(format!("invalid service URL '{url}': {e}")))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClauseGuardError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, url })
    }

    /// POST the clause text and decode the JSON answer.
    async fn predict<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&PredictRequest { text })
            .send()
            .await
            .map_err(|e| ClauseGuardError::unavailable(format!("{}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(ClauseGuardError::unavailable(format!(
                "{}: HTTP {status}: {body}",
                self.url
            )));
        }

        response.json::<T>().await.map_err(|e| {
            ClauseGuardError::unavailable(format!("{}: invalid response body: {e}", self.url))
        })
    }
}

fn check_confidence(url: &Url, confidence: f64) -> Result<f64> {
    if confidence.is_finite() && (0.0..=1.0).contains(&confidence) {
        Ok(confidence)
    } else {
        Err(ClauseGuardError::unavailable(format!(
            "{url}: confidence {confidence} outside [0, 1]"
        )))
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Clause-type classifier served over HTTP.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    endpoint: Endpoint,
}

impl HttpClassifier {
    /// Create a client for the classifier at `url`; every call is bounded by `timeout`.
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            endpoint: Endpoint::new(url, timeout)?,
        })
    }
}

#[async_trait]
impl ClassificationService for HttpClassifier {
    #[instrument(skip_all, fields(url = %self.endpoint.url, len = text.len()))]
    async fn classify(&self, text: &str) -> Result<Classification> {
        let mut prediction: Classification = self.endpoint.predict(text).await?;
        prediction.confidence = check_confidence(&self.endpoint.url, prediction.confidence)?;
        debug!(label = %prediction.label, confidence = prediction.confidence, "clause classified");
        Ok(prediction)
    }
}

// ---------------------------------------------------------------------------
// Risk model
// ---------------------------------------------------------------------------

/// Risk model with token-level explanations, served over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRiskModel {
    endpoint: Endpoint,
}

impl HttpRiskModel {
    /// Create a client for the risk model at `url`; every call is bounded by `timeout`.
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            endpoint: Endpoint::new(url, timeout)?,
        })
    }
}

#[async_trait]
impl RiskService for HttpRiskModel {
    #[instrument(skip_all, fields(url = %self.endpoint.url, len = text.len()))]
    async fn assess_risk(&self, text: &str) -> Result<RiskAssessment> {
        let mut assessment: RiskAssessment = self.endpoint.predict(text).await?;
        assessment.confidence = check_confidence(&self.endpoint.url, assessment.confidence)?;
        debug!(
            label = %assessment.label,
            confidence = assessment.confidence,
            features = assessment.top_features.as_ref().map_or(0, Vec::len),
            "clause risk assessed"
        );
        Ok(assessment)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CLAUSE: &str = "4. Assignment. Either party may assign this Agreement.";

    fn timeout() -> Duration {
        Duration::from_secs(5)
    }

    #[tokio::test]
    async fn classifier_posts_text_and_decodes_label() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/classify"))
            .and(body_json(json!({ "text": CLAUSE })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "label": "Assignment", "confidence": 0.91 })),
            )
            .mount(&server)
            .await;

        let classifier =
            HttpClassifier::new(&format!("{}/classify", server.uri()), timeout()).unwrap();
        let result = classifier.classify(CLAUSE).await.unwrap();

        assert_eq!(result.label, "Assignment");
        assert_eq!(result.confidence, 0.91);
    }

    #[tokio::test]
    async fn server_error_is_service_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/classify"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let classifier =
            HttpClassifier::new(&format!("{}/classify", server.uri()), timeout()).unwrap();
        let err = classifier.classify(CLAUSE).await.unwrap_err();

        assert!(matches!(err, ClauseGuardError::ServiceUnavailable(_)));
        assert!(err.to_string().contains("model not loaded"));
    }

    #[tokio::test]
    async fn out_of_range_confidence_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/classify"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "label": "Payment", "confidence": 1.7 })),
            )
            .mount(&server)
            .await;

        let classifier =
            HttpClassifier::new(&format!("{}/classify", server.uri()), timeout()).unwrap();
        let err = classifier.classify(CLAUSE).await.unwrap_err();
        assert!(err.to_string().contains("outside [0, 1]"));
    }

    #[tokio::test]
    async fn risk_model_decodes_top_features() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/assess"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "label": "high",
                "confidence": 0.8,
                "top_features": [
                    { "token": "assignment", "contribution": 0.8 },
                    { "token": "xyz", "contribution": -0.3 }
                ]
            })))
            .mount(&server)
            .await;

        let model = HttpRiskModel::new(&format!("{}/assess", server.uri()), timeout()).unwrap();
        let result = model.assess_risk(CLAUSE).await.unwrap();

        assert_eq!(result.label, "high");
        let features = result.top_features.expect("features present");
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].token, "assignment");
        assert_eq!(features[1].contribution, -0.3);
    }

    #[tokio::test]
    async fn risk_model_without_explainer() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/assess"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "label": "low", "confidence": 0.66 })),
            )
            .mount(&server)
            .await;

        let model = HttpRiskModel::new(&format!("{}/assess", server.uri()), timeout()).unwrap();
        let result = model.assess_risk(CLAUSE).await.unwrap();
        assert!(result.top_features.is_none());
    }

    #[tokio::test]
    async fn slow_model_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/assess"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "label": "low", "confidence": 0.5 }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let model = HttpRiskModel::new(
            &format!("{}/assess", server.uri()),
            Duration::from_millis(50),
        )
        .unwrap();
        let err = model.assess_risk(CLAUSE).await.unwrap_err();
        assert!(matches!(err, ClauseGuardError::ServiceUnavailable(_)));
    }

    #[test]
    fn invalid_url_is_config_error() {
        let err = HttpClassifier::new("not a url", timeout()).unwrap_err();
        assert!(matches!(err, ClauseGuardError::Config { .. }));
    }
}
