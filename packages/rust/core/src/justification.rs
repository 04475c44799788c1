//! Plain-language risk justifications from token contributions.

use clauseguard_services::FeatureContribution;

/// Sentence appended to every non-empty justification.
pub const REMEDIATION: &str = "Suggest clarifying or adding missing terms to reduce risk.";

/// Justification when the explainer returned no tokens.
pub const RISK_UNCLEAR: &str = "Clause risk is unclear from the text.";

/// Justification when the risk model has no explainer.
pub const EXPLAINABILITY_UNAVAILABLE: &str = "Explainability not available.";

/// Token → risk phrase. Tokens are matched case-insensitively.
const RISK_PHRASES: &[(&str, &str)] = &[
    ("assignment", "allows transfer of rights without restrictions"),
    ("ten", "contains ambiguous numeric thresholds"),
    ("business", "affects multiple business entities, increasing exposure"),
    ("party", "unclear responsibilities or obligations"),
    ("confidential", "lack of proper confidentiality clauses"),
];

fn risk_phrase(token: &str) -> Option<&'static str> {
    RISK_PHRASES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(token))
        .map(|(_, phrase)| *phrase)
}

/// Rank `features` by absolute contribution and keep the first `top_k`.
///
/// Ties keep their input order.
pub fn top_features(features: &[FeatureContribution], top_k: usize) -> Vec<&FeatureContribution> {
    let mut ranked: Vec<&FeatureContribution> = features.iter().collect();
    ranked.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
    ranked.truncate(top_k);
    ranked
}

/// Build the justification sentence for a clause's most influential tokens.
pub fn justify(features: &[FeatureContribution], top_k: usize) -> String {
    let parts: Vec<String> = top_features(features, top_k)
        .into_iter()
        .map(|feature| {
            let direction = if feature.contribution > 0.0 {
                "increases"
            } else {
                "reduces"
            };
            match risk_phrase(&feature.token) {
                Some(phrase) => format!("{phrase} ({direction} risk)"),
                None => format!("'{}' ({direction} risk)", feature.token),
            }
        })
        .collect();

    if parts.is_empty() {
        return RISK_UNCLEAR.to_string();
    }

    format!("{} {REMEDIATION}", parts.join(" "))
}
