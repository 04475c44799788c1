//! Regulatory gap detection for contract text.
//!
//! Each [`Regime`] is registered with a set of trigger keywords, a canonical
//! clause-name phrase, and the template appended when the clause is missing.
//! Detection is a case-insensitive substring scan: deterministic and easy to
//! explain, not a classifier.

mod templates;

use tracing::debug;

use clauseguard_shared::{MissingRequirement, Regime};

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Detection rule and mandatory template for one regime.
#[derive(Debug)]
pub struct RegimeRule {
    pub regime: Regime,
    /// Name of the mandatory clause, e.g. `Data Privacy Protection Right`.
    pub requirement: &'static str,
    /// Lower-case triggers; any match means the regime is covered.
    pub keywords: &'static [&'static str],
    /// Lower-case clause name, checked in addition to `keywords`.
    pub canonical_phrase: &'static str,
    /// Clause text appended when the regime is missing.
    pub template: &'static str,
}

/// Registered regimes, in reporting order.
pub static REGISTRY: &[RegimeRule] = &[
    RegimeRule {
        regime: Regime::Hipaa,
        requirement: "Data Privacy Protection Right",
        keywords: &[
            "hipaa",
            "protected health information",
            "phi",
            "data privacy protection",
            "data privacy",
        ],
        canonical_phrase: "data privacy protection right",
        template: templates::HIPAA_DATA_PRIVACY,
    },
    RegimeRule {
        regime: Regime::Gdpr,
        requirement: "GDPR Data Protection Clause",
        keywords: &[
            "gdpr",
            "data subject",
            "data protection",
            "personal data",
            "data processing",
        ],
        canonical_phrase: "gdpr data protection clause",
        template: templates::GDPR_DATA_PROTECTION,
    },
];

/// Look up the registered rule for `regime`.
pub fn rule_for(regime: Regime) -> &'static RegimeRule {
    REGISTRY
        .iter()
        .find(|rule| rule.regime == regime)
        .unwrap_or_else(|| unreachable!("every Regime variant is registered"))
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Presence of one regime's language in a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegimePresence {
    pub regime: Regime,
    /// First trigger keyword found, if any.
    pub matched_keyword: Option<&'static str>,
    /// Whether the canonical clause name appears.
    pub canonical_phrase_found: bool,
}

impl RegimePresence {
    pub fn is_present(&self) -> bool {
        self.matched_keyword.is_some() || self.canonical_phrase_found
    }
}

/// Scan `full_text` for every registered regime.
pub fn detect_presence(full_text: &str) -> Vec<RegimePresence> {
    let lowered = full_text.to_lowercase();

    REGISTRY
        .iter()
        .map(|rule| RegimePresence {
            regime: rule.regime,
            matched_keyword: rule
                .keywords
                .iter()
                .copied()
                .find(|keyword| lowered.contains(keyword)),
            canonical_phrase_found: lowered.contains(rule.canonical_phrase),
        })
        .collect()
}

/// Mandatory clauses with neither a trigger keyword nor their canonical phrase.
pub fn detect_missing(full_text: &str) -> Vec<MissingRequirement> {
    detect_presence(full_text)
        .into_iter()
        .filter_map(|presence| {
            if presence.is_present() {
                debug!(
                    regime = %presence.regime,
                    keyword = presence.matched_keyword.unwrap_or("-"),
                    canonical = presence.canonical_phrase_found,
                    "regime present"
                );
                return None;
            }
            Some(MissingRequirement {
                regime: presence.regime,
                requirement: rule_for(presence.regime).requirement.to_string(),
            })
        })
        .collect()
}
