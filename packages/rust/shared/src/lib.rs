//! Shared types, error model, and configuration for ClauseGuard.
//!
//! This crate is the foundation depended on by all other ClauseGuard crates.
//! It provides:
//! - [`ClauseGuardError`], the unified error type
//! - Report types ([`AnalysisReport`], [`ClauseRecord`], [`MissingRequirement`], [`ArtifactRef`])
//! - Configuration ([`AppConfig`], [`AnalyzerOptions`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AnalysisConfig, AnalyzerOptions, AppConfig, ArtifactsConfig, ServicesConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_service_urls,
};
pub use error::{ClauseGuardError, Result};
pub use types::{
    AnalysisReport, ArtifactRef, ClassificationOutcome, ClauseRecord, ErrorBody,
    MissingRequirement, RISK_MODEL_UNAVAILABLE, Regime, ReportSummary, RiskOutcome,
    UNCLASSIFIED_LABEL, UNKNOWN_RISK_LABEL,
};
