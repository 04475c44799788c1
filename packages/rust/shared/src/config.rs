//! Application configuration for ClauseGuard.
//!
//! User config lives at `~/.clauseguard/clauseguard.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClauseGuardError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "clauseguard.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".clauseguard";

// ---------------------------------------------------------------------------
// Config structs (matching clauseguard.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Per-clause analysis tuning.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Predictive service endpoints.
    #[serde(default)]
    pub services: ServicesConfig,

    /// Generated artifact storage.
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
}

/// `[analysis]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Maximum clauses analyzed concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Upper bound for a single predictive service call.
    #[serde(default = "default_service_timeout_ms")]
    pub service_timeout_ms: u64,

    /// Number of explainability features used for the justification.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            service_timeout_ms: default_service_timeout_ms(),
            top_k: default_top_k(),
        }
    }
}

fn default_concurrency() -> u32 {
    4
}
fn default_service_timeout_ms() -> u64 {
    10_000
}
fn default_top_k() -> usize {
    5
}

/// `[services]` section. A missing URL means the service is not loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Clause-type classification endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier_url: Option<String>,

    /// Risk assessment endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_url: Option<String>,
}

/// `[artifacts]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory holding generated documents.
    #[serde(default = "default_artifacts_dir")]
    pub dir: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: default_artifacts_dir(),
        }
    }
}

fn default_artifacts_dir() -> String {
    std::env::temp_dir()
        .join("clauseguard")
        .to_string_lossy()
        .into_owned()
}

// ---------------------------------------------------------------------------
// Analyzer options (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime options for the clause analyzer.
#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    /// Maximum concurrent per-clause analyses (at least 1).
    pub concurrency: usize,
    /// Timeout applied to each predictive service call.
    pub service_timeout: Duration,
    /// Number of explainability features kept.
    pub top_k: usize,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for AnalyzerOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            concurrency: (config.analysis.concurrency as usize).max(1),
            service_timeout: Duration::from_millis(config.analysis.service_timeout_ms),
            top_k: config.analysis.top_k,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.clauseguard/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ClauseGuardError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.clauseguard/clauseguard.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ClauseGuardError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ClauseGuardError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ClauseGuardError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ClauseGuardError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ClauseGuardError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that every configured service URL is an absolute http(s) URL.
pub fn validate_service_urls(config: &AppConfig) -> Result<()> {
    let endpoints = [
        ("classifier_url", config.services.classifier_url.as_deref()),
        ("risk_url", config.services.risk_url.as_deref()),
    ];

    for (key, value) in endpoints {
        let Some(raw) = value else { continue };
        let url = Url::parse(raw).map_err(|e| {
            ClauseGuardError::config(format!("services.{key} '{raw}' is not a valid URL: {e}"))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClauseGuardError::config(format!(
                "services.{key} must use http or https, got '{}'",
                url.scheme()
            )));
        }
    }

    Ok(())
}
