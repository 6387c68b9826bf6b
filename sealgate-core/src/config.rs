//! Configuration system for sealgate.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> overrides.
//! Configuration is loaded from the user config directory (`config.toml`) and/or
//! `.sealgate/config.toml` in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::ContaminationLevel;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SealgateConfig {
    /// Contamination detector tuning.
    pub detector: DetectorConfig,
    /// Firewall policy.
    pub firewall: FirewallConfig,
    /// Continuous monitor batching.
    pub monitor: MonitorConfig,
    /// Tracing output.
    pub logging: LoggingConfig,
}

impl SealgateConfig {
    /// Reject settings the detector and firewall cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.detector;
        if !(d.confirmed_tolerance > 0.0 && d.likely_tolerance > 0.0) {
            return Err(ConfigError::Invalid(
                "detector tolerances must be positive".into(),
            ));
        }
        if d.confirmed_tolerance >= d.likely_tolerance {
            return Err(ConfigError::Invalid(format!(
                "confirmed_tolerance ({}) must be below likely_tolerance ({})",
                d.confirmed_tolerance, d.likely_tolerance
            )));
        }
        if d.batch_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "detector.batch_concurrency must be at least 1".into(),
            ));
        }
        if self.monitor.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "monitor.batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Contamination detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Relative difference below which a numeric literal is a confirmed match.
    pub confirmed_tolerance: f64,
    /// Relative difference below which a numeric literal is a likely match.
    pub likely_tolerance: f64,
    /// Numerics that never produce evidence.
    pub exempt_numerics: Vec<f64>,
    /// Additional word-level terms flagged as suspicious.
    pub extra_suspicious_terms: Vec<String>,
    /// Additional phrase-level patterns, compiled case-insensitively.
    pub custom_patterns: Vec<CustomPattern>,
    /// Maximum number of scanning tasks running at once in batch analysis.
    pub batch_concurrency: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            confirmed_tolerance: 1e-6,
            likely_tolerance: 1e-3,
            exempt_numerics: vec![-1.0, 0.0, 1.0],
            extra_suspicious_terms: Vec::new(),
            custom_patterns: Vec::new(),
            batch_concurrency: 4,
        }
    }
}

/// A user-supplied lexical pattern attached to a pattern family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPattern {
    /// Family name (e.g. `parameter_fitting`); unknown names form their own family.
    pub family: String,
    /// Regular expression source.
    pub pattern: String,
}

/// Firewall policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallConfig {
    /// Capabilities the theory-completion predicate must confirm before validation opens.
    pub required_capabilities: Vec<String>,
    /// Comparison keys approved for release during the validation phase.
    pub validation_ready_keys: Vec<String>,
    /// Minimum evidence level that is recorded as an alert.
    pub escalation_threshold: ContaminationLevel,
    /// Number of audit entries included in status reports.
    pub audit_tail: usize,
}

impl Default for FirewallConfig {
    fn default() -> Self {
        Self {
            required_capabilities: vec![
                "derivation_api".into(),
                "provenance_validator".into(),
                "contamination_detector".into(),
            ],
            validation_ready_keys: vec![
                "fine_structure_inverse".into(),
                "electron_mass_mev".into(),
                "muon_mass_mev".into(),
                "weinberg_angle".into(),
                "higgs_mass_gev".into(),
            ],
            escalation_threshold: ContaminationLevel::Likely,
            audit_tail: 10,
        }
    }
}

/// Continuous monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Maximum nodes scanned per batch.
    pub batch_size: usize,
    /// How long a partial batch waits for more nodes before it is scanned.
    pub flush_interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            batch_size: 64,
            flush_interval_ms: 250,
        }
    }
}

/// Tracing output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive for the stderr layer.
    pub level: String,
    /// Directory for daily-rolling JSON logs; disabled when unset.
    pub json_log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json_log_dir: None,
        }
    }
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `SEALGATE_`)
/// 3. Workspace-local config (`.sealgate/config.toml`)
/// 4. User config (`<config dir>/sealgate/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&SealgateConfig>,
) -> Result<SealgateConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(SealgateConfig::default()));

    if let Some(dirs) = directories::ProjectDirs::from("dev", "sealgate", "sealgate") {
        let user_config = dirs.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = ws.join(".sealgate").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // SEALGATE_FIREWALL__AUDIT_TAIL, SEALGATE_DETECTOR__LIKELY_TOLERANCE, ...
    figment = figment.merge(Env::prefixed("SEALGATE_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    let config: SealgateConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}
