//! Severity vocabulary shared by the contamination detector and the firewall.

use serde::{Deserialize, Serialize};

/// How strongly a finding indicates empirical leakage into a derivation.
///
/// Ordered from harmless to fatal so thresholds can be compared directly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ContaminationLevel {
    #[default]
    None,
    Suspicious,
    Likely,
    Confirmed,
    Critical,
}

impl ContaminationLevel {
    /// All levels, lowest first.
    pub const ALL: [ContaminationLevel; 5] = [
        ContaminationLevel::None,
        ContaminationLevel::Suspicious,
        ContaminationLevel::Likely,
        ContaminationLevel::Confirmed,
        ContaminationLevel::Critical,
    ];

    /// `Confirmed` and `Critical` findings demand attention.
    pub fn is_critical(self) -> bool {
        matches!(self, ContaminationLevel::Confirmed | ContaminationLevel::Critical)
    }
}

impl std::fmt::Display for ContaminationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContaminationLevel::None => write!(f, "NONE"),
            ContaminationLevel::Suspicious => write!(f, "SUSPICIOUS"),
            ContaminationLevel::Likely => write!(f, "LIKELY"),
            ContaminationLevel::Confirmed => write!(f, "CONFIRMED"),
            ContaminationLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Severity of a firewall alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    /// All severities, lowest first.
    pub const ALL: [AlertSeverity; 4] = [
        AlertSeverity::Low,
        AlertSeverity::Medium,
        AlertSeverity::High,
        AlertSeverity::Critical,
    ];

    /// Map a contamination level onto the alert scale.
    ///
    /// `None` has no alert counterpart.
    pub fn from_level(level: ContaminationLevel) -> Option<Self> {
        match level {
            ContaminationLevel::None => None,
            ContaminationLevel::Suspicious => Some(AlertSeverity::Low),
            ContaminationLevel::Likely => Some(AlertSeverity::Medium),
            ContaminationLevel::Confirmed => Some(AlertSeverity::High),
            ContaminationLevel::Critical => Some(AlertSeverity::Critical),
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Low => write!(f, "LOW"),
            AlertSeverity::Medium => write!(f, "MEDIUM"),
            AlertSeverity::High => write!(f, "HIGH"),
            AlertSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
