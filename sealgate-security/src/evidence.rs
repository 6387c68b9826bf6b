//! Contamination evidence: the canonical output of every scanner.

use chrono::{DateTime, Utc};
use sealgate_core::ContaminationLevel;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which detection layer produced a piece of evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceSource {
    Lexical,
    Numerical,
    Reasoning,
    Contextual,
    /// Provenance-shape findings such as orphan claims.
    Structural,
}

impl std::fmt::Display for EvidenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvidenceSource::Lexical => write!(f, "lexical"),
            EvidenceSource::Numerical => write!(f, "numerical"),
            EvidenceSource::Reasoning => write!(f, "reasoning"),
            EvidenceSource::Contextual => write!(f, "contextual"),
            EvidenceSource::Structural => write!(f, "structural"),
        }
    }
}

/// A single finding that some input may have been influenced by empirical data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContaminationEvidence {
    pub id: String,
    pub source: EvidenceSource,
    pub level: ContaminationLevel,
    /// Where the finding was made, e.g. `node:alpha/expression`.
    pub location: String,
    pub description: String,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f64,
    pub mitigation_required: bool,
    /// Rule that fired, e.g. `lexical.parameter_fitting`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    pub detected_at: DateTime<Utc>,
}

impl ContaminationEvidence {
    /// Create evidence; mitigation is required for confirmed and critical findings.
    pub fn new(
        source: EvidenceSource,
        level: ContaminationLevel,
        location: impl Into<String>,
        description: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source,
            level,
            location: location.into(),
            description: description.into(),
            confidence: confidence.clamp(0.0, 1.0),
            mitigation_required: level.is_critical(),
            rule: None,
            detected_at: Utc::now(),
        }
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    pub fn is_critical(&self) -> bool {
        self.level.is_critical()
    }
}

/// Location string for a field of a derivation node.
pub(crate) fn node_location(node_id: &str, field: &str) -> String {
    format!("node:{node_id}/{field}")
}
