//! Firewall alerts: an append-only list with sequential ids.

use chrono::{DateTime, Utc};
use sealgate_core::AlertSeverity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What raised an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertOrigin {
    /// Sealed data requested in the wrong phase.
    PhaseViolation,
    /// A dataset failed its integrity check.
    SealTamper,
    /// Detector evidence at or above the escalation threshold.
    Evidence,
    /// Raised directly by a caller.
    External,
}

impl std::fmt::Display for AlertOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertOrigin::PhaseViolation => write!(f, "phase violation"),
            AlertOrigin::SealTamper => write!(f, "seal tamper"),
            AlertOrigin::Evidence => write!(f, "evidence"),
            AlertOrigin::External => write!(f, "external"),
        }
    }
}

/// A recorded alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContaminationAlert {
    /// Sequential id, e.g. `ALERT-0001`.
    pub id: String,
    pub severity: AlertSeverity,
    pub origin: AlertOrigin,
    pub message: String,
    pub raised_at: DateTime<Utc>,
    /// Evidence that triggered the alert, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_id: Option<String>,
}

impl ContaminationAlert {
    pub fn is_critical(&self) -> bool {
        self.severity == AlertSeverity::Critical
    }
}

/// Ordered alert store.
#[derive(Debug)]
pub struct AlertLog {
    alerts: Vec<ContaminationAlert>,
    next_id: usize,
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertLog {
    pub fn new() -> Self {
        Self {
            alerts: Vec::new(),
            next_id: 1,
        }
    }

    pub fn raise(
        &mut self,
        severity: AlertSeverity,
        origin: AlertOrigin,
        message: impl Into<String>,
        evidence_id: Option<String>,
    ) -> &ContaminationAlert {
        let id = format!("ALERT-{:04}", self.next_id);
        self.next_id += 1;

        self.alerts.push(ContaminationAlert {
            id,
            severity,
            origin,
            message: message.into(),
            raised_at: Utc::now(),
            evidence_id,
        });
        &self.alerts[self.alerts.len() - 1]
    }

    pub fn all(&self) -> &[ContaminationAlert] {
        &self.alerts
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Count per severity; every severity is present, zero if unused.
    pub fn counts_by_severity(&self) -> BTreeMap<AlertSeverity, usize> {
        let mut counts: BTreeMap<AlertSeverity, usize> =
            AlertSeverity::ALL.iter().map(|s| (*s, 0)).collect();
        for alert in &self.alerts {
            *counts.entry(alert.severity).or_insert(0) += 1;
        }
        counts
    }

    pub fn clear(&mut self) {
        self.alerts.clear();
        self.next_id = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let mut log = AlertLog::new();
        let first = log
            .raise(AlertSeverity::High, AlertOrigin::PhaseViolation, "a", None)
            .id
            .clone();
        let second = log
            .raise(AlertSeverity::Low, AlertOrigin::Evidence, "b", Some("ev-1".into()))
            .id
            .clone();
        assert_eq!(first, "ALERT-0001");
        assert_eq!(second, "ALERT-0002");
    }

    #[test]
    fn test_default_log_starts_at_one() {
        let mut log = AlertLog::default();
        let alert = log.raise(AlertSeverity::Critical, AlertOrigin::SealTamper, "x", None);
        assert_eq!(alert.id, "ALERT-0001");
        assert!(alert.is_critical());
    }

    #[test]
    fn test_counts_and_clear() {
        let mut log = AlertLog::new();
        log.raise(AlertSeverity::High, AlertOrigin::PhaseViolation, "a", None);
        log.raise(AlertSeverity::High, AlertOrigin::PhaseViolation, "b", None);
        log.raise(AlertSeverity::Critical, AlertOrigin::SealTamper, "c", None);
        let counts = log.counts_by_severity();
        assert_eq!(counts[&AlertSeverity::High], 2);
        assert_eq!(counts[&AlertSeverity::Critical], 1);
        assert_eq!(counts[&AlertSeverity::Low], 0);

        log.clear();
        assert!(log.is_empty());
        let alert = log.raise(AlertSeverity::Low, AlertOrigin::External, "d", None);
        assert_eq!(alert.id, "ALERT-0001");
    }
}
