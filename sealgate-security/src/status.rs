//! Firewall status snapshot and its text rendering.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};
use sealgate_core::AlertSeverity;
use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;
use crate::firewall::{FirewallState, FirewallStatus};

/// Seal summary for one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub content_hash: String,
    pub sealed_at: DateTime<Utc>,
    pub intact: bool,
    pub access_count: usize,
}

/// Point-in-time view of the firewall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirewallSnapshot {
    pub taken_at: DateTime<Utc>,
    pub status: FirewallStatus,
    pub theory_phase: bool,
    pub validation_phase: bool,
    pub datasets: BTreeMap<String, DatasetSummary>,
    pub validation_ready_keys: Vec<String>,
    pub alert_counts: BTreeMap<AlertSeverity, usize>,
    pub total_alerts: usize,
    pub audit_entries: usize,
    pub audit_chain_valid: bool,
    /// Most recent audit entries, oldest first.
    pub audit_tail: Vec<AuditEntry>,
}

impl FirewallSnapshot {
    pub(crate) fn capture(state: &FirewallState, audit_tail: usize) -> Self {
        let datasets = state
            .datasets
            .iter()
            .map(|(id, d)| {
                (
                    id.clone(),
                    DatasetSummary {
                        content_hash: d.content_hash().to_string(),
                        sealed_at: d.sealed_at(),
                        intact: d.verify_seal_integrity(),
                        access_count: d.access_log().len(),
                    },
                )
            })
            .collect();

        Self {
            taken_at: Utc::now(),
            status: state.status,
            theory_phase: state.theory_phase,
            validation_phase: state.validation_phase,
            datasets,
            validation_ready_keys: state.validation_ready_keys.iter().cloned().collect(),
            alert_counts: state.alerts.counts_by_severity(),
            total_alerts: state.alerts.len(),
            audit_entries: state.audit.len(),
            audit_chain_valid: state.audit.verify().is_valid,
            audit_tail: state.audit.tail(audit_tail).to_vec(),
        }
    }

    /// Ids of datasets whose seal no longer verifies.
    pub fn tampered(&self) -> Vec<&str> {
        self.datasets
            .iter()
            .filter(|(_, d)| !d.intact)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "EXPERIMENTAL FIREWALL STATUS");
        let _ = writeln!(out, "Taken: {}", self.taken_at.to_rfc3339());
        let _ = writeln!(out);

        let _ = writeln!(out, "Status: {}", self.status);
        let _ = writeln!(out, "Theory phase: {}", on_off(self.theory_phase));
        let _ = writeln!(out, "Validation phase: {}", on_off(self.validation_phase));
        let _ = writeln!(out);

        let tampered = self.tampered();
        let _ = writeln!(out, "== Datasets ({}) ==", self.datasets.len());
        for (id, d) in &self.datasets {
            let seal = if d.intact { "intact" } else { "TAMPERED" };
            let _ = writeln!(out, "  {id:<14} {seal:<9} accesses={}", d.access_count);
        }
        if tampered.is_empty() {
            let _ = writeln!(out, "  Seal integrity: all intact");
        } else {
            let _ = writeln!(out, "  Seal integrity: FAILED for {}", tampered.join(", "));
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "== Validation-ready keys ==");
        if self.validation_ready_keys.is_empty() {
            let _ = writeln!(out, "  (none)");
        } else {
            let _ = writeln!(out, "  {}", self.validation_ready_keys.join(", "));
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "== Alerts ({}) ==", self.total_alerts);
        for (severity, count) in self.alert_counts.iter().rev() {
            let _ = writeln!(out, "  {:<9} {}", severity.to_string(), count);
        }
        let _ = writeln!(out);

        let chain = if self.audit_chain_valid { "valid" } else { "BROKEN" };
        let _ = writeln!(
            out,
            "== Audit log (last {} of {}, chain {chain}) ==",
            self.audit_tail.len(),
            self.audit_entries
        );
        if self.audit_tail.is_empty() {
            let _ = writeln!(out, "  (empty)");
        }
        for entry in &self.audit_tail {
            let r = &entry.record;
            let requester = r
                .requester
                .as_deref()
                .map(|who| format!(" by {who}"))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  #{:<4} {} {} '{}'{requester}: {}",
                entry.sequence,
                r.timestamp.format("%H:%M:%S"),
                r.action,
                r.target,
                r.outcome
            );
        }
        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "ON" } else { "OFF" }
}
