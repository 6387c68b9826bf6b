//! Contamination report: counts by level and source, critical items, verdict.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};
use sealgate_core::ContaminationLevel;
use serde::{Deserialize, Serialize};

use crate::evidence::{ContaminationEvidence, EvidenceSource};

/// Summary of a set of contamination evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContaminationReport {
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub by_level: BTreeMap<ContaminationLevel, usize>,
    pub by_source: BTreeMap<EvidenceSource, usize>,
    /// Evidence at `Confirmed` or `Critical`.
    pub critical: Vec<ContaminationEvidence>,
    /// No critical evidence, and the tree (if any) verified pure.
    pub pure: bool,
}

impl ContaminationReport {
    /// Build a report. `tree_pure` is the provenance verdict when the evidence
    /// came from a tree; `None` for loose evidence.
    pub fn from_evidence(evidence: &[ContaminationEvidence], tree_pure: Option<bool>) -> Self {
        let mut by_level = BTreeMap::new();
        let mut by_source = BTreeMap::new();
        for ev in evidence {
            *by_level.entry(ev.level).or_insert(0) += 1;
            *by_source.entry(ev.source).or_insert(0) += 1;
        }
        let critical: Vec<ContaminationEvidence> =
            evidence.iter().filter(|e| e.is_critical()).cloned().collect();
        let pure = critical.is_empty() && tree_pure.unwrap_or(true);

        Self {
            generated_at: Utc::now(),
            total: evidence.len(),
            by_level,
            by_source,
            critical,
            pure,
        }
    }

    pub fn count_at(&self, level: ContaminationLevel) -> usize {
        self.by_level.get(&level).copied().unwrap_or(0)
    }

    /// Plain-text rendering.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "CONTAMINATION REPORT");
        let _ = writeln!(out, "Generated: {}", self.generated_at.to_rfc3339());
        let _ = writeln!(out);

        let _ = writeln!(out, "== Summary by level ==");
        for level in ContaminationLevel::ALL.iter().rev() {
            if *level == ContaminationLevel::None {
                continue;
            }
            let _ = writeln!(out, "  {:<11} {}", level.to_string(), self.count_at(*level));
        }
        let _ = writeln!(out, "  {:<11} {}", "TOTAL", self.total);
        let _ = writeln!(out);

        let _ = writeln!(out, "== By source ==");
        if self.by_source.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for (source, count) in &self.by_source {
            let _ = writeln!(out, "  {:<11} {}", source.to_string(), count);
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "== Critical items ==");
        if self.critical.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for ev in &self.critical {
            let _ = writeln!(
                out,
                "  [{}] {} @ {}: {}",
                ev.level, ev.source, ev.location, ev.description
            );
        }
        let _ = writeln!(out);

        let verdict = if self.pure { "PURE" } else { "CONTAMINATED" };
        let _ = writeln!(out, "== Verdict ==");
        let _ = writeln!(out, "  {verdict}");
        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
