//! Experimental firewall: phase gating in front of sealed reference data.
//!
//! All mutable state sits behind one `parking_lot::RwLock`. Every mutating
//! operation holds the write lock for its whole duration, so a read can never
//! be evaluated against a status that a concurrent critical alert is changing.
//!
//! Status transitions:
//!
//! ```text
//! Active ──critical alert──▶ Breached ──shutdown──▶ Disabled
//!    └─────────────shutdown─────────────────────────────┘
//! ```
//!
//! `Breached` and `Disabled` are only left through [`ExperimentalFirewall::reset`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sealgate_core::config::FirewallConfig;
use sealgate_core::{AlertSeverity, ProvenanceTree};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::alerts::{AlertLog, AlertOrigin, ContaminationAlert};
use crate::audit::{AuditAction, AuditEntry, AuditLog, AuditOutcome, AuditRecord, ChainVerification};
use crate::completion::TheoryCompletion;
use crate::dataset::{SealedDataset, default_datasets};
use crate::detector::ContaminationDetector;
use crate::error::FirewallError;
use crate::evidence::ContaminationEvidence;
use crate::status::FirewallSnapshot;

/// Firewall status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirewallStatus {
    Active,
    /// Reserved for serialized snapshots; no live transition enters it.
    Sealed,
    Breached,
    Disabled,
}

impl std::fmt::Display for FirewallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FirewallStatus::Active => write!(f, "ACTIVE"),
            FirewallStatus::Sealed => write!(f, "SEALED"),
            FirewallStatus::Breached => write!(f, "BREACHED"),
            FirewallStatus::Disabled => write!(f, "DISABLED"),
        }
    }
}

/// A curated reference value released during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub key: String,
    pub value: f64,
    pub uncertainty: f64,
    pub unit: String,
    pub sealed: bool,
}

/// Opaque grant for a dataset. Carries no values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token_id: String,
    pub dataset_id: String,
    pub requester: String,
    pub access_granted: bool,
    pub issued_at: DateTime<Utc>,
}

pub(crate) struct FirewallState {
    pub(crate) status: FirewallStatus,
    pub(crate) theory_phase: bool,
    pub(crate) validation_phase: bool,
    pub(crate) datasets: BTreeMap<String, SealedDataset>,
    /// Comparison key to the id of the dataset that provides it.
    pub(crate) key_index: HashMap<String, String>,
    pub(crate) validation_ready_keys: BTreeSet<String>,
    pub(crate) alerts: AlertLog,
    pub(crate) audit: AuditLog,
}

impl FirewallState {
    fn initial(config: &FirewallConfig, datasets: Vec<SealedDataset>) -> Self {
        let mut state = Self {
            status: FirewallStatus::Active,
            theory_phase: true,
            validation_phase: false,
            datasets: BTreeMap::new(),
            key_index: HashMap::new(),
            validation_ready_keys: config.validation_ready_keys.iter().cloned().collect(),
            alerts: AlertLog::new(),
            audit: AuditLog::new(),
        };
        for dataset in datasets {
            state.insert_dataset(dataset);
        }
        state
    }

    fn check_registration(&self, dataset: &SealedDataset) -> Result<(), FirewallError> {
        if self.datasets.contains_key(dataset.id()) {
            return Err(FirewallError::DatasetExists(dataset.id().to_string()));
        }
        for key in dataset.keys() {
            if let Some(owner) = self.key_index.get(&key) {
                return Err(FirewallError::KeyConflict {
                    key,
                    dataset: owner.clone(),
                });
            }
        }
        Ok(())
    }

    fn insert_dataset(&mut self, dataset: SealedDataset) {
        for key in dataset.keys() {
            self.key_index
                .entry(key)
                .or_insert_with(|| dataset.id().to_string());
        }
        self.datasets.insert(dataset.id().to_string(), dataset);
    }

    fn phase_name(&self) -> &'static str {
        if self.theory_phase {
            "theory"
        } else if self.validation_phase {
            "validation"
        } else {
            "none"
        }
    }

    fn audit(
        &mut self,
        action: AuditAction,
        target: &str,
        requester: Option<&str>,
        outcome: AuditOutcome,
    ) {
        let record = AuditRecord {
            timestamp: Utc::now(),
            action,
            target: target.to_string(),
            requester: requester.map(str::to_string),
            outcome,
            status: self.status,
            theory_phase: self.theory_phase,
            validation_phase: self.validation_phase,
        };
        self.audit.append(record);
    }

    /// Record an alert. A critical alert breaches an active firewall.
    /// Returns the alert id and the status before the alert.
    fn raise(
        &mut self,
        severity: AlertSeverity,
        origin: AlertOrigin,
        message: String,
        evidence_id: Option<String>,
    ) -> (String, FirewallStatus) {
        let previous = self.status;
        let id = self
            .alerts
            .raise(severity, origin, message.as_str(), evidence_id)
            .id
            .clone();

        if severity == AlertSeverity::Critical {
            tracing::error!(alert = %id, origin = %origin, "{}", message);
            if self.status == FirewallStatus::Active {
                self.status = FirewallStatus::Breached;
                tracing::error!(alert = %id, "Firewall breached");
            }
        } else {
            tracing::warn!(alert = %id, severity = %severity, origin = %origin, "{}", message);
        }
        (id, previous)
    }

    /// Audit a status change caused by an alert raised outside a gated read.
    fn audit_escalation(&mut self, target: &str, previous: FirewallStatus) {
        if self.status != previous {
            let outcome = AuditOutcome::Transition {
                from: previous.to_string().to_lowercase(),
                to: self.status.to_string().to_lowercase(),
            };
            self.audit(AuditAction::CriticalAlert, target, None, outcome);
        }
    }

    /// Shared phase gate for sealed reads. `Some(reason)` means denied.
    fn gate(&mut self, action: AuditAction, target: &str) -> Option<&'static str> {
        if self.theory_phase {
            self.raise(
                AlertSeverity::High,
                AlertOrigin::PhaseViolation,
                format!("{action} for '{target}' attempted during theory phase"),
                None,
            );
            return Some("theory phase active");
        }
        if self.status == FirewallStatus::Disabled {
            return Some("firewall disabled");
        }
        if !self.validation_phase {
            return Some("no phase active");
        }
        None
    }

    /// Check a dataset's seal; a failure raises a critical tamper alert.
    fn check_seal(&mut self, dataset_id: &str, target: &str) -> bool {
        let intact = self
            .datasets
            .get(dataset_id)
            .is_some_and(SealedDataset::verify_seal_integrity);
        if !intact {
            self.raise(
                AlertSeverity::Critical,
                AlertOrigin::SealTamper,
                format!("Dataset '{dataset_id}' failed seal verification on access to '{target}'"),
                None,
            );
        }
        intact
    }
}

/// Gatekeeper between pure derivation and sealed reference data.
pub struct ExperimentalFirewall {
    config: FirewallConfig,
    /// Construction-time catalogue, resealed on reset.
    seeds: Vec<SealedDataset>,
    state: RwLock<FirewallState>,
}

impl ExperimentalFirewall {
    /// Firewall over the default reference catalogue.
    pub fn new(config: FirewallConfig) -> Self {
        let seeds = default_datasets();
        let state = FirewallState::initial(&config, seeds.clone());
        tracing::info!(datasets = seeds.len(), "Experimental firewall initialized");
        Self {
            config,
            seeds,
            state: RwLock::new(state),
        }
    }

    /// Firewall over a caller-supplied catalogue. Dataset ids and comparison
    /// keys must be unique across the catalogue.
    pub fn with_datasets(
        config: FirewallConfig,
        datasets: Vec<SealedDataset>,
    ) -> Result<Self, FirewallError> {
        let mut state = FirewallState::initial(&config, Vec::new());
        for dataset in &datasets {
            state.check_registration(dataset)?;
            state.insert_dataset(dataset.clone());
        }
        tracing::info!(datasets = datasets.len(), "Experimental firewall initialized");
        Ok(Self {
            config,
            seeds: datasets,
            state: RwLock::new(state),
        })
    }

    pub fn config(&self) -> &FirewallConfig {
        &self.config
    }

    pub fn status(&self) -> FirewallStatus {
        self.state.read().status
    }

    pub fn theory_phase(&self) -> bool {
        self.state.read().theory_phase
    }

    pub fn validation_phase(&self) -> bool {
        self.state.read().validation_phase
    }

    // ── Phase transitions ────────────────────────────────────────────

    /// Enter the theory phase. Never fails.
    pub fn enable_theory_phase(&self) {
        let mut state = self.state.write();
        let from = state.phase_name();
        state.theory_phase = true;
        state.validation_phase = false;
        state.audit(
            AuditAction::EnableTheoryPhase,
            "theory",
            None,
            AuditOutcome::Transition {
                from: from.into(),
                to: "theory".into(),
            },
        );
        tracing::info!(from, "Theory phase enabled");
    }

    /// Enter the validation phase once `completion` confirms every required
    /// capability. On failure nothing changes except the audit log.
    pub fn enable_validation_phase(
        &self,
        completion: &dyn TheoryCompletion,
    ) -> Result<(), FirewallError> {
        let mut state = self.state.write();

        if state.status == FirewallStatus::Disabled {
            state.audit(
                AuditAction::EnableValidationPhase,
                "validation",
                None,
                AuditOutcome::denied("firewall disabled"),
            );
            tracing::warn!("Validation phase refused: firewall disabled");
            return Err(FirewallError::Disabled);
        }

        let missing = completion.missing(&self.config.required_capabilities);
        if !missing.is_empty() {
            state.audit(
                AuditAction::EnableValidationPhase,
                "validation",
                None,
                AuditOutcome::denied(format!("missing capabilities: {}", missing.join(", "))),
            );
            tracing::warn!(missing = ?missing, "Validation phase refused: theory incomplete");
            return Err(FirewallError::TheoryIncomplete { missing });
        }

        let from = state.phase_name();
        state.theory_phase = false;
        state.validation_phase = true;
        state.audit(
            AuditAction::EnableValidationPhase,
            "validation",
            None,
            AuditOutcome::Transition {
                from: from.into(),
                to: "validation".into(),
            },
        );
        tracing::info!(from, "Validation phase enabled");
        Ok(())
    }

    /// Unconditionally disable the firewall. Idempotent.
    pub fn emergency_shutdown(&self, reason: &str) {
        let mut state = self.state.write();
        let from = state.status;
        state.status = FirewallStatus::Disabled;
        state.theory_phase = false;
        state.validation_phase = false;
        state.audit(
            AuditAction::EmergencyShutdown,
            reason,
            None,
            AuditOutcome::Transition {
                from: from.to_string().to_lowercase(),
                to: "disabled".into(),
            },
        );
        tracing::error!(reason, "Emergency shutdown");
    }

    /// Return to the initial state with a freshly sealed copy of the
    /// construction-time catalogue. Alerts and audit log are emptied.
    pub fn reset(&self) {
        let fresh: Vec<SealedDataset> = self.seeds.iter().map(SealedDataset::reseal).collect();
        *self.state.write() = FirewallState::initial(&self.config, fresh);
        tracing::info!("Firewall reset");
    }

    // ── Gated reads ──────────────────────────────────────────────────

    /// Release the curated reference value for `key`.
    ///
    /// Returns `Some` only in the validation phase, for an allow-listed key
    /// whose dataset passes its seal check. Each call writes one audit entry.
    pub fn get_sealed_comparison(&self, key: &str) -> Option<ComparisonRecord> {
        let mut state = self.state.write();
        let action = AuditAction::SealedComparison;

        if let Some(reason) = state.gate(action, key) {
            state.audit(action, key, None, AuditOutcome::denied(reason));
            tracing::warn!(key, reason, "Sealed comparison denied");
            return None;
        }

        if !state.validation_ready_keys.contains(key) {
            state.audit(action, key, None, AuditOutcome::denied("key not approved"));
            tracing::warn!(key, "Sealed comparison denied: key not approved");
            return None;
        }

        let Some(dataset_id) = state.key_index.get(key).cloned() else {
            state.audit(action, key, None, AuditOutcome::denied("no dataset provides key"));
            tracing::warn!(key, "Sealed comparison denied: no dataset provides key");
            return None;
        };

        if !state.check_seal(&dataset_id, key) {
            state.audit(action, key, None, AuditOutcome::denied("seal integrity failure"));
            return None;
        }

        let stamp = Utc::now().to_rfc3339();
        let reference = state.datasets.get_mut(&dataset_id).and_then(|dataset| {
            let reference = dataset.reference_value(key)?;
            dataset.record_access(format!("comparison:{key}@{stamp}"));
            Some(reference)
        });
        let Some(reference) = reference else {
            state.audit(action, key, None, AuditOutcome::denied("malformed reference entry"));
            tracing::warn!(key, dataset = %dataset_id, "Sealed comparison denied: malformed entry");
            return None;
        };

        state.audit(action, key, None, AuditOutcome::Granted);
        tracing::info!(key, dataset = %dataset_id, "Sealed comparison released");
        Some(ComparisonRecord {
            key: key.to_string(),
            value: reference.value,
            uncertainty: reference.uncertainty,
            unit: reference.unit,
            sealed: true,
        })
    }

    /// Grant an opaque access token for a whole dataset.
    ///
    /// Gated on phase, dataset existence and seal integrity; the key
    /// allow-list is not consulted.
    pub fn request_experimental_data(
        &self,
        dataset_id: &str,
        requester: &str,
    ) -> Option<AccessToken> {
        let mut state = self.state.write();
        let action = AuditAction::DataRequest;

        if let Some(reason) = state.gate(action, dataset_id) {
            state.audit(action, dataset_id, Some(requester), AuditOutcome::denied(reason));
            tracing::warn!(dataset = dataset_id, requester, reason, "Data request denied");
            return None;
        }

        if !state.datasets.contains_key(dataset_id) {
            state.audit(
                action,
                dataset_id,
                Some(requester),
                AuditOutcome::denied("unknown dataset"),
            );
            tracing::warn!(dataset = dataset_id, requester, "Data request denied: unknown dataset");
            return None;
        }

        if !state.check_seal(dataset_id, dataset_id) {
            state.audit(
                action,
                dataset_id,
                Some(requester),
                AuditOutcome::denied("seal integrity failure"),
            );
            return None;
        }

        let issued_at = Utc::now();
        if let Some(dataset) = state.datasets.get_mut(dataset_id) {
            dataset.record_access(format!("{requester}@{}", issued_at.to_rfc3339()));
        }
        state.audit(action, dataset_id, Some(requester), AuditOutcome::Granted);
        tracing::info!(dataset = dataset_id, requester, "Data access granted");

        Some(AccessToken {
            token_id: Uuid::new_v4().to_string(),
            dataset_id: dataset_id.to_string(),
            requester: requester.to_string(),
            access_granted: true,
            issued_at,
        })
    }

    // ── Allow-list and catalogue ─────────────────────────────────────

    /// Allow `key` to be released during validation. The key must be
    /// provided by a registered dataset.
    pub fn approve_validation_key(&self, key: &str) -> Result<(), FirewallError> {
        let mut state = self.state.write();
        if !state.key_index.contains_key(key) {
            return Err(FirewallError::UnknownKey(key.to_string()));
        }
        state.validation_ready_keys.insert(key.to_string());
        state.audit(AuditAction::ApproveKey, key, None, AuditOutcome::Recorded);
        tracing::info!(key, "Validation key approved");
        Ok(())
    }

    /// Remove `key` from the allow-list. Returns whether it was present.
    pub fn revoke_validation_key(&self, key: &str) -> bool {
        let mut state = self.state.write();
        let removed = state.validation_ready_keys.remove(key);
        if removed {
            state.audit(AuditAction::RevokeKey, key, None, AuditOutcome::Recorded);
            tracing::info!(key, "Validation key revoked");
        }
        removed
    }

    /// Add a dataset. Not kept across [`Self::reset`].
    pub fn register_dataset(&self, dataset: SealedDataset) -> Result<(), FirewallError> {
        let mut state = self.state.write();
        state.check_registration(&dataset)?;
        let id = dataset.id().to_string();
        state.insert_dataset(dataset);
        state.audit(AuditAction::RegisterDataset, &id, None, AuditOutcome::Recorded);
        tracing::info!(dataset = %id, "Dataset registered");
        Ok(())
    }

    // ── Alerts and evidence ──────────────────────────────────────────

    /// Raise an alert on behalf of a caller. Returns the alert id.
    pub fn raise_alert(&self, severity: AlertSeverity, message: &str) -> String {
        let mut state = self.state.write();
        let (id, previous) = state.raise(severity, AlertOrigin::External, message.to_string(), None);
        state.audit_escalation(&id, previous);
        id
    }

    /// Turn evidence at or above the escalation threshold into alerts.
    /// Only `Critical` evidence breaches. Returns the number of alerts raised.
    pub fn ingest_evidence(&self, evidence: &[ContaminationEvidence]) -> usize {
        let threshold = self.config.escalation_threshold;
        let mut state = self.state.write();
        let mut raised = 0;

        for ev in evidence.iter().filter(|e| e.level >= threshold) {
            let Some(severity) = AlertSeverity::from_level(ev.level) else {
                continue;
            };
            let (_, previous) = state.raise(
                severity,
                AlertOrigin::Evidence,
                format!("{} {} evidence at {}: {}", ev.level, ev.source, ev.location, ev.description),
                Some(ev.id.clone()),
            );
            state.audit_escalation(&ev.location, previous);
            raised += 1;
        }
        raised
    }

    /// Analyze a provenance tree and ingest the findings.
    pub fn screen_tree(
        &self,
        detector: &ContaminationDetector,
        tree: &ProvenanceTree,
    ) -> Vec<ContaminationEvidence> {
        let evidence = detector.analyze_tree(tree);
        self.ingest_evidence(&evidence);
        evidence
    }

    // ── Inspection ───────────────────────────────────────────────────

    pub fn alerts(&self) -> Vec<ContaminationAlert> {
        self.state.read().alerts.all().to_vec()
    }

    pub fn audit_log(&self) -> Vec<AuditEntry> {
        self.state.read().audit.entries().to_vec()
    }

    pub fn audit_len(&self) -> usize {
        self.state.read().audit.len()
    }

    pub fn verify_audit_chain(&self) -> ChainVerification {
        self.state.read().audit.verify()
    }

    pub fn dataset_ids(&self) -> Vec<String> {
        self.state.read().datasets.keys().cloned().collect()
    }

    /// Seal verdict per dataset.
    pub fn dataset_integrity(&self) -> BTreeMap<String, bool> {
        self.state
            .read()
            .datasets
            .iter()
            .map(|(id, d)| (id.clone(), d.verify_seal_integrity()))
            .collect()
    }

    pub fn dataset_access_log(&self, dataset_id: &str) -> Option<Vec<String>> {
        self.state
            .read()
            .datasets
            .get(dataset_id)
            .map(|d| d.access_log().to_vec())
    }

    pub fn validation_ready_keys(&self) -> Vec<String> {
        self.state.read().validation_ready_keys.iter().cloned().collect()
    }

    /// Point-in-time view for reporting.
    pub fn snapshot(&self) -> FirewallSnapshot {
        FirewallSnapshot::capture(&self.state.read(), self.config.audit_tail)
    }

    /// Text status report.
    pub fn status_report(&self) -> String {
        self.snapshot().render()
    }

    /// Overwrite a sealed value without resealing, as an out-of-band edit would.
    #[cfg(any(test, feature = "tamper-sim"))]
    pub fn simulate_tamper(&self, dataset_id: &str, key: &str, value: f64) -> Result<(), FirewallError> {
        let mut state = self.state.write();
        let dataset = state
            .datasets
            .get_mut(dataset_id)
            .ok_or_else(|| FirewallError::UnknownDataset(dataset_id.to_string()))?;
        dataset.tamper(key, value);
        tracing::warn!(dataset = dataset_id, key, "Simulated tamper applied");
        Ok(())
    }
}

impl Default for ExperimentalFirewall {
    fn default() -> Self {
        Self::new(FirewallConfig::default())
    }
}
