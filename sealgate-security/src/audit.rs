//! Tamper-evident firewall audit log.
//!
//! Every entry hashes its record and chains that hash with the previous
//! entry's chain hash, so editing, dropping or reordering entries after the
//! fact is detectable with [`AuditLog::verify`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::firewall::FirewallStatus;
use crate::hashing::hex_sha256;

/// Operation that produced an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    EnableTheoryPhase,
    EnableValidationPhase,
    SealedComparison,
    DataRequest,
    EmergencyShutdown,
    ApproveKey,
    RevokeKey,
    RegisterDataset,
    CriticalAlert,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AuditAction::EnableTheoryPhase => "enable_theory_phase",
            AuditAction::EnableValidationPhase => "enable_validation_phase",
            AuditAction::SealedComparison => "sealed_comparison",
            AuditAction::DataRequest => "data_request",
            AuditAction::EmergencyShutdown => "emergency_shutdown",
            AuditAction::ApproveKey => "approve_key",
            AuditAction::RevokeKey => "revoke_key",
            AuditAction::RegisterDataset => "register_dataset",
            AuditAction::CriticalAlert => "critical_alert",
        };
        write!(f, "{name}")
    }
}

/// Result of an audited operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditOutcome {
    Granted,
    Denied { reason: String },
    Transition { from: String, to: String },
    Recorded,
}

impl AuditOutcome {
    pub fn denied(reason: impl Into<String>) -> Self {
        AuditOutcome::Denied {
            reason: reason.into(),
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, AuditOutcome::Granted)
    }
}

impl std::fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditOutcome::Granted => write!(f, "granted"),
            AuditOutcome::Denied { reason } => write!(f, "denied ({reason})"),
            AuditOutcome::Transition { from, to } => write!(f, "{from} -> {to}"),
            AuditOutcome::Recorded => write!(f, "recorded"),
        }
    }
}

/// The hashed payload of an audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    /// Key, dataset id or shutdown reason the action applied to.
    pub target: String,
    pub requester: Option<String>,
    pub outcome: AuditOutcome,
    /// Firewall status after the action.
    pub status: FirewallStatus,
    pub theory_phase: bool,
    pub validation_phase: bool,
}

/// One link of the audit chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub sequence: u64,
    #[serde(flatten)]
    pub record: AuditRecord,
    pub event_hash: String,
    /// Chain hash of the previous entry (all zeros for the first).
    pub previous_hash: String,
    pub chain_hash: String,
}

/// Result of verifying the audit chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainVerification {
    pub is_valid: bool,
    pub checked: usize,
    pub first_invalid: Option<u64>,
}

/// Append-only hash-chained log.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: AuditRecord) -> &AuditEntry {
        let sequence = self.entries.len() as u64;
        let event_hash = hex_sha256(&record_bytes(&record));
        let previous_hash = self
            .entries
            .last()
            .map(|e| e.chain_hash.clone())
            .unwrap_or_else(genesis_hash);
        let chain_hash = compute_chain_hash(sequence, &event_hash, &previous_hash);

        self.entries.push(AuditEntry {
            sequence,
            record,
            event_hash,
            previous_hash,
            chain_hash,
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The last `n` entries, oldest first.
    pub fn tail(&self, n: usize) -> &[AuditEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Recompute every event hash and chain link.
    pub fn verify(&self) -> ChainVerification {
        let mut expected_previous = genesis_hash();
        for (i, entry) in self.entries.iter().enumerate() {
            let event_hash = hex_sha256(&record_bytes(&entry.record));
            let valid = entry.sequence == i as u64
                && entry.event_hash == event_hash
                && entry.previous_hash == expected_previous
                && entry.chain_hash
                    == compute_chain_hash(entry.sequence, &entry.event_hash, &entry.previous_hash);
            if !valid {
                return ChainVerification {
                    is_valid: false,
                    checked: i + 1,
                    first_invalid: Some(i as u64),
                };
            }
            expected_previous = entry.chain_hash.clone();
        }
        ChainVerification {
            is_valid: true,
            checked: self.entries.len(),
            first_invalid: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn entries_mut(&mut self) -> &mut Vec<AuditEntry> {
        &mut self.entries
    }
}

fn genesis_hash() -> String {
    "0".repeat(64)
}

fn record_bytes(record: &AuditRecord) -> Vec<u8> {
    match serde_json::to_vec(record) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to serialize audit record: {}", e);
            format!("{record:?}").into_bytes()
        }
    }
}

/// SHA-256(sequence || event_hash || previous_hash).
fn compute_chain_hash(sequence: u64, event_hash: &str, previous_hash: &str) -> String {
    let mut bytes = sequence.to_le_bytes().to_vec();
    bytes.extend_from_slice(event_hash.as_bytes());
    bytes.extend_from_slice(previous_hash.as_bytes());
    hex_sha256(&bytes)
}
