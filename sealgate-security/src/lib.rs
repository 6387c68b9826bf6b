//! # Sealgate Security
//!
//! Contamination detection and the experimental firewall that keeps sealed
//! reference data away from pure derivations.
//!
//! - [`ContaminationDetector`]: lexical, numerical, reasoning and contextual
//!   scanners plus a structural orphan check, with a parallel batch mode.
//! - [`SealedDataset`]: reference content with a recomputable SHA-256 seal.
//! - [`ExperimentalFirewall`]: theory/validation phase gating, alert
//!   escalation, allow-listed comparisons and a hash-chained audit log.
//! - [`ContinuousMonitor`]: background batch scanning that feeds the firewall.

pub mod alerts;
pub mod audit;
pub mod completion;
pub mod dataset;
pub mod detector;
pub mod error;
pub mod evidence;
pub mod firewall;
mod hashing;
pub mod monitor;
pub mod report;
pub mod status;

pub use alerts::{AlertLog, AlertOrigin, ContaminationAlert};
pub use audit::{AuditAction, AuditEntry, AuditOutcome, ChainVerification};
pub use completion::{CapabilitySet, TheoryCompletion};
pub use dataset::{ReferenceValue, SealedDataset, content_hash, default_datasets};
pub use detector::{BatchScanResult, ContaminationDetector};
pub use error::FirewallError;
pub use evidence::{ContaminationEvidence, EvidenceSource};
pub use firewall::{AccessToken, ComparisonRecord, ExperimentalFirewall, FirewallStatus};
pub use monitor::{ContinuousMonitor, MonitorHandle, MonitorStats};
pub use report::ContaminationReport;
pub use status::{DatasetSummary, FirewallSnapshot};
