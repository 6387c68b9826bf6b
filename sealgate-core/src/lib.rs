//! Sealgate Core: shared vocabulary for pure-derivation bookkeeping.
//!
//! - **Provenance:** [`DerivationNode`] records one claimed mathematical fact;
//!   [`ProvenanceTree`] checks that every claim bottoms out in axioms.
//! - **Severity vocabulary:** [`ContaminationLevel`] and [`AlertSeverity`],
//!   shared by the detector and the firewall.
//! - **Infrastructure:** layered configuration ([`config`]), tracing bootstrap
//!   ([`logging`]) and error types ([`error`]).

pub mod config;
pub mod error;
pub mod logging;
pub mod provenance;
pub mod types;

pub use config::{SealgateConfig, load_config};
pub use error::{ConfigError, CoreError, ProvenanceError};
pub use provenance::{AxiomPath, DerivationNode, NodeId, NodeKind, ProvenanceTree};
pub use types::{AlertSeverity, ContaminationLevel};
