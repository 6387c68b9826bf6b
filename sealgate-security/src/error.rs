//! Error types for the firewall and detector layer.
//!
//! Denied reads are not errors: gating returns `None` and writes an audit
//! entry. Only precondition and registration failures surface here.

/// Errors from firewall operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FirewallError {
    #[error("theory is incomplete; missing capabilities: {}", missing.join(", "))]
    TheoryIncomplete { missing: Vec<String> },

    #[error("firewall is disabled")]
    Disabled,

    #[error("unknown dataset '{0}'")]
    UnknownDataset(String),

    #[error("unknown comparison key '{0}'")]
    UnknownKey(String),

    #[error("dataset '{0}' is already registered")]
    DatasetExists(String),

    #[error("comparison key '{key}' is already provided by dataset '{dataset}'")]
    KeyConflict { key: String, dataset: String },
}
