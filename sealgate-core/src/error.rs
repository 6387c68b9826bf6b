//! Error types for the sealgate core.
//!
//! Uses `thiserror` for public API error types. Provenance errors are
//! construction failures: they are raised eagerly and never repaired.

/// Top-level error type for the core library.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Provenance error: {0}")]
    Provenance(#[from] ProvenanceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging setup error: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from building a provenance tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProvenanceError {
    #[error("node '{node}' depends on unknown node '{dependency}'")]
    UnknownDependency { node: String, dependency: String },

    #[error("node '{0}' is already present in the tree")]
    DuplicateNode(String),

    #[error("node '{0}' not found in the tree")]
    UnknownNode(String),
}

/// Errors from configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
