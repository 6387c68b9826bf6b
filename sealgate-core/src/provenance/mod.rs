//! Provenance tracking for derivation steps.
//!
//! A [`ProvenanceTree`] records how a claim was derived and answers whether
//! every step bottoms out in axioms without declared empirical input. It makes
//! no contamination judgement beyond that; see the detector in
//! `sealgate-security` for text and numeric analysis.

mod node;
mod tree;

pub use node::{DerivationNode, NodeId, NodeKind};
pub use tree::{AxiomPath, ProvenanceTree};
