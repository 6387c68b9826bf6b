//! A single derivation step.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifier of a derivation node.
pub type NodeId = String;

/// What kind of claim a node makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Axiom,
    Definition,
    Lemma,
    Theorem,
    Computation,
    Target,
    Empirical,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Axiom => write!(f, "axiom"),
            NodeKind::Definition => write!(f, "definition"),
            NodeKind::Lemma => write!(f, "lemma"),
            NodeKind::Theorem => write!(f, "theorem"),
            NodeKind::Computation => write!(f, "computation"),
            NodeKind::Target => write!(f, "target"),
            NodeKind::Empirical => write!(f, "empirical"),
        }
    }
}

/// One claimed mathematical fact and what it was derived from.
///
/// Fields are read-only once built; the `with_*` methods consume the node,
/// so a node cannot change after it has been handed to a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivationNode {
    id: NodeId,
    expression: String,
    kind: NodeKind,
    #[serde(default)]
    dependencies: BTreeSet<NodeId>,
    #[serde(default)]
    justification: String,
    #[serde(default)]
    empirical_inputs: Vec<String>,
    #[serde(default)]
    assumptions: Vec<String>,
}

impl DerivationNode {
    pub fn new(id: impl Into<NodeId>, expression: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            expression: expression.into(),
            kind,
            dependencies: BTreeSet::new(),
            justification: String::new(),
            empirical_inputs: Vec::new(),
            assumptions: Vec::new(),
        }
    }

    /// Shorthand for a dependency-free axiom.
    pub fn axiom(id: impl Into<NodeId>, expression: impl Into<String>) -> Self {
        Self::new(id, expression, NodeKind::Axiom)
    }

    pub fn with_dependency(mut self, id: impl Into<NodeId>) -> Self {
        self.dependencies.insert(id.into());
        self
    }

    pub fn with_dependencies<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        self.dependencies.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_justification(mut self, justification: impl Into<String>) -> Self {
        self.justification = justification.into();
        self
    }

    pub fn with_empirical_input(mut self, input: impl Into<String>) -> Self {
        self.empirical_inputs.push(input.into());
        self
    }

    pub fn with_assumption(mut self, assumption: impl Into<String>) -> Self {
        self.assumptions.push(assumption.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn dependencies(&self) -> &BTreeSet<NodeId> {
        &self.dependencies
    }

    pub fn justification(&self) -> &str {
        &self.justification
    }

    pub fn empirical_inputs(&self) -> &[String] {
        &self.empirical_inputs
    }

    pub fn assumptions(&self) -> &[String] {
        &self.assumptions
    }

    pub fn is_axiom(&self) -> bool {
        self.kind == NodeKind::Axiom
    }

    /// A node that declares empirical inputs is impure regardless of its ancestry.
    pub fn is_intrinsically_impure(&self) -> bool {
        !self.empirical_inputs.is_empty()
    }
}
