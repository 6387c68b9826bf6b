//! Provenance tree: the dependency graph of derivation steps under a target claim.
//!
//! Edges point from a node to each of its dependencies. Dependencies must be
//! present before a node is inserted, so the only way to form a cycle is via
//! the root, whose dependencies are allowed to arrive after it.

use petgraph::algo::dijkstra;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use super::node::{DerivationNode, NodeId};
use crate::error::ProvenanceError;

/// A chain of node ids from a claim down to an axiom (inclusive at both ends).
pub type AxiomPath = Vec<NodeId>;

/// Dependency graph of derivation steps rooted at a target claim.
#[derive(Debug, Clone)]
pub struct ProvenanceTree {
    root_id: NodeId,
    nodes: HashMap<NodeId, DerivationNode>,
    graph: DiGraph<NodeId, ()>,
    index: HashMap<NodeId, NodeIndex>,
    /// Cached purity verdict; reset on every insertion.
    purity: OnceLock<bool>,
}

impl ProvenanceTree {
    /// Create a tree anchored at `root`.
    ///
    /// The root is not dependency-checked: the target claim usually names
    /// dependencies that are added afterwards.
    pub fn new(root: DerivationNode) -> Self {
        let mut graph = DiGraph::new();
        let root_id = root.id().to_string();
        let root_idx = graph.add_node(root_id.clone());

        let mut tree = Self {
            root_id: root_id.clone(),
            nodes: HashMap::new(),
            graph,
            index: HashMap::from([(root_id.clone(), root_idx)]),
            purity: OnceLock::new(),
        };
        tree.nodes.insert(root_id, root);
        tree
    }

    /// Insert a node whose dependencies are all already present.
    pub fn add_node(&mut self, node: DerivationNode) -> Result<(), ProvenanceError> {
        if self.nodes.contains_key(node.id()) {
            return Err(ProvenanceError::DuplicateNode(node.id().to_string()));
        }
        if let Some(missing) = node
            .dependencies()
            .iter()
            .find(|dep| !self.nodes.contains_key(dep.as_str()))
        {
            return Err(ProvenanceError::UnknownDependency {
                node: node.id().to_string(),
                dependency: missing.clone(),
            });
        }

        let id = node.id().to_string();
        let idx = self.graph.add_node(id.clone());
        for dep in node.dependencies() {
            self.graph.add_edge(idx, self.index[dep.as_str()], ());
        }

        // Late-arriving dependency of the root.
        if self.root().dependencies().contains(&id) {
            let root_idx = self.index[self.root_id.as_str()];
            self.graph.add_edge(root_idx, idx, ());
        }

        self.index.insert(id.clone(), idx);
        self.nodes.insert(id, node);
        self.purity = OnceLock::new();

        tracing::debug!(node = %self.graph[idx], total = self.nodes.len(), "provenance node added");
        Ok(())
    }

    pub fn root(&self) -> &DerivationNode {
        &self.nodes[self.root_id.as_str()]
    }

    pub fn get(&self, id: &str) -> Option<&DerivationNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &DerivationNode> {
        self.nodes.values()
    }

    /// Node ids in sorted order.
    pub fn node_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Cached purity verdict. See [`Self::verify_complete_provenance`].
    pub fn is_pure(&self) -> bool {
        *self
            .purity
            .get_or_init(|| self.verify_complete_provenance())
    }

    /// Recompute purity from scratch.
    ///
    /// A tree is pure when no node declares empirical inputs, every declared
    /// dependency resolves, and every non-axiom node reaches an axiom.
    pub fn verify_complete_provenance(&self) -> bool {
        if self.nodes.values().any(DerivationNode::is_intrinsically_impure) {
            return false;
        }
        if !self.unresolved_dependencies().is_empty() {
            return false;
        }
        self.nodes
            .values()
            .filter(|n| !n.is_axiom())
            .all(|n| self.reaches_axiom(n.id()))
    }

    /// Enumerate every dependency path from `id` down to an axiom.
    ///
    /// A path stops at the first axiom it meets. A branch that ends at a
    /// non-axiom leaf contributes nothing; an empty result marks an orphan
    /// claim. Unknown ids yield an empty result.
    pub fn trace_to_axioms(&self, id: &str) -> Vec<AxiomPath> {
        let Some(&start) = self.index.get(id) else {
            return Vec::new();
        };

        let mut paths = Vec::new();
        let mut current = Vec::new();
        let mut on_path = HashSet::new();
        self.walk(start, &mut current, &mut on_path, &mut paths);
        paths
    }

    /// Non-axiom nodes with no path to any axiom, sorted by id.
    pub fn orphans(&self) -> Vec<&DerivationNode> {
        let mut orphans: Vec<&DerivationNode> = self
            .nodes
            .values()
            .filter(|n| !n.is_axiom() && !self.reaches_axiom(n.id()))
            .collect();
        orphans.sort_by(|a, b| a.id().cmp(b.id()));
        orphans
    }

    /// Dependencies of the root that were never added.
    pub fn unresolved_dependencies(&self) -> Vec<&str> {
        self.root()
            .dependencies()
            .iter()
            .filter(|dep| !self.nodes.contains_key(dep.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Number of dependency hops from `id` to its nearest axiom.
    ///
    /// Returns `Ok(None)` for an orphan.
    pub fn depth(&self, id: &str) -> Result<Option<usize>, ProvenanceError> {
        let &start = self
            .index
            .get(id)
            .ok_or_else(|| ProvenanceError::UnknownNode(id.to_string()))?;

        let distances = dijkstra(&self.graph, start, None, |_| 1usize);
        Ok(distances
            .into_iter()
            .filter(|(idx, _)| self.nodes[self.graph[*idx].as_str()].is_axiom())
            .map(|(_, d)| d)
            .min())
    }

    fn reaches_axiom(&self, id: &str) -> bool {
        matches!(self.depth(id), Ok(Some(_)))
    }

    fn walk(
        &self,
        idx: NodeIndex,
        current: &mut Vec<NodeId>,
        on_path: &mut HashSet<NodeIndex>,
        paths: &mut Vec<AxiomPath>,
    ) {
        if !on_path.insert(idx) {
            return;
        }
        let id = &self.graph[idx];
        current.push(id.clone());

        if self.nodes[id.as_str()].is_axiom() {
            paths.push(current.clone());
        } else {
            let mut deps: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
            deps.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
            for dep in deps {
                self.walk(dep, current, on_path, paths);
            }
        }

        current.pop();
        on_path.remove(&idx);
    }
}
