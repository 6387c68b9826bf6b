//! Contamination detector: four independent scanners plus a structural check.
//!
//! Every scanner is a total function from text or a node to evidence; none of
//! them share mutable state, so nodes can be scanned in parallel and merged.

pub mod constants;
pub mod contextual;
pub mod lexical;
pub mod numerical;
pub mod reasoning;

use std::sync::Arc;

use sealgate_core::config::DetectorConfig;
use sealgate_core::{ContaminationLevel, DerivationNode, ProvenanceTree};
use serde::{Deserialize, Serialize};

use crate::evidence::{ContaminationEvidence, EvidenceSource, node_location};
use crate::report::ContaminationReport;

pub use contextual::ContextualScanner;
pub use lexical::LexicalScanner;
pub use numerical::NumericalScanner;
pub use reasoning::ReasoningScanner;

const ORPHAN_CONFIDENCE: f64 = 0.9;

/// Outcome of a parallel batch scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchScanResult {
    /// Evidence in the order the nodes were submitted.
    pub evidence: Vec<ContaminationEvidence>,
    pub nodes_scanned: usize,
    /// Scan tasks that panicked or were cancelled.
    pub failed: usize,
    pub duration_ms: u64,
}

/// Runs the lexical, numerical, reasoning and contextual scanners.
pub struct ContaminationDetector {
    lexical: LexicalScanner,
    numerical: NumericalScanner,
    reasoning: ReasoningScanner,
    contextual: ContextualScanner,
    batch_concurrency: usize,
}

impl ContaminationDetector {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            lexical: LexicalScanner::new(config),
            numerical: NumericalScanner::new(config),
            reasoning: ReasoningScanner::new(),
            contextual: ContextualScanner,
            batch_concurrency: config.batch_concurrency.max(1),
        }
    }

    pub fn lexical(&self) -> &LexicalScanner {
        &self.lexical
    }

    pub fn numerical(&self) -> &NumericalScanner {
        &self.numerical
    }

    pub fn reasoning(&self) -> &ReasoningScanner {
        &self.reasoning
    }

    /// Lexical and numerical scan of free text.
    pub fn scan_text(&self, text: &str, location: &str) -> Vec<ContaminationEvidence> {
        let mut evidence = self.lexical.scan(text, location);
        evidence.extend(self.numerical.scan(text, location));
        evidence
    }

    /// All four scanners over one node.
    pub fn scan_node(&self, node: &DerivationNode) -> Vec<ContaminationEvidence> {
        let expression_loc = node_location(node.id(), "expression");
        let justification_loc = node_location(node.id(), "justification");

        let mut evidence = self.scan_text(node.expression(), &expression_loc);
        evidence.extend(self.scan_text(node.justification(), &justification_loc));
        evidence.extend(self.reasoning.scan(node.justification(), &justification_loc));
        evidence.extend(self.contextual.scan(node, &self.lexical));

        if !evidence.is_empty() {
            tracing::debug!(
                node = node.id(),
                findings = evidence.len(),
                "Contamination evidence found"
            );
        }
        evidence
    }

    /// Scan every node in id order, then flag orphan claims.
    pub fn analyze_tree(&self, tree: &ProvenanceTree) -> Vec<ContaminationEvidence> {
        let mut evidence: Vec<ContaminationEvidence> = tree
            .node_ids()
            .into_iter()
            .filter_map(|id| tree.get(id))
            .flat_map(|node| self.scan_node(node))
            .collect();

        for orphan in tree.orphans() {
            evidence.push(
                ContaminationEvidence::new(
                    EvidenceSource::Structural,
                    ContaminationLevel::Confirmed,
                    node_location(orphan.id(), "dependencies"),
                    format!(
                        "Orphan claim: '{}' has no dependency path to an axiom",
                        orphan.id()
                    ),
                    ORPHAN_CONFIDENCE,
                )
                .with_rule("structural.orphan"),
            );
        }

        tracing::info!(
            nodes = tree.len(),
            findings = evidence.len(),
            pure = tree.is_pure(),
            "Provenance tree analyzed"
        );
        evidence
    }

    /// Analyze a tree and summarize the findings.
    pub fn report(&self, tree: &ProvenanceTree) -> ContaminationReport {
        let evidence = self.analyze_tree(tree);
        ContaminationReport::from_evidence(&evidence, Some(tree.is_pure()))
    }

    /// Scan nodes concurrently on the blocking pool, at most
    /// `batch_concurrency` at a time. Results keep submission order.
    pub async fn analyze_batch(self: &Arc<Self>, nodes: Vec<DerivationNode>) -> BatchScanResult {
        let start = std::time::Instant::now();
        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.batch_concurrency));
        let nodes_scanned = nodes.len();
        let mut handles = Vec::with_capacity(nodes_scanned);

        for node in nodes {
            let detector = Arc::clone(self);
            let sem = Arc::clone(&semaphore);
            handles.push(tokio::spawn(async move {
                let _permit = sem.acquire_owned().await.ok()?;
                tokio::task::spawn_blocking(move || detector.scan_node(&node))
                    .await
                    .ok()
            }));
        }

        let mut result = BatchScanResult {
            nodes_scanned,
            ..BatchScanResult::default()
        };
        for handle in handles {
            match handle.await {
                Ok(Some(evidence)) => result.evidence.extend(evidence),
                Ok(None) => result.failed += 1,
                Err(e) => {
                    tracing::warn!("Batch scan task failed: {}", e);
                    result.failed += 1;
                }
            }
        }
        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }
}

impl Default for ContaminationDetector {
    fn default() -> Self {
        Self::new(&DetectorConfig::default())
    }
}
