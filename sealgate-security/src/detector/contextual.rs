//! Contextual scanner: what a node declares about itself.

use sealgate_core::{ContaminationLevel, DerivationNode, NodeKind};

use super::lexical::LexicalScanner;
use crate::evidence::{ContaminationEvidence, EvidenceSource, node_location};

const EMPIRICAL_KIND_CONFIDENCE: f64 = 0.9;

/// Reads declared empirical inputs, node kind and assumptions.
///
/// Declared inputs are an admission, not an inference, so they are always
/// `Critical`. Assumptions are rescanned lexically and re-attributed here.
pub struct ContextualScanner;

impl ContextualScanner {
    pub fn scan(&self, node: &DerivationNode, lexical: &LexicalScanner) -> Vec<ContaminationEvidence> {
        let mut evidence = Vec::new();

        if node.is_intrinsically_impure() {
            evidence.push(
                ContaminationEvidence::new(
                    EvidenceSource::Contextual,
                    ContaminationLevel::Critical,
                    node_location(node.id(), "empirical_inputs"),
                    format!(
                        "Node declares empirical inputs: {}",
                        node.empirical_inputs().join(", ")
                    ),
                    1.0,
                )
                .with_rule("contextual.empirical_inputs"),
            );
        }

        if node.kind() == NodeKind::Empirical {
            evidence.push(
                ContaminationEvidence::new(
                    EvidenceSource::Contextual,
                    ContaminationLevel::Confirmed,
                    node_location(node.id(), "kind"),
                    "Node is of kind empirical",
                    EMPIRICAL_KIND_CONFIDENCE,
                )
                .with_rule("contextual.empirical_kind"),
            );
        }

        for (i, assumption) in node.assumptions().iter().enumerate() {
            let location = node_location(node.id(), &format!("assumption[{i}]"));
            evidence.extend(lexical.scan(assumption, &location).into_iter().map(|mut ev| {
                ev.source = EvidenceSource::Contextual;
                ev
            }));
        }

        evidence
    }
}
