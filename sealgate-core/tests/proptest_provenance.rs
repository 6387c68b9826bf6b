//! Property-based tests for provenance purity using proptest.

use proptest::prelude::*;

use sealgate_core::provenance::{DerivationNode, NodeKind, ProvenanceTree};

/// Build a linear chain `n0 <- n1 <- ... <- n{len}` on top of an axiom `a`.
fn chain_on_axiom(len: usize) -> ProvenanceTree {
    let mut tree = ProvenanceTree::new(DerivationNode::axiom("a", "a = a"));
    let mut prev = "a".to_string();
    for i in 0..len {
        let id = format!("n{i}");
        tree.add_node(
            DerivationNode::new(id.clone(), format!("step {i}"), NodeKind::Lemma)
                .with_dependency(prev.clone()),
        )
        .unwrap();
        prev = id;
    }
    tree
}

proptest! {
    #[test]
    fn chains_on_an_axiom_are_pure(len in 0usize..30) {
        let tree = chain_on_axiom(len);
        prop_assert!(tree.is_pure());
        prop_assert!(tree.orphans().is_empty());
        if len > 0 {
            let last = format!("n{}", len - 1);
            let paths = tree.trace_to_axioms(&last);
            prop_assert_eq!(paths.len(), 1);
            prop_assert_eq!(paths[0].len(), len + 1);
            prop_assert_eq!(tree.depth(&last).unwrap(), Some(len));
        }
    }

    #[test]
    fn one_empirical_input_poisons_any_tree(len in 0usize..20, input in "[a-z_]{1,12}") {
        let mut tree = chain_on_axiom(len);
        prop_assert!(tree.is_pure());
        tree.add_node(
            DerivationNode::new("c", "c", NodeKind::Computation)
                .with_dependency("a")
                .with_empirical_input(input),
        )
        .unwrap();
        prop_assert!(!tree.is_pure());
    }

    #[test]
    fn chains_without_axiom_ancestor_are_impure(len in 1usize..20) {
        let mut tree = ProvenanceTree::new(DerivationNode::new("d", "d", NodeKind::Definition));
        let mut prev = "d".to_string();
        for i in 0..len {
            let id = format!("n{i}");
            tree.add_node(
                DerivationNode::new(id.clone(), "x", NodeKind::Theorem).with_dependency(prev.clone()),
            )
            .unwrap();
            prev = id;
        }
        prop_assert!(!tree.verify_complete_provenance());
        prop_assert_eq!(tree.orphans().len(), len + 1);
    }
}
