use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use sealgate_core::{DerivationNode, NodeKind, ProvenanceTree};
use sealgate_security::{ContaminationDetector, ExperimentalFirewall, SealedDataset};

fn bench_scanners(c: &mut Criterion) {
    let detector = ContaminationDetector::default();

    c.bench_function("scan_text_clean", |b| {
        b.iter(|| detector.scan_text(black_box("phi^2 = phi + 1, so phi^-1 = phi - 1"), "loc"))
    });

    c.bench_function("scan_text_contaminated", |b| {
        b.iter(|| {
            detector.scan_text(
                black_box("alpha^-1 = 137.035999084, fitted to the data with least squares"),
                "loc",
            )
        })
    });

    let long_input = "phi + 1 ".repeat(2000);
    c.bench_function("scan_text_long", |b| {
        b.iter(|| detector.scan_text(black_box(&long_input), "loc"))
    });

    let node = DerivationNode::new("g", "g = 4 pi phi^-3", NodeKind::Theorem)
        .with_dependency("phi")
        .with_justification("Follows from the cubic identity of phi")
        .with_assumption("phi is the positive root of x^2 - x - 1");
    c.bench_function("scan_node", |b| b.iter(|| detector.scan_node(black_box(&node))));
}

fn chain_tree(len: usize) -> ProvenanceTree {
    let mut tree = ProvenanceTree::new(
        DerivationNode::new("target", "final claim", NodeKind::Target)
            .with_dependency(format!("step{}", len - 1)),
    );
    let _ = tree.add_node(DerivationNode::axiom("phi", "phi^2 = phi + 1"));
    let mut previous = "phi".to_string();
    for i in 0..len {
        let id = format!("step{i}");
        let _ = tree.add_node(
            DerivationNode::new(id.clone(), format!("phi^{i} identity"), NodeKind::Lemma)
                .with_dependency(previous),
        );
        previous = id;
    }
    tree
}

fn bench_tree(c: &mut Criterion) {
    let detector = ContaminationDetector::default();
    let tree = chain_tree(200);

    c.bench_function("verify_complete_provenance_200", |b| {
        b.iter(|| black_box(&tree).verify_complete_provenance())
    });

    c.bench_function("analyze_tree_200", |b| {
        b.iter(|| detector.analyze_tree(black_box(&tree)))
    });
}

fn bench_firewall(c: &mut Criterion) {
    c.bench_function("dataset_seal_verify", |b| {
        let dataset = SealedDataset::seal(
            "bench",
            "bench dataset",
            "bench",
            serde_json::json!({ "x": { "value": 1.5, "uncertainty": 0.1, "unit": "1" } }),
        );
        b.iter(|| black_box(&dataset).verify_seal_integrity())
    });

    c.bench_function("sealed_comparison_denied_in_theory_phase", |b| {
        b.iter_batched(
            ExperimentalFirewall::default,
            |firewall| firewall.get_sealed_comparison(black_box("fine_structure_inverse")),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("audit_chain_verify_1000", |b| {
        let firewall = ExperimentalFirewall::default();
        for _ in 0..1000 {
            firewall.enable_theory_phase();
        }
        b.iter(|| black_box(&firewall).verify_audit_chain())
    });
}

criterion_group!(benches, bench_scanners, bench_tree, bench_firewall);
criterion_main!(benches);
