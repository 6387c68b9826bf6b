//! Firewall lifecycle integration tests: phase gating, escalation, shutdown,
//! reset and the audit trail.

use std::sync::Arc;

use sealgate_core::config::FirewallConfig;
use sealgate_core::{AlertSeverity, ContaminationLevel, DerivationNode, NodeKind, ProvenanceTree};
use sealgate_security::{
    AlertOrigin, AuditAction, AuditOutcome, CapabilitySet, ContaminationDetector,
    ContaminationEvidence, EvidenceSource, ExperimentalFirewall, FirewallError, FirewallStatus,
    SealedDataset,
};

fn complete() -> CapabilitySet {
    ["derivation_api", "provenance_validator", "contamination_detector"]
        .into_iter()
        .collect()
}

fn validating() -> ExperimentalFirewall {
    let fw = ExperimentalFirewall::default();
    fw.enable_validation_phase(&complete()).unwrap();
    fw
}

fn evidence(level: ContaminationLevel) -> ContaminationEvidence {
    ContaminationEvidence::new(
        EvidenceSource::Lexical,
        level,
        "node:x/expression",
        "test finding",
        0.5,
    )
}

#[test]
fn theory_phase_denies_every_key_and_alerts_once_per_call() {
    let fw = ExperimentalFirewall::default();
    let keys = [
        "fine_structure_inverse",
        "muon_mass_mev",
        "not_a_key",
        "",
    ];
    for (i, key) in keys.iter().enumerate() {
        assert!(fw.get_sealed_comparison(key).is_none());
        let alerts = fw.alerts();
        assert_eq!(alerts.len(), i + 1);
        assert_eq!(alerts[i].severity, AlertSeverity::High);
        assert_eq!(alerts[i].origin, AlertOrigin::PhaseViolation);
    }
    assert_eq!(fw.audit_len(), keys.len());
    assert_eq!(fw.status(), FirewallStatus::Active);
}

#[test]
fn comparison_requires_phase_allow_list_and_intact_seal() {
    let fw = validating();

    let record = fw.get_sealed_comparison("muon_mass_mev").unwrap();
    assert_eq!(record.key, "muon_mass_mev");
    assert_eq!(record.value, 105.6583755);
    assert_eq!(record.unit, "MeV");
    assert!(record.sealed);

    // Present in the catalogue but not allow-listed.
    assert!(fw.get_sealed_comparison("omega_lambda").is_none());
    // Allow-listed only after approval.
    fw.approve_validation_key("omega_lambda").unwrap();
    assert!(fw.get_sealed_comparison("omega_lambda").is_some());

    // Back in theory phase the same key is denied.
    fw.enable_theory_phase();
    assert!(fw.get_sealed_comparison("omega_lambda").is_none());
}

#[test]
fn every_comparison_writes_exactly_one_audit_entry() {
    let fw = validating();
    let before = fw.audit_len();
    fw.get_sealed_comparison("fine_structure_inverse");
    fw.get_sealed_comparison("omega_lambda");
    fw.get_sealed_comparison("no_such_key");
    assert_eq!(fw.audit_len(), before + 3);

    let log = fw.audit_log();
    let outcomes: Vec<&AuditOutcome> = log[before..].iter().map(|e| &e.record.outcome).collect();
    assert!(outcomes[0].is_granted());
    assert_eq!(outcomes[1], &AuditOutcome::denied("key not approved"));
    assert_eq!(outcomes[2], &AuditOutcome::denied("key not approved"));
    assert!(fw.verify_audit_chain().is_valid);
}

#[test]
fn incomplete_theory_leaves_state_unchanged() {
    let fw = ExperimentalFirewall::default();
    let partial: CapabilitySet = ["derivation_api"].into_iter().collect();
    let err = fw.enable_validation_phase(&partial).unwrap_err();
    assert_eq!(
        err,
        FirewallError::TheoryIncomplete {
            missing: vec![
                "provenance_validator".to_string(),
                "contamination_detector".to_string()
            ]
        }
    );
    assert!(fw.theory_phase());
    assert!(!fw.validation_phase());
    assert_eq!(fw.status(), FirewallStatus::Active);

    let log = fw.audit_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].record.action, AuditAction::EnableValidationPhase);
    assert!(matches!(log[0].record.outcome, AuditOutcome::Denied { .. }));
}

#[test]
fn seal_tamper_breaches_and_breach_is_sticky() {
    let fw = validating();
    fw.simulate_tamper("codata_2018", "fine_structure_inverse", 137.036)
        .unwrap();
    assert!(!fw.dataset_integrity()["codata_2018"]);

    assert!(fw.get_sealed_comparison("fine_structure_inverse").is_none());
    assert_eq!(fw.status(), FirewallStatus::Breached);
    assert!(fw.alerts().iter().any(|a| a.origin == AlertOrigin::SealTamper));

    // Non-critical operations keep working but never clear the breach.
    fw.enable_theory_phase();
    fw.get_sealed_comparison("muon_mass_mev");
    fw.enable_validation_phase(&complete()).unwrap();
    assert!(fw.get_sealed_comparison("muon_mass_mev").is_some());
    fw.ingest_evidence(&[evidence(ContaminationLevel::Likely)]);
    assert_eq!(fw.status(), FirewallStatus::Breached);
}

#[test]
fn data_request_gating() {
    let fw = ExperimentalFirewall::default();
    assert!(fw.request_experimental_data("pdg_2022", "alice").is_none());
    assert_eq!(fw.alerts().len(), 1);

    fw.enable_validation_phase(&complete()).unwrap();
    let token = fw.request_experimental_data("pdg_2022", "alice").unwrap();
    assert_eq!(token.dataset_id, "pdg_2022");
    assert!(token.access_granted);
    assert!(fw.request_experimental_data("lhc_run3", "alice").is_none());

    let access = fw.dataset_access_log("pdg_2022").unwrap();
    assert_eq!(access.len(), 1);
    assert!(access[0].starts_with("alice@"));

    fw.simulate_tamper("pdg_2022", "higgs_mass_gev", 125.0)
        .unwrap();
    assert!(fw.request_experimental_data("pdg_2022", "bob").is_none());
    assert_eq!(fw.status(), FirewallStatus::Breached);
}

#[test]
fn emergency_shutdown_is_idempotent() {
    let fw = validating();
    let before = fw.audit_len();
    fw.emergency_shutdown("operator drill");
    fw.emergency_shutdown("operator drill");

    assert_eq!(fw.status(), FirewallStatus::Disabled);
    assert!(!fw.theory_phase());
    assert!(!fw.validation_phase());
    assert_eq!(fw.audit_len(), before + 2);

    assert!(fw.get_sealed_comparison("fine_structure_inverse").is_none());
    assert!(fw.request_experimental_data("codata_2018", "alice").is_none());
    assert_eq!(fw.enable_validation_phase(&complete()), Err(FirewallError::Disabled));

    // A critical alert does not move a disabled firewall back to breached.
    fw.raise_alert(AlertSeverity::Critical, "late tamper report");
    assert_eq!(fw.status(), FirewallStatus::Disabled);
}

#[test]
fn shutdown_overrides_breach() {
    let fw = ExperimentalFirewall::default();
    fw.raise_alert(AlertSeverity::Critical, "manual breach");
    assert_eq!(fw.status(), FirewallStatus::Breached);
    fw.emergency_shutdown("contain");
    assert_eq!(fw.status(), FirewallStatus::Disabled);
}

#[test]
fn reset_restores_initial_state() {
    let fw = validating();
    fw.simulate_tamper("planck_2018", "hubble_constant", 73.0)
        .unwrap();
    fw.request_experimental_data("planck_2018", "alice");
    fw.emergency_shutdown("test");
    assert!(!fw.alerts().is_empty());

    fw.reset();
    assert_eq!(fw.status(), FirewallStatus::Active);
    assert!(fw.theory_phase());
    assert!(!fw.validation_phase());
    assert!(fw.alerts().is_empty());
    assert_eq!(fw.audit_len(), 0);
    assert!(fw.dataset_integrity().values().all(|intact| *intact));
    assert!(fw.dataset_access_log("planck_2018").unwrap().is_empty());
}

#[test]
fn evidence_ingestion_respects_threshold() {
    let fw = ExperimentalFirewall::default();
    let raised = fw.ingest_evidence(&[
        evidence(ContaminationLevel::Suspicious),
        evidence(ContaminationLevel::Likely),
        evidence(ContaminationLevel::Confirmed),
    ]);
    assert_eq!(raised, 2);
    let severities: Vec<AlertSeverity> = fw.alerts().iter().map(|a| a.severity).collect();
    assert_eq!(severities, vec![AlertSeverity::Medium, AlertSeverity::High]);
    // Confirmed findings do not breach on their own.
    assert_eq!(fw.status(), FirewallStatus::Active);

    fw.ingest_evidence(&[evidence(ContaminationLevel::Critical)]);
    assert_eq!(fw.status(), FirewallStatus::Breached);
    let last = fw.audit_log().pop().unwrap();
    assert_eq!(last.record.action, AuditAction::CriticalAlert);
}

#[test]
fn custom_threshold_and_allow_list() {
    let config = FirewallConfig {
        escalation_threshold: ContaminationLevel::Critical,
        validation_ready_keys: vec!["x".into()],
        ..FirewallConfig::default()
    };
    let dataset = SealedDataset::seal(
        "local",
        "local reference",
        "test",
        serde_json::json!({ "x": { "value": 2.5, "uncertainty": 0.1, "unit": "1" } }),
    );
    let fw = ExperimentalFirewall::with_datasets(config, vec![dataset]).unwrap();
    assert_eq!(fw.ingest_evidence(&[evidence(ContaminationLevel::Confirmed)]), 0);

    fw.enable_validation_phase(&|_: &str| true).unwrap();
    assert_eq!(fw.get_sealed_comparison("x").unwrap().value, 2.5);
}

#[test]
fn screen_tree_flags_impure_derivation() {
    let fw = ExperimentalFirewall::default();
    let detector = ContaminationDetector::default();

    let mut tree = ProvenanceTree::new(
        DerivationNode::new("alpha", "alpha^-1 from phi", NodeKind::Target).with_dependency("fit"),
    );
    tree.add_node(DerivationNode::axiom("phi", "phi^2 = phi + 1"))
        .unwrap();
    tree.add_node(
        DerivationNode::new("fit", "c = 137.035999084 / phi^10", NodeKind::Computation)
            .with_dependency("phi")
            .with_empirical_input("codata_2018"),
    )
    .unwrap();

    let evidence = fw.screen_tree(&detector, &tree);
    assert!(evidence.iter().any(|e| e.level == ContaminationLevel::Critical));
    assert_eq!(fw.status(), FirewallStatus::Breached);
    assert!(!tree.is_pure());
}

#[test]
fn status_report_reflects_state() {
    let fw = validating();
    fw.get_sealed_comparison("higgs_mass_gev");
    let report = fw.status_report();
    assert!(report.contains("Status: ACTIVE"));
    assert!(report.contains("Validation phase: ON"));
    assert!(report.contains("sealed_comparison 'higgs_mass_gev': granted"));

    let snapshot = fw.snapshot();
    assert_eq!(snapshot.datasets.len(), 3);
    assert!(snapshot.tampered().is_empty());
    assert_eq!(snapshot.total_alerts, 0);
}

#[test]
fn concurrent_reads_and_alerts_stay_consistent() {
    let fw = Arc::new(validating());
    let mut threads = Vec::new();
    for i in 0..8 {
        let fw = Arc::clone(&fw);
        threads.push(std::thread::spawn(move || {
            for _ in 0..25 {
                fw.get_sealed_comparison("electron_mass_mev");
                if i == 0 {
                    fw.raise_alert(AlertSeverity::Low, "noise");
                }
            }
        }));
    }
    for t in threads {
        t.join().unwrap();
    }
    let chain = fw.verify_audit_chain();
    assert!(chain.is_valid);
    assert_eq!(fw.audit_len(), 1 + 8 * 25);
    assert_eq!(fw.alerts().len(), 25);
}
