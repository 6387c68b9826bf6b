//! Property-based tests for seal hashing, numeric exemptions and gating.

use proptest::prelude::*;
use serde_json::{Map, Value, json};

use sealgate_core::ContaminationLevel;
use sealgate_security::detector::NumericalScanner;
use sealgate_security::{ExperimentalFirewall, SealedDataset, content_hash};

fn content_strategy() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z_]{1,10}", -1.0e6f64..1.0e6, 1..8).prop_map(|entries| {
        let map: Map<String, Value> = entries
            .into_iter()
            .map(|(k, v)| (k, json!({ "value": v, "uncertainty": 0.1, "unit": "1" })))
            .collect();
        Value::Object(map)
    })
}

proptest! {
    #[test]
    fn content_hash_is_deterministic(content in content_strategy()) {
        let first = content_hash(&content);
        prop_assert_eq!(&first, &content_hash(&content.clone()));
        let dataset = SealedDataset::seal("d", "desc", "src", content);
        prop_assert_eq!(dataset.content_hash(), first.as_str());
        prop_assert!(dataset.verify_seal_integrity());
        prop_assert!(dataset.reseal().verify_seal_integrity());
    }

    #[test]
    fn any_value_change_breaks_the_seal(content in content_strategy(), delta in 1.0f64..1000.0) {
        let key = match &content {
            Value::Object(map) => map.keys().next().cloned().unwrap_or_default(),
            _ => String::new(),
        };
        let original = content[&key]["value"].as_f64().unwrap_or_default();
        let mut changed = content.clone();
        changed[&key]["value"] = json!(original + delta);
        prop_assert_ne!(content_hash(&content), content_hash(&changed));
    }

    #[test]
    fn whitelisted_literals_never_flagged(
        prefix in "[a-z ]{0,12}",
        suffix in "[a-z ]{0,12}",
        literal in prop::sample::select(vec!["-1", "0", "1", "1.0", "0.0", "-1.0", "+1"]),
    ) {
        let scanner = NumericalScanner::default();
        let text = format!("{prefix} {literal} {suffix}");
        prop_assert!(scanner.scan(&text, "loc").is_empty());
    }

    #[test]
    fn fine_structure_literal_confirmed_anywhere(
        prefix in "[a-zA-Z =(.^*]{0,16}",
        sign in prop::sample::select(vec!["", "-", "+"]),
        suffix in "[a-z );,]{0,16}",
    ) {
        let scanner = NumericalScanner::default();
        let text = format!("{prefix}{sign}137.035999084{suffix}");
        let evidence = scanner.scan(&text, "loc");
        prop_assert!(evidence.iter().any(|e| e.level == ContaminationLevel::Confirmed));
    }

    #[test]
    fn theory_phase_never_releases(keys in prop::collection::vec("[a-z_]{0,24}", 1..10)) {
        let fw = ExperimentalFirewall::default();
        for key in &keys {
            prop_assert!(fw.get_sealed_comparison(key).is_none());
        }
        prop_assert_eq!(fw.alerts().len(), keys.len());
        prop_assert_eq!(fw.audit_len(), keys.len());
        prop_assert!(fw.verify_audit_chain().is_valid);
    }
}
