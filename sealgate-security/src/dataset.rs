//! Sealed reference datasets and the default reference catalogue.
//!
//! A [`SealedDataset`] hashes its content once at construction. The content
//! never leaves this crate; the firewall hands out curated per-key records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::hashing::hex_sha256;

/// One curated reference value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceValue {
    pub value: f64,
    pub uncertainty: f64,
    pub unit: String,
}

/// Immutable reference content plus a recomputable integrity hash.
#[derive(Debug, Clone)]
pub struct SealedDataset {
    id: String,
    description: String,
    source: String,
    sealed_at: DateTime<Utc>,
    content: Value,
    content_hash: String,
    access_log: Vec<String>,
}

/// SHA-256 over the canonical JSON form of `content`.
///
/// Object keys are sorted recursively before serializing, so equal content
/// hashes equal whatever order the map keeps its keys in.
pub fn content_hash(content: &Value) -> String {
    hex_sha256(canonicalize(content).to_string().as_bytes())
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

impl SealedDataset {
    pub fn seal(
        id: impl Into<String>,
        description: impl Into<String>,
        source: impl Into<String>,
        content: Value,
    ) -> Self {
        let content_hash = content_hash(&content);
        let id = id.into();
        tracing::debug!(dataset = %id, hash = %content_hash, "Dataset sealed");
        Self {
            id,
            description: description.into(),
            source: source.into(),
            sealed_at: Utc::now(),
            content,
            content_hash,
            access_log: Vec::new(),
        }
    }

    /// A new seal over a copy of this dataset's content, with an empty access log.
    pub fn reseal(&self) -> Self {
        Self::seal(
            self.id.clone(),
            self.description.clone(),
            self.source.clone(),
            self.content.clone(),
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn sealed_at(&self) -> DateTime<Utc> {
        self.sealed_at
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn access_log(&self) -> &[String] {
        &self.access_log
    }

    /// Recompute the hash and compare with the one taken at seal time.
    pub fn verify_seal_integrity(&self) -> bool {
        content_hash(&self.content) == self.content_hash
    }

    /// Comparison keys present in the content, sorted.
    pub fn keys(&self) -> Vec<String> {
        match &self.content {
            Value::Object(map) => {
                let mut keys: Vec<String> = map.keys().cloned().collect();
                keys.sort();
                keys
            }
            _ => Vec::new(),
        }
    }

    pub(crate) fn reference_value(&self, key: &str) -> Option<ReferenceValue> {
        let entry = self.content.get(key)?;
        serde_json::from_value(entry.clone()).ok()
    }

    pub(crate) fn record_access(&mut self, entry: String) {
        self.access_log.push(entry);
    }

    /// Overwrite a stored value without resealing.
    #[cfg(any(test, feature = "tamper-sim"))]
    pub(crate) fn tamper(&mut self, key: &str, value: f64) {
        if let Value::Object(map) = &mut self.content {
            match map.get_mut(key) {
                Some(Value::Object(entry)) => {
                    entry.insert("value".to_string(), json!(value));
                }
                Some(other) => *other = json!({ "value": value }),
                None => {
                    map.insert(key.to_string(), json!({ "value": value }));
                }
            }
        }
    }
}

fn entry(value: f64, uncertainty: f64, unit: &str) -> Value {
    json!({ "value": value, "uncertainty": uncertainty, "unit": unit })
}

/// Freshly sealed reference catalogue.
pub fn default_datasets() -> Vec<SealedDataset> {
    vec![
        SealedDataset::seal(
            "codata_2018",
            "CODATA 2018 recommended values of the fundamental constants",
            "CODATA",
            json!({
                "fine_structure_inverse": entry(137.035999084, 0.000000021, "1"),
                "electron_mass_mev": entry(0.51099895000, 0.00000000015, "MeV"),
                "proton_electron_ratio": entry(1836.15267343, 0.00000011, "1"),
                "gravitational_constant": entry(6.67430e-11, 0.00015e-11, "m^3 kg^-1 s^-2"),
            }),
        ),
        SealedDataset::seal(
            "pdg_2022",
            "Particle Data Group 2022 review of particle properties",
            "PDG",
            json!({
                "muon_mass_mev": entry(105.6583755, 0.0000023, "MeV"),
                "tau_mass_mev": entry(1776.86, 0.12, "MeV"),
                "w_mass_gev": entry(80.377, 0.012, "GeV"),
                "z_mass_gev": entry(91.1876, 0.0021, "GeV"),
                "higgs_mass_gev": entry(125.25, 0.17, "GeV"),
                "top_mass_gev": entry(172.69, 0.30, "GeV"),
                "weinberg_angle": entry(0.23121, 0.00004, "1"),
            }),
        ),
        SealedDataset::seal(
            "planck_2018",
            "Planck 2018 cosmological parameters (TT,TE,EE+lowE+lensing)",
            "Planck Collaboration",
            json!({
                "hubble_constant": entry(67.4, 0.5, "km s^-1 Mpc^-1"),
                "omega_lambda": entry(0.6847, 0.0073, "1"),
                "omega_matter": entry(0.3153, 0.0073, "1"),
                "spectral_index": entry(0.9649, 0.0042, "1"),
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_seal_verifies() {
        for dataset in default_datasets() {
            assert!(dataset.verify_seal_integrity(), "{}", dataset.id());
            assert_eq!(dataset.content_hash().len(), 64);
        }
    }

    #[test]
    fn test_hash_ignores_key_order() {
        let a = json!({ "x": 1.0, "y": 2.0 });
        let b: Value = serde_json::from_str(r#"{ "y": 2.0, "x": 1.0 }"#).unwrap();
        assert_eq!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn test_hash_ignores_nested_key_order() {
        let a = json!({
            "k": { "value": 1.5, "unit": "1", "uncertainty": 0.1 },
            "list": [{ "b": 1, "a": 2 }]
        });
        let b: Value = serde_json::from_str(
            r#"{ "list": [{ "a": 2, "b": 1 }], "k": { "uncertainty": 0.1, "unit": "1", "value": 1.5 } }"#,
        )
        .unwrap();
        assert_eq!(content_hash(&a), content_hash(&b));
        assert_eq!(
            canonicalize(&b).to_string(),
            r#"{"k":{"uncertainty":0.1,"unit":"1","value":1.5},"list":[{"a":2,"b":1}]}"#
        );
    }

    #[test]
    fn test_tamper_replaces_non_object_entry() {
        let content = json!({ "raw": 3.0, "ok": { "value": 1.0 } });
        let mut dataset = SealedDataset::seal("d", "desc", "src", content);
        dataset.tamper("raw", 4.0);
        assert!(!dataset.verify_seal_integrity());
        assert_eq!(dataset.content["raw"]["value"], json!(4.0));
        assert_eq!(dataset.keys(), vec!["ok".to_string(), "raw".to_string()]);
    }

    #[test]
    fn test_tamper_breaks_seal() {
        let mut dataset = default_datasets().remove(0);
        assert!(dataset.verify_seal_integrity());
        dataset.tamper("fine_structure_inverse", 137.0);
        assert!(!dataset.verify_seal_integrity());
    }

    #[test]
    fn test_reference_value_lookup() {
        let datasets = default_datasets();
        let pdg = &datasets[1];
        let higgs = pdg.reference_value("higgs_mass_gev").unwrap();
        assert_eq!(higgs.value, 125.25);
        assert_eq!(higgs.unit, "GeV");
        assert!(pdg.reference_value("missing").is_none());
    }

    #[test]
    fn test_catalogue_keys_are_unique() {
        let mut keys: Vec<String> = default_datasets().iter().flat_map(|d| d.keys()).collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }

    #[test]
    fn test_access_log_appends() {
        let mut dataset = SealedDataset::seal("d", "desc", "src", json!({}));
        dataset.record_access("alice@now".into());
        dataset.record_access("bob@later".into());
        assert_eq!(dataset.access_log(), ["alice@now", "bob@later"]);
        assert!(dataset.verify_seal_integrity());
    }
}
