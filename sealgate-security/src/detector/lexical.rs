//! Lexical scanner: phrase-level pattern families plus word-level suspicious terms.
//!
//! A phrase match yields `Likely` evidence. A suspicious word that sits outside
//! every phrase match yields `Suspicious` evidence, so incidental wording is
//! still visible without double-counting deliberate phrasing.

use regex::{Regex, RegexBuilder};
use sealgate_core::ContaminationLevel;
use sealgate_core::config::DetectorConfig;
use std::collections::BTreeSet;
use std::ops::Range;

use crate::evidence::{ContaminationEvidence, EvidenceSource};

const PHRASE_CONFIDENCE: f64 = 0.75;
const TERM_CONFIDENCE: f64 = 0.35;

/// A named group of compiled patterns.
struct PatternFamily {
    name: String,
    patterns: Vec<Regex>,
}

/// Phrase- and word-level detector for empirical vocabulary.
pub struct LexicalScanner {
    families: Vec<PatternFamily>,
    suspicious_terms: BTreeSet<String>,
}

impl LexicalScanner {
    pub fn new(config: &DetectorConfig) -> Self {
        let mut defs = builtin_pattern_defs();
        for custom in &config.custom_patterns {
            defs.push((custom.family.clone(), custom.pattern.clone()));
        }

        let mut families: Vec<PatternFamily> = Vec::new();
        for (family, pattern) in defs {
            let Some(regex) = compile(&family, &pattern) else {
                continue;
            };
            match families.iter_mut().find(|f| f.name == family) {
                Some(existing) => existing.patterns.push(regex),
                None => families.push(PatternFamily {
                    name: family,
                    patterns: vec![regex],
                }),
            }
        }

        let mut suspicious_terms: BTreeSet<String> =
            SUSPICIOUS_TERMS.iter().map(|t| t.to_string()).collect();
        suspicious_terms.extend(
            config
                .extra_suspicious_terms
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty()),
        );

        Self {
            families,
            suspicious_terms,
        }
    }

    /// Names of the compiled pattern families.
    pub fn family_names(&self) -> Vec<&str> {
        self.families.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn scan(&self, text: &str, location: &str) -> Vec<ContaminationEvidence> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut evidence = Vec::new();
        let mut matched_spans: Vec<Range<usize>> = Vec::new();

        for family in &self.families {
            for pattern in &family.patterns {
                let spans: Vec<_> = pattern.find_iter(text).collect();
                let Some(first) = spans.first() else {
                    continue;
                };
                evidence.push(
                    ContaminationEvidence::new(
                        EvidenceSource::Lexical,
                        ContaminationLevel::Likely,
                        location,
                        format!(
                            "Phrase '{}' matches the {} pattern family",
                            first.as_str(),
                            family.name
                        ),
                        PHRASE_CONFIDENCE,
                    )
                    .with_rule(format!("lexical.{}", family.name)),
                );
                matched_spans.extend(spans.iter().map(|m| m.range()));
            }
        }

        let mut reported: BTreeSet<String> = BTreeSet::new();
        for (start, word) in words(text) {
            let lower = word.to_lowercase();
            if !self.suspicious_terms.contains(&lower) || reported.contains(&lower) {
                continue;
            }
            let inside_phrase = matched_spans
                .iter()
                .any(|span| span.start <= start && start < span.end);
            if inside_phrase {
                continue;
            }
            evidence.push(
                ContaminationEvidence::new(
                    EvidenceSource::Lexical,
                    ContaminationLevel::Suspicious,
                    location,
                    format!("Suspicious term '{lower}' outside any known phrase"),
                    TERM_CONFIDENCE,
                )
                .with_rule("lexical.suspicious_term"),
            );
            reported.insert(lower);
        }

        evidence
    }
}

impl Default for LexicalScanner {
    fn default() -> Self {
        Self::new(&DetectorConfig::default())
    }
}

fn compile(family: &str, pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!("Failed to compile lexical pattern in family '{}': {}", family, e);
            None
        }
    }
}

/// Split text into alphanumeric words with their byte offsets.
fn words(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in text.char_indices() {
        if c.is_alphanumeric() {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start.take() {
            out.push((s, &text[s..i]));
        }
    }
    if let Some(s) = start {
        out.push((s, &text[s..]));
    }
    out
}

const SUSPICIOUS_TERMS: &[&str] = &[
    "measured",
    "measurement",
    "measurements",
    "observed",
    "observation",
    "observational",
    "experiment",
    "experimental",
    "experimentally",
    "empirical",
    "empirically",
    "fit",
    "fitted",
    "fitting",
    "calibrate",
    "calibrated",
    "calibration",
    "tuned",
    "adjusted",
    "codata",
    "pdg",
];

/// Built-in phrase patterns, grouped by family.
fn builtin_pattern_defs() -> Vec<(String, String)> {
    let defs: Vec<(&str, &str)> = vec![
        // === Experimental data ===
        (
            "experimental_data",
            r"\bexperimental(?:ly)?\s+(?:value|data|result|measurement|determination)s?\b",
        ),
        (
            "experimental_data",
            r"\bmeasured\s+(?:value|mass|width|constant|coupling|angle)s?\b",
        ),
        (
            "experimental_data",
            r"\b(?:codata|pdg|particle\s+data\s+group|planck\s+20(?:15|18))\b",
        ),
        ("experimental_data", r"\bobserved\s+(?:value|data|abundance)s?\b"),
        // === Parameter fitting ===
        (
            "parameter_fitting",
            r"\bfit(?:ted|ting)?\s+(?:to|against)\s+(?:the\s+)?(?:data|experiment|measurement|observation)s?\b",
        ),
        ("parameter_fitting", r"\bleast[\s-]squares?\b"),
        ("parameter_fitting", r"\bchi[\s-]?squared?\b|χ²"),
        (
            "parameter_fitting",
            r"\bcalibrat(?:e|ed|ing|ion)\s+(?:to|against|with)\b",
        ),
        ("parameter_fitting", r"\bfree\s+parameters?\b"),
        ("parameter_fitting", r"\boptimi[sz](?:e|ed|ing)\s+to\s+match\b"),
        // === Result adjustment ===
        ("result_adjustment", r"\badjust(?:ed|ing)?\s+(?:to|for|until)\b"),
        ("result_adjustment", r"\b(?:correction|fudge)\s+factor\b"),
        ("result_adjustment", r"\bfine[\s-]tun(?:ed|ing)\b"),
        (
            "result_adjustment",
            r"\bempirical\s+(?:correction|adjustment|factor|input)s?\b",
        ),
        ("result_adjustment", r"\brenormali[sz]ed\s+to\s+agree\b"),
        // === Circular reasoning ===
        (
            "circular_reasoning",
            r"\bbecause\s+(?:we|it\s+is|they\s+are)\s+observed?\b",
        ),
        (
            "circular_reasoning",
            r"\bto\s+(?:match|reproduce|agree\s+with)\s+(?:the\s+)?(?:experiment|observation|data|measurement)s?\b",
        ),
        ("circular_reasoning", r"\bknown\s+(?:experimental\s+)?value\b"),
        ("circular_reasoning", r"\bworking\s+backwards?\s+from\b"),
    ];

    defs.into_iter()
        .map(|(family, pattern)| (family.to_string(), pattern.to_string()))
        .collect()
}
