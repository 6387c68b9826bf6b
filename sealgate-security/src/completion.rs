//! Theory-completion predicate consulted before the validation phase opens.

use std::collections::HashSet;

/// Reports whether a named capability of the derivation side is available.
pub trait TheoryCompletion {
    fn is_available(&self, capability: &str) -> bool;

    /// Capabilities from `required` that are not available, in order.
    fn missing(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|c| !self.is_available(c))
            .cloned()
            .collect()
    }
}

impl<F> TheoryCompletion for F
where
    F: Fn(&str) -> bool,
{
    fn is_available(&self, capability: &str) -> bool {
        self(capability)
    }
}

/// A fixed set of available capabilities.
#[derive(Debug, Clone, Default)]
pub struct CapabilitySet {
    available: HashSet<String>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, capability: impl Into<String>) -> Self {
        self.available.insert(capability.into());
        self
    }
}

impl<S: Into<String>> FromIterator<S> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            available: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl TheoryCompletion for CapabilitySet {
    fn is_available(&self, capability: &str) -> bool {
        self.available.contains(capability)
    }
}
