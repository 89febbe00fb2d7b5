//! Requirement registry and scenario traceability.
//!
//! Requirements live here as plain static data: one [`Requirement`]
//! value per SRS entry, grouped by feature module, aggregated by
//! [`all`]. Nothing is parsed out of doc strings at runtime; a
//! requirement reference is a named lookup that either resolves or is a
//! registry defect caught by [`traceability::validate`].

use std::fmt;

use serde::Serialize;

pub mod aggregates;
pub mod key_value;
pub mod parquet;
pub mod selects;
pub mod ssl;
pub mod traceability;

/// One entry from a software requirements specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Requirement {
    /// Stable dotted name, e.g. `RQ.SRS-032.Basalt.Parquet.Import.Glob`.
    pub name: &'static str,
    /// Requirement revision the suite verifies against.
    pub version: &'static str,
    /// Normative text.
    pub description: &'static str,
    /// Heading depth in the source document.
    pub level: u8,
    /// Section number in the source document.
    pub num: &'static str,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

/// Every registered requirement, in feature-module order.
pub fn all() -> impl Iterator<Item = &'static Requirement> {
    selects::SELECTS
        .iter()
        .chain(parquet::PARQUET.iter())
        .chain(aggregates::AGGREGATES.iter())
        .chain(key_value::KEY_VALUE.iter())
        .chain(ssl::SSL.iter())
        .copied()
}

/// Resolve a requirement by its dotted name.
pub fn lookup(name: &str) -> Option<&'static Requirement> {
    all().find(|requirement| requirement.name == name)
}

/// Structural diagnostics over the registry itself.
pub fn validate_registry() -> Vec<String> {
    let mut diagnostics = Vec::new();
    let mut seen = std::collections::BTreeSet::new();
    for requirement in all() {
        if !seen.insert(requirement.name) {
            diagnostics.push(format!("duplicate requirement name: {}", requirement.name));
        }
        if !requirement.name.starts_with("RQ.SRS-") {
            diagnostics.push(format!(
                "requirement name without RQ.SRS prefix: {}",
                requirement.name
            ));
        }
        if !requirement.description.contains("SHALL") {
            diagnostics.push(format!(
                "requirement without normative SHALL text: {}",
                requirement.name
            ));
        }
        if requirement.version.is_empty() || requirement.num.is_empty() {
            diagnostics.push(format!(
                "requirement with empty version or section: {}",
                requirement.name
            ));
        }
    }
    diagnostics
}
