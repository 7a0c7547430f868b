//! Source-atom records produced by the code-intelligence tool.
//!
//! # Responsibility
//! - Mirror the external atom batch shape (`code-path`, `code-text`, ...).
//! - Provide read-only batch access and namespace filtering.
//!
//! # Invariants
//! - A batch is immutable once loaded; one batch per analysis run.
//! - Atom identifiers are opaque strings minted by the external tool.

use serde::Deserialize;
use std::collections::HashMap;

/// Stable external identifier for a tracked atom.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type AtomId = String;

/// Inclusive 1-indexed source line span of an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LineSpan {
    #[serde(rename = "lines-start")]
    pub start: u32,
    #[serde(rename = "lines-end")]
    pub end: u32,
}

/// One atom record as emitted by the external analysis tool.
///
/// Location fields are optional: the tool emits atoms it cannot place
/// (macro expansions, generated items) without `code-path`/`code-text`,
/// and those are simply never indexable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Atom {
    /// Relative source path within the analyzed project.
    #[serde(rename = "code-path")]
    pub file: Option<String>,
    /// Inclusive line range of the atom body.
    #[serde(rename = "code-text")]
    pub span: Option<LineSpan>,
    /// Logical module grouping reported by the tool.
    #[serde(rename = "code-module", default)]
    pub module: String,
    /// Ids of atoms this atom depends on. Order carries no meaning.
    #[serde(default)]
    pub dependencies: Vec<AtomId>,
    /// Short human-readable name for menus and reports.
    #[serde(rename = "display-name", default)]
    pub display_name: String,
}

/// Read-only collection of atoms keyed by id, authoritative for one run.
#[derive(Debug, Default)]
pub struct AtomBatch {
    atoms: HashMap<AtomId, Atom>,
}

impl AtomBatch {
    /// Parses a batch from the tool's JSON output.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let atoms: HashMap<AtomId, Atom> = serde_json::from_str(text)?;
        Ok(Self { atoms })
    }

    pub fn from_map(atoms: HashMap<AtomId, Atom>) -> Self {
        Self { atoms }
    }

    pub fn get(&self, id: &str) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.atoms.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AtomId, &Atom)> {
        self.atoms.iter()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Keeps only atoms whose id starts with `prefix`.
    ///
    /// Used to narrow a batch to the crate namespace the structure tracks.
    pub fn retain_prefix(mut self, prefix: &str) -> Self {
        self.atoms.retain(|id, _| id.starts_with(prefix));
        self
    }
}

/// Strips the namespace from a full identifier for display.
///
/// `ns:crate/1.0/mod#func()` becomes `func`; ids without a `#` separator
/// are returned unchanged.
pub fn display_name(id: &str) -> String {
    match id.rfind('#') {
        Some(pos) => id[pos + 1..].trim_end_matches("()").to_string(),
        None => id.to_string(),
    }
}
