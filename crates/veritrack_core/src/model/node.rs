//! Proof-assistant dependency graph node records.
//!
//! # Responsibility
//! - Define the node shape recovered from the blueprint dependency graph.
//! - Keep the two status axes (type-level, term-level) independent.
//!
//! # Invariants
//! - `type_dependencies` and `term_dependencies` stay disjoint lists;
//!   edges are partitioned between them at decode time.
//! - `Unknown` means the encoding attribute was absent; `Unrecognized`
//!   means it was present but not in the fixed mapping table.

use serde::{Deserialize, Serialize};

/// What kind of artifact a graph node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Definition,
    Theorem,
}

/// Status of a node's statement (type-level axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeStatus {
    Stated,
    CanState,
    NotReady,
    Mathlib,
    Unknown,
    Unrecognized,
}

/// Status of a node's proof or body (term-level axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TermStatus {
    Proved,
    Defined,
    CanProve,
    FullyProved,
    Unknown,
    Unrecognized,
}

/// Fully classified dependency graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub kind: NodeKind,
    #[serde(rename = "type-status")]
    pub type_status: TypeStatus,
    #[serde(rename = "term-status")]
    pub term_status: TermStatus,
    /// Targets of dashed edges out of this node.
    #[serde(rename = "type-dependencies", default)]
    pub type_dependencies: Vec<String>,
    /// Targets of all other edges out of this node.
    #[serde(rename = "term-dependencies", default)]
    pub term_dependencies: Vec<String>,
    /// Free-text content merged from the report's modal container.
    #[serde(default)]
    pub content: String,
}

impl GraphNode {
    /// Whether this node counts as verified for certification purposes.
    ///
    /// Only a fully proved term qualifies; partially proved or merely
    /// stated nodes do not.
    pub fn is_verified(&self) -> bool {
        self.term_status == TermStatus::FullyProved
    }
}
