//! Domain model shared across the tracking pipeline.
//!
//! # Responsibility
//! - Define the canonical records for both ecosystems (source atoms,
//!   blueprint graph nodes) and the tracked structure entries.
//!
//! # Invariants
//! - External batches are read-only snapshots; only `StructureEntry`
//!   records are mutated, and only by reconciliation.

pub mod atom;
pub mod entry;
pub mod node;
