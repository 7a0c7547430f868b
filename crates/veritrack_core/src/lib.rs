//! Core domain logic for VeriTrack.
//! This crate is the single source of truth for tracking invariants.

pub mod certs;
pub mod frontmatter;
pub mod graph;
pub mod index;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod status;
pub mod structure;

pub use certs::{decode_name, encode_name, CertError, CertResult, CertStore, SyncReport};
pub use graph::{decode_document, GraphError, GraphResult};
pub use index::IntervalIndex;
pub use logging::{default_log_level, init_logging};
pub use model::atom::{Atom, AtomBatch, AtomId, LineSpan};
pub use model::entry::StructureEntry;
pub use model::node::{GraphNode, NodeKind, TermStatus, TypeStatus};
pub use reconcile::{reconcile_all, reconcile_entry, BatchReport, Outcome, ReconcileWarning};
pub use status::{
    graph_verification, partition_verification, specified_names, VerificationResults,
};
pub use structure::{Structure, StructureError, StructureResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
