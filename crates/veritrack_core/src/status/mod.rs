//! Status extraction from collaborator outputs.
//!
//! # Responsibility
//! - Partition verification results into verified/failed identifier sets,
//!   accepting both historical document shapes.
//! - Extract the specified-identifier set from the specification batch.
//! - Derive blueprint qualification from decoded graph nodes.
//!
//! # Invariants
//! - The two verification shapes converge on the same output type;
//!   neither is treated as canonical.
//! - Extraction never judges anything itself; it only reads what the
//!   collaborators computed.

use crate::model::entry::FIELD_ATOM_ID;
use crate::model::node::GraphNode;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StatusResult<T> = Result<T, StatusError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    /// The document matches neither supported shape.
    UnsupportedShape(String),
}

impl Display for StatusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedShape(detail) => {
                write!(f, "unsupported status document shape: {detail}")
            }
        }
    }
}

impl Error for StatusError {}

/// Identifier partition produced by a verification run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct VerificationResults {
    pub verified: BTreeSet<String>,
    pub failed: BTreeSet<String>,
}

/// Partitions a verification document into verified and failed sets.
///
/// Two historical shapes are supported:
/// - a mapping keyed by atom id with a `verified` boolean per record
///   (absent or non-boolean counts as failed);
/// - a document with `verification.verified_functions` /
///   `verification.failed_functions` lists of records carrying the id
///   field; records without the id field are ignored.
pub fn partition_verification(data: &Value) -> StatusResult<VerificationResults> {
    if let Some(verification) = data.get("verification") {
        return Ok(partition_legacy_lists(verification));
    }

    let map = data.as_object().ok_or_else(|| {
        StatusError::UnsupportedShape("expected a mapping keyed by atom id".to_string())
    })?;

    let mut results = VerificationResults::default();
    for (id, record) in map {
        let verified = record
            .get("verified")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if verified {
            results.verified.insert(id.clone());
        } else {
            results.failed.insert(id.clone());
        }
    }
    Ok(results)
}

fn partition_legacy_lists(verification: &Value) -> VerificationResults {
    let mut results = VerificationResults::default();
    collect_list_ids(verification, "verified_functions", &mut results.verified);
    collect_list_ids(verification, "failed_functions", &mut results.failed);
    results
}

fn collect_list_ids(verification: &Value, list: &str, into: &mut BTreeSet<String>) {
    let Some(records) = verification.get(list).and_then(Value::as_array) else {
        return;
    };
    for record in records {
        if let Some(id) = record.get(FIELD_ATOM_ID).and_then(Value::as_str) {
            into.insert(id.to_string());
        }
    }
}

/// Derives verification qualification from decoded blueprint nodes.
///
/// Only `fully-proved` nodes qualify; everything else is failed. Node ids
/// are namespaced with `prefix` to match the structure's identifiers.
pub fn graph_verification(
    nodes: &BTreeMap<String, GraphNode>,
    prefix: &str,
) -> VerificationResults {
    let mut results = VerificationResults::default();
    for (id, node) in nodes {
        let namespaced = format!("{prefix}{id}");
        if node.is_verified() {
            results.verified.insert(namespaced);
        } else {
            results.failed.insert(namespaced);
        }
    }
    results
}

/// Extracts the set of identifiers whose record says `specified: true`.
pub fn specified_names(specs: &Value) -> StatusResult<BTreeSet<String>> {
    let map = specs.as_object().ok_or_else(|| {
        StatusError::UnsupportedShape("expected a mapping keyed by atom id".to_string())
    })?;

    Ok(map
        .iter()
        .filter(|(_, record)| {
            record
                .get("specified")
                .and_then(Value::as_bool)
                .unwrap_or(false)
        })
        .map(|(id, _)| id.clone())
        .collect())
}
