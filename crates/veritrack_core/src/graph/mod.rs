//! Blueprint dependency graph decoding.
//!
//! # Responsibility
//! - Recover the typed dependency graph embedded in the proof assistant's
//!   HTML report and classify every node and edge.
//!
//! # Invariants
//! - Any structural violation aborts the whole decode: this data feeds
//!   certification decisions and must not silently degrade.
//! - Node classification is attribute-driven and order-independent.

use crate::model::node::GraphNode;
use scraper::Html;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod dot;
mod extract;

pub type GraphResult<T> = Result<T, GraphError>;

/// Fatal decode failures. There are no soft variants here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// No script block carries the embedded digraph call.
    GraphNotFound,
    /// The digraph payload violates the expected grammar.
    MalformedGraph(String),
    MissingShape { node: String },
    UnknownShape { node: String, shape: String },
    MissingLabel { node: String },
    LabelMismatch { node: String, label: String },
    UnknownNodeStyle { node: String, style: String },
    /// An edge references an id never declared as a node.
    DanglingEdge { source: String, target: String },
    /// A modal container id does not carry the required `_modal` suffix.
    ModalIdSuffix { id: String },
    /// A modal container has no corresponding parsed node.
    ModalWithoutNode { id: String },
    /// A modal container does not wrap exactly one element.
    ModalShape { id: String, children: usize },
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GraphNotFound => {
                write!(f, "no embedded dependency graph found in document")
            }
            Self::MalformedGraph(detail) => write!(f, "malformed graph payload: {detail}"),
            Self::MissingShape { node } => write!(f, "node `{node}` has no shape attribute"),
            Self::UnknownShape { node, shape } => {
                write!(f, "node `{node}` has unknown shape `{shape}`")
            }
            Self::MissingLabel { node } => write!(f, "node `{node}` has no label attribute"),
            Self::LabelMismatch { node, label } => {
                write!(f, "node `{node}` label `{label}` does not match its id")
            }
            Self::UnknownNodeStyle { node, style } => {
                write!(f, "node `{node}` has unknown style `{style}`")
            }
            Self::DanglingEdge { source, target } => {
                write!(f, "edge `{source}` -> `{target}` references an undeclared node")
            }
            Self::ModalIdSuffix { id } => {
                write!(f, "modal container id `{id}` does not end with `_modal`")
            }
            Self::ModalWithoutNode { id } => {
                write!(f, "modal container `{id}` has no matching graph node")
            }
            Self::ModalShape { id, children } => {
                write!(f, "modal container `{id}` wraps {children} elements, expected 1")
            }
        }
    }
}

impl Error for GraphError {}

/// Decodes the dependency graph embedded in a blueprint HTML document.
///
/// Returns the full classified node map, ordered by node id.
///
/// # Errors
/// - `GraphNotFound` when no script block embeds the digraph call.
/// - `MalformedGraph` and the classification variants on any structural
///   violation; nothing is decoded partially.
pub fn decode_document(html: &str) -> GraphResult<BTreeMap<String, GraphNode>> {
    let document = Html::parse_document(html);
    let payload = extract::digraph_payload(&document)?;
    let contents = extract::modal_contents(&document)?;

    let mut nodes = dot::parse_digraph(&payload)?;

    for (id, content) in contents {
        match nodes.get_mut(&id) {
            Some(node) => node.content = content,
            None => return Err(GraphError::ModalWithoutNode { id }),
        }
    }

    log::info!(
        "event=graph_decoded module=graph status=ok nodes={}",
        nodes.len()
    );
    Ok(nodes)
}
