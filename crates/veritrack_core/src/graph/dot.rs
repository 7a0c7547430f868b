//! Parser for the digraph subset the report generator emits.
//!
//! Grammar actually used: a `strict digraph "" { ... }` wrapper, `;` as
//! statement separator, node statements (`"id" [k=v, ...]`), edge
//! statements (`"a" -> "b" [k=v, ...]`), and the three default-attribute
//! statements which carry no per-node information and are discarded.

use super::{GraphError, GraphResult};
use crate::model::node::{GraphNode, NodeKind, TermStatus, TypeStatus};
use std::collections::{BTreeMap, HashMap};

const PREAMBLE: &str = "strict digraph \"\" {";

/// Statement prefixes for the default-attribute statements. These mutate
/// generator-side defaults only and are not tracked as state here.
const DEFAULT_ATTR_KEYWORDS: [&str; 3] = ["graph", "node", "edge"];

struct Edge {
    source: String,
    target: String,
    dashed: bool,
}

/// Parses the digraph payload into classified nodes with partitioned
/// dependency lists. Modal content is merged later by the caller.
pub(super) fn parse_digraph(payload: &str) -> GraphResult<BTreeMap<String, GraphNode>> {
    let body = payload
        .strip_prefix(PREAMBLE)
        .ok_or_else(|| GraphError::MalformedGraph("missing digraph preamble".to_string()))?;
    let end = body
        .rfind('}')
        .ok_or_else(|| GraphError::MalformedGraph("missing closing brace".to_string()))?;
    let body = &body[..end];

    let mut nodes: BTreeMap<String, GraphNode> = BTreeMap::new();
    let mut edges: Vec<Edge> = Vec::new();

    for statement in body.split(';') {
        let statement = statement.trim();
        if statement.is_empty() || is_default_attr_statement(statement) {
            continue;
        }

        if statement.contains("->") {
            edges.push(parse_edge(statement)?);
        } else if statement.contains('[') {
            let (id, attrs) = parse_node(statement)?;
            let node = classify_node(&id, &attrs)?;
            nodes.insert(id, node);
        } else {
            return Err(GraphError::MalformedGraph(format!(
                "statement is neither node nor edge: `{statement}`"
            )));
        }
    }

    for edge in edges {
        if !nodes.contains_key(&edge.target) {
            return Err(GraphError::DanglingEdge {
                source: edge.source,
                target: edge.target,
            });
        }
        let source = nodes
            .get_mut(&edge.source)
            .ok_or_else(|| GraphError::DanglingEdge {
                source: edge.source.clone(),
                target: edge.target.clone(),
            })?;
        if edge.dashed {
            source.type_dependencies.push(edge.target);
        } else {
            source.term_dependencies.push(edge.target);
        }
    }

    Ok(nodes)
}

fn is_default_attr_statement(statement: &str) -> bool {
    DEFAULT_ATTR_KEYWORDS.iter().any(|keyword| {
        statement
            .strip_prefix(keyword)
            .is_some_and(|rest| rest.trim_start().starts_with('['))
    })
}

fn parse_node(statement: &str) -> GraphResult<(String, HashMap<String, String>)> {
    let open = statement.find('[').ok_or_else(|| {
        GraphError::MalformedGraph(format!("node statement without attributes: `{statement}`"))
    })?;
    let close = statement.rfind(']').ok_or_else(|| {
        GraphError::MalformedGraph(format!("unclosed attribute list: `{statement}`"))
    })?;
    if close < open {
        return Err(GraphError::MalformedGraph(format!(
            "mismatched attribute brackets: `{statement}`"
        )));
    }

    let id = unquote(&statement[..open]);
    if id.is_empty() {
        return Err(GraphError::MalformedGraph(format!(
            "node statement without id: `{statement}`"
        )));
    }
    let attrs = parse_attr_list(&statement[open + 1..close])?;
    Ok((id, attrs))
}

fn parse_edge(statement: &str) -> GraphResult<Edge> {
    let arrow = statement.find("->").ok_or_else(|| {
        GraphError::MalformedGraph(format!("edge statement without arrow: `{statement}`"))
    })?;
    let source = unquote(&statement[..arrow]);
    let rest = statement[arrow + 2..].trim();

    let (target_raw, attrs) = match rest.find('[') {
        Some(open) => {
            let close = rest.rfind(']').ok_or_else(|| {
                GraphError::MalformedGraph(format!("unclosed attribute list: `{statement}`"))
            })?;
            (&rest[..open], parse_attr_list(&rest[open + 1..close])?)
        }
        None => (rest, HashMap::new()),
    };

    let target = unquote(target_raw);
    if source.is_empty() || target.is_empty() || target.contains("->") {
        return Err(GraphError::MalformedGraph(format!(
            "unsupported edge statement: `{statement}`"
        )));
    }

    let dashed = attrs.get("style").is_some_and(|style| style == "dashed");
    Ok(Edge {
        source,
        target,
        dashed,
    })
}

/// Scans a `key=value, key=value` attribute list. Values may be single-
/// or double-quoted; commas inside quotes do not separate pairs and a
/// backslash escapes the next character inside quotes.
fn parse_attr_list(raw: &str) -> GraphResult<HashMap<String, String>> {
    let chars: Vec<char> = raw.chars().collect();
    let len = chars.len();
    let mut attrs = HashMap::new();
    let mut i = 0;

    while i < len {
        while i < len && (chars[i].is_whitespace() || chars[i] == ',') {
            i += 1;
        }
        if i >= len {
            break;
        }

        let key_start = i;
        while i < len && chars[i] != '=' && chars[i] != ',' {
            i += 1;
        }
        if i >= len || chars[i] != '=' {
            return Err(GraphError::MalformedGraph(format!(
                "attribute without value in `{raw}`"
            )));
        }
        let key: String = chars[key_start..i].iter().collect();
        let key = key.trim().to_string();
        if key.is_empty() {
            return Err(GraphError::MalformedGraph(format!(
                "attribute without key in `{raw}`"
            )));
        }
        i += 1;

        while i < len && chars[i].is_whitespace() {
            i += 1;
        }

        let value = if i < len && (chars[i] == '"' || chars[i] == '\'') {
            let quote = chars[i];
            i += 1;
            let mut value = String::new();
            let mut closed = false;
            while i < len {
                match chars[i] {
                    '\\' if i + 1 < len => {
                        value.push(chars[i + 1]);
                        i += 2;
                    }
                    c if c == quote => {
                        closed = true;
                        i += 1;
                        break;
                    }
                    c => {
                        value.push(c);
                        i += 1;
                    }
                }
            }
            if !closed {
                return Err(GraphError::MalformedGraph(format!(
                    "unterminated quoted value in `{raw}`"
                )));
            }
            value
        } else {
            let value_start = i;
            while i < len && chars[i] != ',' {
                i += 1;
            }
            let value: String = chars[value_start..i].iter().collect();
            value.trim().to_string()
        };

        attrs.insert(key, value);
    }

    Ok(attrs)
}

fn unquote(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() >= 2 {
        let first = raw.chars().next();
        let last = raw.chars().last();
        if (first == Some('"') && last == Some('"'))
            || (first == Some('\'') && last == Some('\''))
        {
            return raw[1..raw.len() - 1].to_string();
        }
    }
    raw.to_string()
}

fn classify_node(id: &str, attrs: &HashMap<String, String>) -> GraphResult<GraphNode> {
    let kind = match attrs.get("shape").map(String::as_str) {
        Some("ellipse") => NodeKind::Theorem,
        Some("box") => NodeKind::Definition,
        Some(shape) => {
            return Err(GraphError::UnknownShape {
                node: id.to_string(),
                shape: shape.to_string(),
            })
        }
        None => {
            return Err(GraphError::MissingShape {
                node: id.to_string(),
            })
        }
    };

    let type_status = match attrs.get("color") {
        Some(color) => type_status_for_color(color),
        None => TypeStatus::Unknown,
    };
    let term_status = match attrs.get("fillcolor") {
        Some(fill) => term_status_for_fillcolor(fill),
        None => TermStatus::Unknown,
    };

    match attrs.get("label") {
        Some(label) if label != id => {
            return Err(GraphError::LabelMismatch {
                node: id.to_string(),
                label: label.to_string(),
            })
        }
        Some(_) => {}
        None => {
            return Err(GraphError::MissingLabel {
                node: id.to_string(),
            })
        }
    }

    if let Some(style) = attrs.get("style") {
        if style != "filled" {
            return Err(GraphError::UnknownNodeStyle {
                node: id.to_string(),
                style: style.to_string(),
            });
        }
    }

    Ok(GraphNode {
        kind,
        type_status,
        term_status,
        type_dependencies: Vec::new(),
        term_dependencies: Vec::new(),
        content: String::new(),
    })
}

fn type_status_for_color(color: &str) -> TypeStatus {
    match color {
        "green" => TypeStatus::Stated,
        "blue" => TypeStatus::CanState,
        "#FFAA33" => TypeStatus::NotReady,
        "darkgreen" => TypeStatus::Mathlib,
        _ => TypeStatus::Unrecognized,
    }
}

fn term_status_for_fillcolor(fillcolor: &str) -> TermStatus {
    match fillcolor {
        "#9CEC8B" => TermStatus::Proved,
        "#B0ECA3" => TermStatus::Defined,
        "#A3D6FF" => TermStatus::CanProve,
        "#1CAC78" => TermStatus::FullyProved,
        _ => TermStatus::Unrecognized,
    }
}
