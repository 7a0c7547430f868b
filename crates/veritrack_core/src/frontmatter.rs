//! YAML front matter parsing and rendering for structure markdown files.
//!
//! # Responsibility
//! - Split `---`-delimited metadata from the prose body.
//! - Render metadata back with quoting conservative enough that a later
//!   parse sees the same scalars.
//!
//! # Invariants
//! - Metadata is a flat mapping; nested mappings are rejected on write.
//! - A rewrite preserves the body byte-for-byte.

use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const DELIMITER: &str = "---";

pub type FrontmatterResult<T> = Result<T, FrontmatterError>;

#[derive(Debug)]
pub enum FrontmatterError {
    Io(std::io::Error),
    /// The document does not begin with a front matter block.
    Missing,
    Yaml(serde_yaml::Error),
    /// A value shape the flat metadata mapping cannot carry.
    Unsupported(String),
}

impl Display for FrontmatterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "front matter io error: {err}"),
            Self::Missing => write!(f, "no front matter found"),
            Self::Yaml(err) => write!(f, "front matter is not valid YAML: {err}"),
            Self::Unsupported(detail) => write!(f, "unsupported metadata value: {detail}"),
        }
    }
}

impl Error for FrontmatterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Yaml(err) => Some(err),
            Self::Missing | Self::Unsupported(_) => None,
        }
    }
}

impl From<std::io::Error> for FrontmatterError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_yaml::Error> for FrontmatterError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Yaml(value)
    }
}

/// Splits a document into its metadata mapping and optional body.
pub fn split(content: &str) -> FrontmatterResult<(BTreeMap<String, Value>, Option<String>)> {
    let mut lines = content.lines();
    if lines.next() != Some(DELIMITER) {
        return Err(FrontmatterError::Missing);
    }

    let mut yaml_lines = Vec::new();
    let mut closed = false;
    for line in lines.by_ref() {
        if line == DELIMITER {
            closed = true;
            break;
        }
        yaml_lines.push(line);
    }
    if !closed {
        return Err(FrontmatterError::Missing);
    }

    let metadata: BTreeMap<String, Value> = if yaml_lines.is_empty() {
        BTreeMap::new()
    } else {
        serde_yaml::from_str(&yaml_lines.join("\n"))?
    };

    let rest: Vec<&str> = lines.collect();
    let body = rest.join("\n");
    let body = body.strip_prefix('\n').unwrap_or(&body).to_string();
    let body = if body.trim().is_empty() {
        None
    } else {
        Some(body)
    };

    Ok((metadata, body))
}

/// Renders metadata and body into a full document.
pub fn render(metadata: &BTreeMap<String, Value>, body: Option<&str>) -> FrontmatterResult<String> {
    let mut out = String::new();
    out.push_str(DELIMITER);
    out.push('\n');
    for (key, value) in metadata {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(&format_scalar(value)?);
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');
    out.push('\n');

    if let Some(body) = body {
        out.push_str(body);
        if !body.ends_with('\n') {
            out.push('\n');
        }
    }
    Ok(out)
}

/// Writes a markdown file with front matter, creating parent directories.
pub fn write_file(
    path: &Path,
    metadata: &BTreeMap<String, Value>,
    body: Option<&str>,
) -> FrontmatterResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render(metadata, body)?)?;
    Ok(())
}

/// Formats one value as a YAML scalar, quoting anything a YAML parser
/// could misread as syntax.
fn format_scalar(value: &Value) -> FrontmatterResult<String> {
    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => {
            if needs_quoting(s) {
                let escaped = s
                    .replace('\\', "\\\\")
                    .replace('"', "\\\"")
                    .replace('\n', "\\n");
                Ok(format!("\"{escaped}\""))
            } else {
                Ok(s.clone())
            }
        }
        Value::Array(items) => {
            let rendered: FrontmatterResult<Vec<String>> =
                items.iter().map(format_scalar).collect();
            Ok(format!("[{}]", rendered?.join(", ")))
        }
        Value::Object(_) => Err(FrontmatterError::Unsupported(
            "nested mappings are not supported in metadata".to_string(),
        )),
    }
}

fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || matches!(s, "null" | "true" | "false" | "~")
        || s.starts_with(['{', '[', '\'', '"', '|', '>', '*', '&', '!'])
        || s.contains(':')
        || s.contains('#')
        || s.contains('\n')
}

#[cfg(test)]
mod tests {
    use super::{render, split, FrontmatterError};
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    fn metadata(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn render_then_split_round_trips_awkward_scalars() {
        let meta = metadata(&[
            ("code-path", json!("src/lib.rs")),
            ("code-line", json!(17)),
            ("code-name", json!("ns:demo/1.0/lib#f()")),
            ("note", json!("contains: colon #hash")),
            ("empty", json!("")),
            ("deps", json!(["bp:a", "bp:b"])),
            ("resolved", json!(null)),
        ]);

        let doc = render(&meta, Some("Body line one.\n\nBody line two.")).expect("render");
        let (parsed, body) = split(&doc).expect("split");

        assert_eq!(parsed, meta);
        assert_eq!(body.as_deref(), Some("Body line one.\n\nBody line two."));
    }

    #[test]
    fn document_without_front_matter_is_missing() {
        assert!(matches!(
            split("# just markdown\n"),
            Err(FrontmatterError::Missing)
        ));
        assert!(matches!(
            split("---\nunclosed: true\n"),
            Err(FrontmatterError::Missing)
        ));
    }

    #[test]
    fn nested_mapping_is_rejected_on_write() {
        let meta = metadata(&[("nested", json!({"a": 1}))]);
        assert!(matches!(
            render(&meta, None),
            Err(FrontmatterError::Unsupported(_))
        ));
    }

    #[test]
    fn body_absent_when_nothing_follows_the_block() {
        let (_, body) = split("---\nkey: value\n---\n\n").expect("split");
        assert!(body.is_none());
    }
}
