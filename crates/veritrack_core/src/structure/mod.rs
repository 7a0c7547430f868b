//! The tracked structure: loading, saving, seeding, and enrichment.
//!
//! # Responsibility
//! - Hold the ordered set of tracked entries keyed by relative path.
//! - Persist in both supported forms (one JSON mapping, or one markdown
//!   file per entry) with identical semantics.
//! - Seed entries from either ecosystem and enrich resolved entries with
//!   full provenance from the atom batch.
//!
//! # Invariants
//! - Entries are never deleted here; removal is a manual edit outside
//!   this core.
//! - Both persisted forms carry the same fields and reconcile
//!   identically.

use crate::frontmatter::{self, FrontmatterError};
use crate::model::atom::AtomBatch;
use crate::model::entry::StructureEntry;
use crate::model::node::GraphNode;
use log::warn;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use walkdir::WalkDir;

/// Enriched-entry metadata fields populated from the atom batch.
/// The span is stored as two flat fields so the front matter form can
/// carry it.
const FIELD_LINES_START: &str = "code-lines-start";
const FIELD_LINES_END: &str = "code-lines-end";
const FIELD_MODULE: &str = "code-module";
const FIELD_DEPENDENCIES: &str = "dependencies";
const FIELD_DISPLAY_NAME: &str = "display-name";

pub type StructureResult<T> = Result<T, StructureError>;

#[derive(Debug)]
pub enum StructureError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Frontmatter(FrontmatterError),
}

impl Display for StructureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "structure io error: {err}"),
            Self::Json(err) => write!(f, "structure is not valid JSON: {err}"),
            Self::Frontmatter(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StructureError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Frontmatter(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StructureError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StructureError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<FrontmatterError> for StructureError {
    fn from(value: FrontmatterError) -> Self {
        Self::Frontmatter(value)
    }
}

/// Counts from an enrichment pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EnrichReport {
    pub enriched: usize,
    pub skipped: usize,
}

/// Ordered collection of tracked entries keyed by relative path.
#[derive(Debug, Default)]
pub struct Structure {
    entries: BTreeMap<String, StructureEntry>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&StructureEntry> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, entry: StructureEntry) {
        self.entries.insert(key, entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StructureEntry)> {
        self.entries.iter()
    }

    pub fn entries_mut(&mut self) -> &mut BTreeMap<String, StructureEntry> {
        &mut self.entries
    }

    /// The scope set: every resolved atom identifier the structure tracks.
    pub fn names(&self) -> BTreeSet<String> {
        self.entries
            .values()
            .filter_map(|entry| entry.atom_id.clone())
            .collect()
    }

    // ------------------------------------------------------------------
    // JSON form
    // ------------------------------------------------------------------

    pub fn from_json_str(text: &str) -> StructureResult<Self> {
        let raw: HashMap<String, Value> = serde_json::from_str(text)?;
        let entries = raw
            .into_iter()
            .map(|(key, value)| (key, StructureEntry::from_value(&value)))
            .collect();
        Ok(Self { entries })
    }

    pub fn load_json(path: &Path) -> StructureResult<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn to_json_string(&self) -> StructureResult<String> {
        let map: serde_json::Map<String, Value> = self
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.to_value()))
            .collect();
        Ok(serde_json::to_string_pretty(&Value::Object(map))?)
    }

    pub fn save_json(&self, path: &Path) -> StructureResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Files form
    // ------------------------------------------------------------------

    /// Loads every markdown file under `root`. Files without parseable
    /// front matter are skipped with a warning; a missing root is an
    /// empty structure.
    pub fn load_files(root: &Path) -> StructureResult<Self> {
        let mut entries = BTreeMap::new();
        if !root.exists() {
            warn!(
                "event=structure_load module=structure status=missing root={}",
                root.display()
            );
            return Ok(Self { entries });
        }

        for walked in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            let path = walked.path();
            if !path.extension().is_some_and(|ext| ext == "md") {
                continue;
            }
            let content = std::fs::read_to_string(path)?;
            let (metadata, body) = match frontmatter::split(&content) {
                Ok(parsed) => parsed,
                Err(err) => {
                    warn!(
                        "event=structure_load module=structure status=skipped file={} detail=\"{err}\"",
                        path.display()
                    );
                    continue;
                }
            };

            let key = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .to_string();
            let mut entry = StructureEntry::from_metadata(&metadata);
            entry.body = body;
            entries.insert(key, entry);
        }
        Ok(Self { entries })
    }

    /// Writes one markdown file per entry under `root`, preserving each
    /// entry's body.
    pub fn save_files(&self, root: &Path) -> StructureResult<()> {
        for (key, entry) in &self.entries {
            let path = root.join(key);
            frontmatter::write_file(&path, &entry.to_metadata(), entry.body.as_deref())?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Seeding
    // ------------------------------------------------------------------

    /// Seeds a structure from decoded blueprint nodes.
    ///
    /// Each node becomes `<id>.md` with a namespaced atom id, a merged
    /// dependency list (type-level then term-level), and the node's
    /// content as body.
    pub fn from_graph(nodes: &BTreeMap<String, GraphNode>, prefix: &str) -> Self {
        let mut entries = BTreeMap::new();
        for (id, node) in nodes {
            let dependencies: Vec<Value> = node
                .type_dependencies
                .iter()
                .chain(node.term_dependencies.iter())
                .map(|dep| Value::String(format!("{prefix}{dep}")))
                .collect();

            let mut entry = StructureEntry {
                atom_id: Some(format!("{prefix}{id}")),
                ..StructureEntry::default()
            };
            entry
                .metadata
                .insert(FIELD_DEPENDENCIES.to_string(), Value::Array(dependencies));
            if !node.content.is_empty() {
                entry.body = Some(node.content.clone());
            }
            entries.insert(format!("{id}.md"), entry);
        }
        Self { entries }
    }

    /// Seeds a structure from the tracked-artifact list.
    ///
    /// Artifacts whose source link cannot be parsed are dropped; the
    /// caller disambiguates names beforehand.
    pub fn from_tracked(artifacts: &[TrackedArtifact]) -> Self {
        let mut entries = BTreeMap::new();
        for artifact in artifacts {
            let Some((file, line)) = parse_source_link(&artifact.link) else {
                continue;
            };
            if file.is_empty() {
                continue;
            }

            let key = format!("{file}/{}.md", artifact.name.replace("::", "."));
            let mut entry = StructureEntry {
                recorded_file: Some(file),
                recorded_line: Some(line),
                ..StructureEntry::default()
            };
            entry
                .metadata
                .insert(FIELD_MODULE.to_string(), json!(artifact.module));
            entry
                .metadata
                .insert(FIELD_DISPLAY_NAME.to_string(), json!(artifact.name));
            entry
                .metadata
                .insert("has-spec".to_string(), json!(artifact.has_spec));
            entry
                .metadata
                .insert("has-proof".to_string(), json!(artifact.has_proof));
            entries.insert(key, entry);
        }
        Self { entries }
    }

    // ------------------------------------------------------------------
    // Enrichment
    // ------------------------------------------------------------------

    /// Expands every resolved entry to the full provenance record from
    /// the atom batch (path, line span, module, dependencies, display
    /// name). Entries without a resolvable atom keep their current
    /// fields and are counted as skipped.
    pub fn enrich(&mut self, atoms: &AtomBatch) -> EnrichReport {
        let mut report = EnrichReport::default();

        for (key, entry) in self.entries.iter_mut() {
            let Some(atom_id) = entry.atom_id.clone() else {
                warn!("event=enrich module=structure status=skipped key={key} reason=unresolved");
                report.skipped += 1;
                continue;
            };
            let atom = atoms.get(&atom_id);
            let (Some(atom), Some(file), Some(span)) = (
                atom,
                atom.and_then(|a| a.file.as_ref()),
                atom.and_then(|a| a.span),
            ) else {
                warn!(
                    "event=enrich module=structure status=skipped key={key} reason=no_atom_data"
                );
                report.skipped += 1;
                continue;
            };

            entry.recorded_file = Some(file.clone());
            entry.recorded_line = Some(span.start);
            entry
                .metadata
                .insert(FIELD_LINES_START.to_string(), json!(span.start));
            entry
                .metadata
                .insert(FIELD_LINES_END.to_string(), json!(span.end));
            entry
                .metadata
                .insert(FIELD_MODULE.to_string(), json!(atom.module));
            entry
                .metadata
                .insert(FIELD_DEPENDENCIES.to_string(), json!(atom.dependencies));
            entry
                .metadata
                .insert(FIELD_DISPLAY_NAME.to_string(), json!(atom.display_name));
            report.enriched += 1;
        }

        log::info!(
            "event=enrich_batch module=structure status=ok enriched={} skipped={}",
            report.enriched,
            report.skipped
        );
        report
    }
}

/// One row of the tracked-artifact seed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedArtifact {
    pub name: String,
    pub module: String,
    pub link: String,
    pub has_spec: bool,
    pub has_proof: bool,
}

/// Extracts a relative path and line number from a source hosting link
/// of the form `.../blob/main/<path>#L<line>`. Links without a line
/// fragment yield line 0.
pub fn parse_source_link(link: &str) -> Option<(String, u32)> {
    let path_part = link.split("/blob/main/").nth(1)?;
    match path_part.rsplit_once("#L") {
        Some((file, line)) => {
            let line = line.parse().ok()?;
            Some((file.to_string(), line))
        }
        None => Some((path_part.to_string(), 0)),
    }
}

/// Suffixes duplicate artifact names (`name_0`, `name_1`, ...) in input
/// order so every tracked name is unique.
pub fn disambiguate(mut artifacts: Vec<TrackedArtifact>) -> Vec<TrackedArtifact> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for artifact in &artifacts {
        *counts.entry(artifact.name.clone()).or_insert(0) += 1;
    }

    let mut indices: HashMap<String, usize> = HashMap::new();
    for artifact in artifacts.iter_mut() {
        if counts[&artifact.name] > 1 {
            let index = indices.entry(artifact.name.clone()).or_insert(0);
            let renamed = format!("{}_{}", artifact.name, index);
            *index += 1;
            artifact.name = renamed;
        }
    }
    artifacts
}
