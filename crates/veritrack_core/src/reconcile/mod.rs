//! Reconciliation of tracked entries against the current atom batch.
//!
//! # Responsibility
//! - Resolve each structure entry to a canonical atom identity.
//! - Detect and report drift between recorded and discovered provenance.
//!
//! # Invariants
//! - A recorded atom id that exists in the batch is ground truth; recorded
//!   file/line are overwritten to match it, never the other way around.
//! - Failed entries are retained unmodified, never dropped.
//! - Every soft condition surfaces in the report; nothing vanishes into a
//!   silent partial success.

use crate::index::IntervalIndex;
use crate::model::atom::AtomBatch;
use crate::model::entry::{StructureEntry, FIELD_FILE, FIELD_LINE};
use log::warn;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Soft conditions: reported and logged, processing continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileWarning {
    /// A recorded field disagrees with the atom batch and was overwritten.
    StaleField {
        key: String,
        field: &'static str,
        stale: String,
        replacement: String,
    },
    /// The recorded atom id is absent from this run's batch; resolution
    /// falls through to position. This can silently re-bind the entry to
    /// a different atom after a rename; the warning is the only trace.
    UnknownAtomId { key: String, atom_id: String },
    /// Entry carries neither a usable atom id nor a complete position.
    MissingPosition { key: String },
    /// More than one atom begins at the recorded line; the first (by id
    /// order) was chosen.
    AmbiguousStart {
        key: String,
        file: String,
        line: u32,
        count: usize,
    },
}

impl Display for ReconcileWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StaleField {
                key,
                field,
                stale,
                replacement,
            } => write!(
                f,
                "{field} mismatch for {key}: `{stale}` overwritten with `{replacement}`"
            ),
            Self::UnknownAtomId { key, atom_id } => write!(
                f,
                "atom id `{atom_id}` for {key} not in current batch; resolving by position"
            ),
            Self::MissingPosition { key } => {
                write!(f, "missing {FIELD_FILE} or {FIELD_LINE} for {key}; entry skipped")
            }
            Self::AmbiguousStart {
                key,
                file,
                line,
                count,
            } => write!(
                f,
                "{count} atoms start at {file}:{line} for {key}; first by id order chosen"
            ),
        }
    }
}

/// Soft per-entry failures: the entry stays unresolved but present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionFailure {
    /// The recorded file is unknown to the external tool entirely.
    FileNotIndexed { key: String, file: String },
    /// No atom begins at the recorded line.
    NoAtomAtLine { key: String, file: String, line: u32 },
}

impl Display for ResolutionFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileNotIndexed { key, file } => {
                write!(f, "{FIELD_FILE} `{file}` not found in index for {key}")
            }
            Self::NoAtomAtLine { key, file, line } => {
                write!(f, "no atom starting at line {line} in {file} for {key}")
            }
        }
    }
}

/// How one entry fared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Entry carries a correct atom id after this run.
    Resolved,
    /// Entry was not actionable (missing identity fields); left as-is.
    Skipped,
    /// Position-based resolution failed; entry left unmodified.
    Failed(ResolutionFailure),
}

/// Result of reconciling a single entry.
#[derive(Debug)]
pub struct EntryReconciliation {
    pub outcome: Outcome,
    pub warnings: Vec<ReconcileWarning>,
}

/// Aggregate result of a batch pass.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub resolved: usize,
    pub failed: usize,
    pub skipped: usize,
    pub warnings: Vec<ReconcileWarning>,
    pub failures: Vec<ResolutionFailure>,
}

/// Reconciles one entry in place.
///
/// Priority order: a live recorded atom id wins and never touches the
/// index; otherwise the entry is resolved purely by recorded position.
pub fn reconcile_entry(
    key: &str,
    entry: &mut StructureEntry,
    index: &IntervalIndex,
    atoms: &AtomBatch,
) -> EntryReconciliation {
    let mut warnings = Vec::new();

    if let Some(atom_id) = entry.atom_id.clone() {
        if let Some(atom) = atoms.get(&atom_id) {
            // Only fields the atom actually carries are overwritten; an
            // atom without location leaves the recorded values alone.
            if let Some(file) = &atom.file {
                if entry.recorded_file.as_deref() != Some(file.as_str()) {
                    warnings.push(ReconcileWarning::StaleField {
                        key: key.to_string(),
                        field: FIELD_FILE,
                        stale: field_text(entry.recorded_file.as_deref()),
                        replacement: file.clone(),
                    });
                }
                entry.recorded_file = Some(file.clone());
            }
            if let Some(line) = atom.span.map(|span| span.start) {
                if entry.recorded_line != Some(line) {
                    warnings.push(ReconcileWarning::StaleField {
                        key: key.to_string(),
                        field: FIELD_LINE,
                        stale: field_text(entry.recorded_line.map(|l| l.to_string()).as_deref()),
                        replacement: line.to_string(),
                    });
                }
                entry.recorded_line = Some(line);
            }
            return finish(key, Outcome::Resolved, warnings);
        }

        warnings.push(ReconcileWarning::UnknownAtomId {
            key: key.to_string(),
            atom_id,
        });
    }

    let (Some(file), Some(line)) = (entry.recorded_file.clone(), entry.recorded_line) else {
        warnings.push(ReconcileWarning::MissingPosition {
            key: key.to_string(),
        });
        return finish(key, Outcome::Skipped, warnings);
    };

    let Some(matches) = index.starting_at(&file, line) else {
        let failure = ResolutionFailure::FileNotIndexed {
            key: key.to_string(),
            file,
        };
        return finish(key, Outcome::Failed(failure), warnings);
    };

    if matches.is_empty() {
        let failure = ResolutionFailure::NoAtomAtLine {
            key: key.to_string(),
            file,
            line,
        };
        return finish(key, Outcome::Failed(failure), warnings);
    }

    if matches.len() > 1 {
        warnings.push(ReconcileWarning::AmbiguousStart {
            key: key.to_string(),
            file: file.clone(),
            line,
            count: matches.len(),
        });
    }

    entry.atom_id = Some(matches[0].clone());
    finish(key, Outcome::Resolved, warnings)
}

/// Reconciles every entry of a structure, in key order.
pub fn reconcile_all(
    entries: &mut BTreeMap<String, StructureEntry>,
    index: &IntervalIndex,
    atoms: &AtomBatch,
) -> BatchReport {
    let mut report = BatchReport::default();

    for (key, entry) in entries.iter_mut() {
        let result = reconcile_entry(key, entry, index, atoms);
        report.warnings.extend(result.warnings);
        match result.outcome {
            Outcome::Resolved => report.resolved += 1,
            Outcome::Skipped => report.skipped += 1,
            Outcome::Failed(failure) => {
                report.failed += 1;
                report.failures.push(failure);
            }
        }
    }

    log::info!(
        "event=reconcile_batch module=reconcile status=ok resolved={} failed={} skipped={} warnings={}",
        report.resolved,
        report.failed,
        report.skipped,
        report.warnings.len()
    );
    report
}

fn finish(key: &str, outcome: Outcome, warnings: Vec<ReconcileWarning>) -> EntryReconciliation {
    for warning in &warnings {
        warn!("event=reconcile_warning module=reconcile key={key} detail=\"{warning}\"");
    }
    if let Outcome::Failed(failure) = &outcome {
        warn!("event=resolution_failed module=reconcile key={key} detail=\"{failure}\"");
    }
    EntryReconciliation { outcome, warnings }
}

fn field_text(value: Option<&str>) -> String {
    value.unwrap_or("(none)").to_string()
}

#[cfg(test)]
mod tests {
    use super::{reconcile_entry, Outcome, ReconcileWarning, ResolutionFailure};
    use crate::index::IntervalIndex;
    use crate::model::atom::AtomBatch;
    use crate::model::entry::StructureEntry;
    use serde_json::json;

    fn atoms() -> AtomBatch {
        AtomBatch::from_json(
            r#"{
                "ns:demo/1.0/a#moved()": {
                    "code-path": "src/new.rs",
                    "code-text": {"lines-start": 50, "lines-end": 60}
                },
                "ns:demo/1.0/a#fresh()": {
                    "code-path": "src/a.rs",
                    "code-text": {"lines-start": 10, "lines-end": 20}
                },
                "ns:demo/1.0/a#twin_a()": {
                    "code-path": "src/twin.rs",
                    "code-text": {"lines-start": 7, "lines-end": 9}
                },
                "ns:demo/1.0/a#twin_b()": {
                    "code-path": "src/twin.rs",
                    "code-text": {"lines-start": 7, "lines-end": 12}
                },
                "ns:demo/1.0/a#unplaced()": {
                    "code-module": "a"
                }
            }"#,
        )
        .expect("batch should parse")
    }

    fn entry(value: serde_json::Value) -> StructureEntry {
        StructureEntry::from_value(&value)
    }

    #[test]
    fn live_atom_id_overwrites_stale_position() {
        let atoms = atoms();
        let index = IntervalIndex::build(&atoms);
        let mut e = entry(json!({
            "code-path": "src/old.rs",
            "code-line": 5,
            "code-name": "ns:demo/1.0/a#moved()"
        }));

        let result = reconcile_entry("k", &mut e, &index, &atoms);
        assert_eq!(result.outcome, Outcome::Resolved);
        assert_eq!(result.warnings.len(), 2);
        assert!(result
            .warnings
            .iter()
            .all(|w| matches!(w, ReconcileWarning::StaleField { .. })));
        assert_eq!(e.recorded_file.as_deref(), Some("src/new.rs"));
        assert_eq!(e.recorded_line, Some(50));
        assert_eq!(e.atom_id.as_deref(), Some("ns:demo/1.0/a#moved()"));
    }

    #[test]
    fn matching_atom_id_emits_no_warnings() {
        let atoms = atoms();
        let index = IntervalIndex::build(&atoms);
        let mut e = entry(json!({
            "code-path": "src/new.rs",
            "code-line": 50,
            "code-name": "ns:demo/1.0/a#moved()"
        }));

        let result = reconcile_entry("k", &mut e, &index, &atoms);
        assert_eq!(result.outcome, Outcome::Resolved);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn atom_without_location_keeps_recorded_fields() {
        let atoms = atoms();
        let index = IntervalIndex::build(&atoms);
        let mut e = entry(json!({
            "code-path": "src/somewhere.rs",
            "code-line": 3,
            "code-name": "ns:demo/1.0/a#unplaced()"
        }));

        let result = reconcile_entry("k", &mut e, &index, &atoms);
        assert_eq!(result.outcome, Outcome::Resolved);
        assert!(result.warnings.is_empty());
        assert_eq!(e.recorded_file.as_deref(), Some("src/somewhere.rs"));
        assert_eq!(e.recorded_line, Some(3));
    }

    #[test]
    fn stale_atom_id_falls_through_to_position() {
        let atoms = atoms();
        let index = IntervalIndex::build(&atoms);
        let mut e = entry(json!({
            "code-path": "src/a.rs",
            "code-line": 10,
            "code-name": "ns:demo/1.0/a#renamed_away()"
        }));

        let result = reconcile_entry("k", &mut e, &index, &atoms);
        assert_eq!(result.outcome, Outcome::Resolved);
        assert!(matches!(
            result.warnings[0],
            ReconcileWarning::UnknownAtomId { .. }
        ));
        assert_eq!(e.atom_id.as_deref(), Some("ns:demo/1.0/a#fresh()"));
    }

    #[test]
    fn unique_position_match_resolves_cleanly() {
        let atoms = atoms();
        let index = IntervalIndex::build(&atoms);
        let mut e = entry(json!({"code-path": "src/a.rs", "code-line": 10}));

        let result = reconcile_entry("k", &mut e, &index, &atoms);
        assert_eq!(result.outcome, Outcome::Resolved);
        assert!(result.warnings.is_empty());
        assert_eq!(e.atom_id.as_deref(), Some("ns:demo/1.0/a#fresh()"));
    }

    #[test]
    fn ambiguous_start_warns_and_picks_first() {
        let atoms = atoms();
        let index = IntervalIndex::build(&atoms);
        let mut e = entry(json!({"code-path": "src/twin.rs", "code-line": 7}));

        let result = reconcile_entry("k", &mut e, &index, &atoms);
        assert_eq!(result.outcome, Outcome::Resolved);
        assert!(matches!(
            result.warnings[0],
            ReconcileWarning::AmbiguousStart { count: 2, .. }
        ));
        assert_eq!(e.atom_id.as_deref(), Some("ns:demo/1.0/a#twin_a()"));
    }

    #[test]
    fn missing_position_is_skipped_with_warning() {
        let atoms = atoms();
        let index = IntervalIndex::build(&atoms);
        let mut e = entry(json!({"code-path": "src/a.rs"}));

        let result = reconcile_entry("k", &mut e, &index, &atoms);
        assert_eq!(result.outcome, Outcome::Skipped);
        assert!(matches!(
            result.warnings[0],
            ReconcileWarning::MissingPosition { .. }
        ));
        assert!(e.atom_id.is_none());
    }

    #[test]
    fn unknown_file_is_a_failure_distinct_from_no_match() {
        let atoms = atoms();
        let index = IntervalIndex::build(&atoms);

        let mut ghost = entry(json!({"code-path": "src/ghost.rs", "code-line": 1}));
        let result = reconcile_entry("k", &mut ghost, &index, &atoms);
        assert!(matches!(
            result.outcome,
            Outcome::Failed(ResolutionFailure::FileNotIndexed { .. })
        ));

        let mut inside = entry(json!({"code-path": "src/a.rs", "code-line": 15}));
        let result = reconcile_entry("k", &mut inside, &index, &atoms);
        assert!(matches!(
            result.outcome,
            Outcome::Failed(ResolutionFailure::NoAtomAtLine { line: 15, .. })
        ));
        assert!(inside.atom_id.is_none());
    }
}
