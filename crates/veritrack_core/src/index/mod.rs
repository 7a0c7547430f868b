//! Line-interval index over the source-atom batch.
//!
//! # Responsibility
//! - Map each source file to an interval tree of its atoms' line spans.
//! - Answer "which atoms cover line N" and "which atoms begin at line N".
//!
//! # Invariants
//! - Rebuilt from scratch every run; never persisted.
//! - Atoms without file or line information are skipped, not an error.
//! - Lookup results are deterministically ordered (ties broken by id).

use crate::model::atom::{AtomBatch, AtomId};
use intervaltree::IntervalTree;
use std::collections::HashMap;
use std::ops::Range;

/// Per-file interval trees keyed to atom ids.
///
/// Intervals are half-open `[line_start, line_end + 1)` so an inclusive
/// span covers exactly its own lines.
#[derive(Debug)]
pub struct IntervalIndex {
    trees: HashMap<String, IntervalTree<u32, AtomId>>,
}

impl IntervalIndex {
    /// Builds the index by grouping the batch's placeable atoms per file.
    pub fn build(batch: &AtomBatch) -> Self {
        let mut spans: HashMap<String, Vec<(Range<u32>, AtomId)>> = HashMap::new();

        for (id, atom) in batch.iter() {
            let (Some(file), Some(span)) = (&atom.file, atom.span) else {
                continue;
            };
            spans
                .entry(file.clone())
                .or_default()
                .push((span.start..span.end + 1, id.clone()));
        }

        let trees = spans
            .into_iter()
            .map(|(file, mut intervals)| {
                // Fixed insertion order keeps query results stable across runs.
                intervals.sort_by(|a, b| (a.0.start, a.0.end, &a.1).cmp(&(b.0.start, b.0.end, &b.1)));
                (file, intervals.into_iter().collect())
            })
            .collect();

        Self { trees }
    }

    /// Whether any atom of `file` made it into the index at all.
    pub fn has_file(&self, file: &str) -> bool {
        self.trees.contains_key(file)
    }

    pub fn file_count(&self) -> usize {
        self.trees.len()
    }

    /// All atoms whose span contains `line`, or `None` when the file is
    /// not indexed. Callers must treat `None` differently from an empty
    /// vector: an unknown file is a resolution failure, an empty result
    /// merely means no atom covers the line.
    pub fn covering(&self, file: &str, line: u32) -> Option<Vec<&AtomId>> {
        self.trees.get(file).map(|tree| {
            let mut ids: Vec<&AtomId> = tree
                .query_point(line)
                .map(|element| &element.value)
                .collect();
            ids.sort();
            ids
        })
    }

    /// Atoms whose span begins exactly at `line` ("does this line begin a
    /// known atom"), or `None` when the file is not indexed.
    pub fn starting_at(&self, file: &str, line: u32) -> Option<Vec<&AtomId>> {
        self.trees.get(file).map(|tree| {
            let mut ids: Vec<&AtomId> = tree
                .query_point(line)
                .filter(|element| element.range.start == line)
                .map(|element| &element.value)
                .collect();
            ids.sort();
            ids
        })
    }
}

#[cfg(test)]
mod tests {
    use super::IntervalIndex;
    use crate::model::atom::AtomBatch;

    fn batch() -> AtomBatch {
        AtomBatch::from_json(
            r#"{
                "ns:demo/1.0/a#outer()": {
                    "code-path": "src/a.rs",
                    "code-text": {"lines-start": 10, "lines-end": 30}
                },
                "ns:demo/1.0/a#inner()": {
                    "code-path": "src/a.rs",
                    "code-text": {"lines-start": 12, "lines-end": 18}
                },
                "ns:demo/1.0/a#twin()": {
                    "code-path": "src/a.rs",
                    "code-text": {"lines-start": 10, "lines-end": 14}
                },
                "ns:demo/1.0/b#only()": {
                    "code-path": "src/b.rs",
                    "code-text": {"lines-start": 3, "lines-end": 5}
                },
                "ns:demo/1.0/nowhere#lost()": {
                    "code-module": "nowhere"
                }
            }"#,
        )
        .expect("batch should parse")
    }

    #[test]
    fn build_skips_atoms_without_location() {
        let index = IntervalIndex::build(&batch());
        assert_eq!(index.file_count(), 2);
        assert!(index.has_file("src/a.rs"));
        assert!(!index.has_file("src/nowhere.rs"));
    }

    #[test]
    fn boundaries_are_inclusive_start_and_end() {
        let index = IntervalIndex::build(&batch());

        let at_start = index.covering("src/b.rs", 3).expect("file indexed");
        assert_eq!(at_start, vec!["ns:demo/1.0/b#only()"]);

        let at_end = index.covering("src/b.rs", 5).expect("file indexed");
        assert_eq!(at_end.len(), 1);

        assert!(index.covering("src/b.rs", 2).expect("file indexed").is_empty());
        assert!(index.covering("src/b.rs", 6).expect("file indexed").is_empty());
    }

    #[test]
    fn starting_at_requires_exact_start_line() {
        let index = IntervalIndex::build(&batch());

        // Line 12 is inside outer() but begins inner() only.
        let starts = index.starting_at("src/a.rs", 12).expect("file indexed");
        assert_eq!(starts, vec!["ns:demo/1.0/a#inner()"]);

        // Two atoms begin at line 10; results are sorted by id.
        let twins = index.starting_at("src/a.rs", 10).expect("file indexed");
        assert_eq!(
            twins,
            vec!["ns:demo/1.0/a#outer()", "ns:demo/1.0/a#twin()"]
        );
    }

    #[test]
    fn unknown_file_is_none_not_empty() {
        let index = IntervalIndex::build(&batch());
        assert!(index.starting_at("src/ghost.rs", 1).is_none());
        assert!(index.covering("src/ghost.rs", 1).is_none());
    }
}
