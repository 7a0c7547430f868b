//! `atomize` subcommand: resolve and enrich the tracked structure.
//!
//! Source projects run the code-intelligence tool, reconcile every entry
//! against the fresh atom batch, and enrich resolved entries with full
//! provenance. Blueprint projects re-populate entry metadata from the
//! decoded graph snapshot.

use crate::commands::{load_structure, save_structure};
use crate::config::{ConfigPaths, StructureForm, StructureKind, BLUEPRINT_PREFIX};
use crate::error::{CliError, CliResult};
use crate::tool::{run_checked, PROBE_BIN};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use veritrack_core::reconcile::reconcile_all;
use veritrack_core::{AtomBatch, GraphNode, IntervalIndex, Structure};

pub fn run(paths: &ConfigPaths, update_stubs: bool) -> CliResult<()> {
    match paths.config.kind {
        StructureKind::Blueprint => atomize_blueprint(paths),
        StructureKind::Source => atomize_source(paths, update_stubs),
    }
}

fn atomize_source(paths: &ConfigPaths, update_stubs: bool) -> CliResult<()> {
    let atoms = generate_atoms(paths)?;
    let index = IntervalIndex::build(&atoms);
    println!("Indexed {} source files", index.file_count());

    let mut structure = load_structure(paths)?;
    println!("Loaded {} structure entries", structure.len());

    // The files form holds hand-edited stubs; their identity fields are
    // only rewritten when explicitly requested.
    let reconcile = paths.config.form == StructureForm::Json || update_stubs;
    if reconcile {
        let report = reconcile_all(structure.entries_mut(), &index, &atoms);
        println!(
            "Reconciled: {} resolved, {} failed, {} skipped, {} warnings",
            report.resolved,
            report.failed,
            report.skipped,
            report.warnings.len()
        );
    }

    let report = structure.enrich(&atoms);
    println!(
        "Enriched {} entries ({} skipped)",
        report.enriched, report.skipped
    );

    save_structure(&structure, paths)?;
    println!("Structure saved");
    Ok(())
}

/// Runs the tool's `atomize` pass and loads the batch it produced,
/// narrowed to the configured namespace.
fn generate_atoms(paths: &ConfigPaths) -> CliResult<AtomBatch> {
    if let Some(parent) = paths.atoms_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let root = paths.project_root.to_string_lossy();
    let out = paths.atoms_path.to_string_lossy();
    println!("Running {PROBE_BIN} atomize on {root}...");
    run_checked(
        PROBE_BIN,
        &["atomize", &root, "-o", &out, "-r"],
        Some(&paths.project_root),
    )?;
    println!("Atom batch saved to {out}");

    let mut batch = AtomBatch::from_json(&std::fs::read_to_string(&paths.atoms_path)?)?;
    if !paths.config.atom_prefix.is_empty() {
        batch = batch.retain_prefix(&paths.config.atom_prefix);
    }
    println!("Loaded {} atoms", batch.len());
    Ok(batch)
}

fn atomize_blueprint(paths: &ConfigPaths) -> CliResult<()> {
    if !paths.graph_path.exists() {
        return Err(CliError::Config(format!(
            "{} not found; run `veritrack create` first",
            paths.graph_path.display()
        )));
    }

    println!("Loading graph snapshot from {}...", paths.graph_path.display());
    let nodes: BTreeMap<String, GraphNode> =
        serde_json::from_str(&std::fs::read_to_string(&paths.graph_path)?)?;

    let mut structure = load_structure(paths)?;
    let (populated, skipped) = populate_from_graph(&mut structure, &nodes);
    println!("Populated {populated} entries ({skipped} skipped)");

    save_structure(&structure, paths)?;
    println!("Structure saved");
    Ok(())
}

/// Refreshes each entry's dependency metadata from the graph snapshot.
fn populate_from_graph(
    structure: &mut Structure,
    nodes: &BTreeMap<String, GraphNode>,
) -> (usize, usize) {
    let mut populated = 0;
    let mut skipped = 0;

    for (key, entry) in structure.entries_mut().iter_mut() {
        let node = entry
            .atom_id
            .as_deref()
            .and_then(|id| id.strip_prefix(BLUEPRINT_PREFIX))
            .and_then(|id| nodes.get(id));
        let Some(node) = node else {
            eprintln!("Warning: no graph node for {key}");
            skipped += 1;
            continue;
        };

        let dependencies: Vec<Value> = node
            .type_dependencies
            .iter()
            .chain(node.term_dependencies.iter())
            .map(|dep| json!(format!("{BLUEPRINT_PREFIX}{dep}")))
            .collect();
        entry
            .metadata
            .insert("dependencies".to_string(), Value::Array(dependencies));
        entry.metadata.insert("visible".to_string(), json!(true));
        if entry.body.is_none() && !node.content.is_empty() {
            entry.body = Some(node.content.clone());
        }
        populated += 1;
    }

    (populated, skipped)
}

#[cfg(test)]
mod tests {
    use super::populate_from_graph;
    use serde_json::json;
    use std::collections::BTreeMap;
    use veritrack_core::{GraphNode, NodeKind, Structure, TermStatus, TypeStatus};

    #[test]
    fn population_merges_dependencies_and_skips_unknown_nodes() {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "thm_main".to_string(),
            GraphNode {
                kind: NodeKind::Theorem,
                type_status: TypeStatus::Stated,
                term_status: TermStatus::CanProve,
                type_dependencies: vec!["def_base".to_string()],
                term_dependencies: vec!["lem_aux".to_string()],
                content: "statement".to_string(),
            },
        );

        let mut structure = Structure::from_graph(&nodes, "bp:");
        structure.insert("stray.md".to_string(), Default::default());

        let (populated, skipped) = populate_from_graph(&mut structure, &nodes);
        assert_eq!((populated, skipped), (1, 1));

        let entry = structure.get("thm_main.md").unwrap();
        assert_eq!(
            entry.metadata.get("dependencies"),
            Some(&json!(["bp:def_base", "bp:lem_aux"]))
        );
        assert_eq!(entry.metadata.get("visible"), Some(&json!(true)));
    }
}
