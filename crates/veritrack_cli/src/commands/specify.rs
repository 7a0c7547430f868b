//! `specify` subcommand: certify specification status interactively.
//!
//! Runs the tool's `specify` pass, narrows the specified set to the
//! tracked scope, and offers every still-uncertified identifier in a
//! selection menu. Chosen ones get a specify certificate.

use crate::config::ConfigPaths;
use crate::error::CliResult;
use crate::menu::{select, MenuItem};
use crate::tool::{run_checked, PROBE_BIN};
use serde_json::Value;
use std::collections::BTreeSet;
use veritrack_core::model::atom::display_name;
use veritrack_core::status::specified_names;
use veritrack_core::CertStore;

pub fn run(paths: &ConfigPaths) -> CliResult<()> {
    let specs = generate_specs(paths)?;
    let specified = specified_names(&specs)?;
    println!("\nFound {} specified functions in codebase", specified.len());

    let structure = super::load_structure(paths)?;
    let scope = structure.names();
    println!("Found {} tracked functions in structure", scope.len());

    let in_scope: BTreeSet<&String> = specified.intersection(&scope).collect();
    println!("Found {} specified functions in structure", in_scope.len());

    let store = CertStore::new(&paths.certs_specify_dir);
    let existing = store.existing()?;
    println!("Found {} existing certs", existing.len());

    let uncertified: Vec<&String> = in_scope
        .into_iter()
        .filter(|id| !existing.contains(id.as_str()))
        .collect();
    if uncertified.is_empty() {
        println!("\nAll specified functions in structure are already certified!");
        return Ok(());
    }
    println!("\n{} specified functions need certification", uncertified.len());

    let items: Vec<MenuItem> = uncertified
        .iter()
        .map(|id| MenuItem {
            display: display_name(id),
            id: (*id).clone(),
        })
        .collect();
    let selected = select("Functions with specs but no certification:", &items)?;

    if selected.is_empty() {
        println!("\nNo functions selected.");
        return Ok(());
    }

    println!("\nCreating certs for {} functions...", selected.len());
    for index in selected {
        let path = store.create(&items[index].id)?;
        println!(
            "  Created: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );
    }
    println!("\nDone. Certs live in {}", store.dir().display());

    Ok(())
}

/// Runs the tool's `specify` pass and loads the document it produced.
fn generate_specs(paths: &ConfigPaths) -> CliResult<Value> {
    if let Some(parent) = paths.specs_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let root = paths.project_root.to_string_lossy();
    let out = paths.specs_path.to_string_lossy();
    let atoms = paths.atoms_path.to_string_lossy();
    println!("Running {PROBE_BIN} specify on {root}...");
    run_checked(
        PROBE_BIN,
        &["specify", &root, "-o", &out, "-a", &atoms],
        Some(&paths.project_root),
    )?;
    println!("Specs saved to {out}");

    Ok(serde_json::from_str(&std::fs::read_to_string(
        &paths.specs_path,
    )?)?)
}
