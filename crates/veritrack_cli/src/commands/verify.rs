//! `verify` subcommand: sync the verification certificate ledger.
//!
//! Source projects run the tool's `verify` pass; blueprint projects read
//! qualification off the decoded graph snapshot. Either way the verify
//! cert store is brought in line with the results, bounded by the
//! tracked scope.

use crate::config::{ConfigPaths, StructureKind, BLUEPRINT_PREFIX};
use crate::error::{CliError, CliResult};
use crate::tool::{run_checked, PROBE_BIN};
use std::collections::BTreeMap;
use veritrack_core::model::atom::display_name;
use veritrack_core::status::{graph_verification, partition_verification, VerificationResults};
use veritrack_core::{CertStore, GraphNode, SyncReport};

pub fn run(paths: &ConfigPaths, only_module: Option<&str>) -> CliResult<()> {
    let results = match paths.config.kind {
        StructureKind::Source => run_tool_verify(paths, only_module)?,
        StructureKind::Blueprint => {
            if only_module.is_some() {
                eprintln!("Warning: --only-module is ignored for blueprint projects");
            }
            graph_results(paths)?
        }
    };

    println!("\nVerification summary:");
    println!("  Verified: {}", results.verified.len());
    println!("  Failed: {}", results.failed.len());

    let structure = super::load_structure(paths)?;
    let scope = structure.names();
    println!("  Tracked in structure: {}", scope.len());

    let store = CertStore::new(&paths.certs_verify_dir);
    let report = store.sync(&results.verified, &scope)?;
    print_changes(&report);

    Ok(())
}

fn run_tool_verify(
    paths: &ConfigPaths,
    only_module: Option<&str>,
) -> CliResult<VerificationResults> {
    if let Some(parent) = paths.proofs_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let root = paths.project_root.to_string_lossy();
    let out = paths.proofs_path.to_string_lossy();
    let atoms = paths.atoms_path.to_string_lossy();
    let mut args = vec!["verify", root.as_ref(), "-o", out.as_ref(), "-a", atoms.as_ref()];
    if let Some(module) = only_module {
        args.push("--only-module");
        args.push(module);
        println!("Running {PROBE_BIN} verify on {root} (module: {module})...");
    } else {
        println!("Running {PROBE_BIN} verify on {root}...");
    }

    run_checked(PROBE_BIN, &args, Some(&paths.project_root))?;
    println!("Verification results saved to {out}");

    let proofs = serde_json::from_str(&std::fs::read_to_string(&paths.proofs_path)?)?;
    Ok(partition_verification(&proofs)?)
}

fn graph_results(paths: &ConfigPaths) -> CliResult<VerificationResults> {
    if !paths.graph_path.exists() {
        return Err(CliError::Config(format!(
            "{} not found; run `veritrack create` first",
            paths.graph_path.display()
        )));
    }

    println!("Reading verification status from {}...", paths.graph_path.display());
    let nodes: BTreeMap<String, GraphNode> =
        serde_json::from_str(&std::fs::read_to_string(&paths.graph_path)?)?;
    Ok(graph_verification(&nodes, BLUEPRINT_PREFIX))
}

fn print_changes(report: &SyncReport) {
    println!();
    println!("{}", "=".repeat(60));
    println!("VERIFICATION CERT CHANGES");
    println!("{}", "=".repeat(60));

    if report.created_count() > 0 {
        println!("\nCreated {} new certs:", report.created_count());
        for change in report.created() {
            println!("  + {}", display_name(&change.id));
            println!("    {}", change.id);
        }
    } else {
        println!("\nNo new certs created");
    }

    if report.deleted_count() > 0 {
        println!("\nDeleted {} certs (verification failed):", report.deleted_count());
        for change in report.deleted() {
            println!("  - {}", display_name(&change.id));
            println!("    {}", change.id);
        }
    } else {
        println!("\nNo certs deleted");
    }

    println!();
    println!("{}", "=".repeat(60));
    println!("Total certs: {} -> {}", report.existing, report.total);
    println!("  Created: +{}", report.created_count());
    println!("  Deleted: -{}", report.deleted_count());
    println!("{}", "=".repeat(60));
}
