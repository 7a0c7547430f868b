//! `create` subcommand: seed the tracked structure.
//!
//! Blueprint projects run the blueprint web build, decode the dependency
//! graph report, snapshot it, and seed one entry per node. Source
//! projects read the tracked-functions seed CSV and seed one entry per
//! placeable function.

use crate::commands::save_structure;
use crate::config::{Config, ConfigPaths, StructureForm, StructureKind, BLUEPRINT_PREFIX};
use crate::error::{CliError, CliResult};
use crate::tool::{run_checked, BLUEPRINT_BIN};
use std::path::{Path, PathBuf};
use veritrack_core::structure::{disambiguate, TrackedArtifact};
use veritrack_core::{decode_document, Structure};

const SEED_CSV: &str = "functions_to_track.csv";
const REPORT_HTML: &str = "blueprint/web/dep_graph_document.html";

pub fn run(
    project_root: &Path,
    kind: StructureKind,
    form: StructureForm,
    root: Option<PathBuf>,
) -> CliResult<()> {
    let structure_root = match kind {
        StructureKind::Blueprint => {
            if root.is_some() {
                eprintln!("Warning: --root is ignored for blueprint projects (fixed to 'blueprint')");
            }
            "blueprint".to_string()
        }
        StructureKind::Source => root
            .map(|r| r.to_string_lossy().to_string())
            .unwrap_or_else(|| ".veritrack/structure".to_string()),
    };

    let config = Config::new(kind, form, &structure_root);
    let config_path = config.save(project_root)?;
    println!("Wrote config to {}", config_path.display());
    let paths = ConfigPaths::with_config(project_root, config);

    let structure = match kind {
        StructureKind::Blueprint => seed_from_blueprint(&paths)?,
        StructureKind::Source => seed_from_tracked_csv(project_root)?,
    };

    save_structure(&structure, &paths)?;
    match form {
        StructureForm::Json => println!(
            "Wrote {} entries to {}",
            structure.len(),
            paths.structure_json_path.display()
        ),
        StructureForm::Files => println!(
            "Created {} structure files in {}",
            structure.len(),
            paths.structure_root.display()
        ),
    }

    log::info!(
        "event=create module=commands status=ok entries={}",
        structure.len()
    );
    Ok(())
}

/// Builds the blueprint report, decodes it, snapshots the decoded graph
/// to `.veritrack/graph.json`, and seeds the structure from it.
fn seed_from_blueprint(paths: &ConfigPaths) -> CliResult<Structure> {
    println!("Running '{BLUEPRINT_BIN} web' to generate the report...");
    run_checked(BLUEPRINT_BIN, &["web"], Some(&paths.project_root))?;

    let html_path = paths.project_root.join(REPORT_HTML);
    if !html_path.exists() {
        return Err(CliError::Config(format!(
            "{} not found after the web build",
            html_path.display()
        )));
    }

    println!("Decoding {}...", html_path.display());
    let nodes = decode_document(&std::fs::read_to_string(&html_path)?)?;
    println!("Decoded {} graph nodes", nodes.len());

    if let Some(parent) = paths.graph_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&paths.graph_path, serde_json::to_string_pretty(&nodes)?)?;
    println!("Wrote graph snapshot to {}", paths.graph_path.display());

    Ok(Structure::from_graph(&nodes, BLUEPRINT_PREFIX))
}

/// Reads the tracked-functions seed CSV
/// (`function,module,link,has_spec,has_proof` rows) and seeds entries.
fn seed_from_tracked_csv(project_root: &Path) -> CliResult<Structure> {
    let csv_path = project_root.join(SEED_CSV);
    if !csv_path.exists() {
        return Err(CliError::Config(format!("{} not found", csv_path.display())));
    }

    println!("Reading {}...", csv_path.display());
    let artifacts = read_tracked_csv(&csv_path)?;
    println!("Tracking {} functions", artifacts.len());

    Ok(Structure::from_tracked(&disambiguate(artifacts)))
}

fn read_tracked_csv(csv_path: &Path) -> CliResult<Vec<TrackedArtifact>> {
    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut artifacts = Vec::new();

    for record in reader.records() {
        let record = record?;
        let field = |i: usize| record.get(i).unwrap_or("").to_string();
        let has_spec_raw = field(3);
        artifacts.push(TrackedArtifact {
            name: field(0),
            module: field(1),
            link: field(2),
            has_spec: has_spec_raw == "yes" || has_spec_raw == "ext",
            has_proof: field(4) == "yes",
        });
    }
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::read_tracked_csv;

    #[test]
    fn tracked_csv_rows_parse_with_spec_flags() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tracked.csv");
        std::fs::write(
            &path,
            "function,module,link,has_spec,has_proof\n\
             mod::f,mod,https://host/x/blob/main/src/a.rs#L10,yes,no\n\
             mod::g,mod,https://host/x/blob/main/src/a.rs#L20,ext,yes\n\
             mod::h,mod,,no,no\n",
        )
        .expect("write csv");

        let artifacts = read_tracked_csv(&path).expect("csv should parse");
        assert_eq!(artifacts.len(), 3);
        assert!(artifacts[0].has_spec && !artifacts[0].has_proof);
        assert!(artifacts[1].has_spec && artifacts[1].has_proof);
        assert!(!artifacts[2].has_spec);
    }
}
