//! Subcommand implementations.

pub mod atomize;
pub mod create;
pub mod specify;
pub mod verify;

use crate::config::{ConfigPaths, StructureForm};
use crate::error::CliResult;
use veritrack_core::Structure;

/// Loads the structure in whichever form the project is configured for.
pub fn load_structure(paths: &ConfigPaths) -> CliResult<Structure> {
    let structure = match paths.config.form {
        StructureForm::Json => Structure::load_json(&paths.structure_json_path)?,
        StructureForm::Files => Structure::load_files(&paths.structure_root)?,
    };
    Ok(structure)
}

/// Saves the structure back in the configured form.
pub fn save_structure(structure: &Structure, paths: &ConfigPaths) -> CliResult<()> {
    match paths.config.form {
        StructureForm::Json => structure.save_json(&paths.structure_json_path)?,
        StructureForm::Files => structure.save_files(&paths.structure_root)?,
    }
    Ok(())
}
