//! Project configuration and derived paths.
//!
//! # Responsibility
//! - Persist the structure kind/form/root choice made at `create` time in
//!   `.veritrack/config.json`.
//! - Derive every path the commands touch from the project root, so path
//!   layout lives in exactly one place.

use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Per-project working directory, relative to the project root.
pub const CONFIG_DIR: &str = ".veritrack";
const CONFIG_FILE: &str = "config.json";

/// Identifier namespace prefix applied to blueprint node ids.
pub const BLUEPRINT_PREFIX: &str = "bp:";

/// Where tracked entries come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StructureKind {
    /// Seeded from the tracked-functions list of an analyzed codebase.
    Source,
    /// Seeded from a proof-assistant dependency graph report.
    Blueprint,
}

/// How the structure is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StructureForm {
    /// One JSON mapping file.
    Json,
    /// One markdown file with front matter per entry.
    Files,
}

impl std::fmt::Display for StructureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Blueprint => write!(f, "blueprint"),
        }
    }
}

impl std::fmt::Display for StructureForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Files => write!(f, "files"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "structure-kind")]
    pub kind: StructureKind,
    #[serde(rename = "structure-form")]
    pub form: StructureForm,
    /// Structure file root, relative to the project root.
    #[serde(rename = "structure-root")]
    pub structure_root: String,
    /// Atom id namespace to track; empty keeps the whole batch.
    #[serde(rename = "atom-prefix", default)]
    pub atom_prefix: String,
}

impl Config {
    pub fn new(kind: StructureKind, form: StructureForm, structure_root: &str) -> Self {
        Self {
            kind,
            form,
            structure_root: structure_root.to_string(),
            atom_prefix: String::new(),
        }
    }

    pub fn save(&self, project_root: &Path) -> CliResult<PathBuf> {
        let dir = project_root.join(CONFIG_DIR);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(CONFIG_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }

    pub fn load(project_root: &Path) -> CliResult<Self> {
        let path = project_root.join(CONFIG_DIR).join(CONFIG_FILE);
        if !path.exists() {
            return Err(CliError::Config(format!(
                "{} not found; run `veritrack create` first",
                path.display()
            )));
        }
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }
}

/// The loaded config plus every derived path.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config: Config,
    pub project_root: PathBuf,
    /// Atom batch snapshot from the code-intelligence tool.
    pub atoms_path: PathBuf,
    /// Specification status snapshot.
    pub specs_path: PathBuf,
    /// Verification results snapshot.
    pub proofs_path: PathBuf,
    /// Decoded blueprint graph snapshot.
    pub graph_path: PathBuf,
    /// JSON-form structure file.
    pub structure_json_path: PathBuf,
    /// Files-form structure root.
    pub structure_root: PathBuf,
    pub certs_specify_dir: PathBuf,
    pub certs_verify_dir: PathBuf,
    pub logs_dir: PathBuf,
}

impl ConfigPaths {
    pub fn load(project_root: &Path) -> CliResult<Self> {
        let config = Config::load(project_root)?;
        Ok(Self::with_config(project_root, config))
    }

    pub fn with_config(project_root: &Path, config: Config) -> Self {
        let dir = project_root.join(CONFIG_DIR);
        Self {
            project_root: project_root.to_path_buf(),
            atoms_path: dir.join("atoms.json"),
            specs_path: dir.join("specs.json"),
            proofs_path: dir.join("proofs.json"),
            graph_path: dir.join("graph.json"),
            structure_json_path: dir.join("structure.json"),
            structure_root: project_root.join(&config.structure_root),
            certs_specify_dir: dir.join("certs").join("specify"),
            certs_verify_dir: dir.join("certs").join("verify"),
            logs_dir: dir.join("logs"),
            config,
        }
    }
}

/// The default log directory for a project, usable before any config
/// exists (the `create` command runs first).
pub fn default_logs_dir(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join("logs")
}
