//! Command-line front end for the tracking core.
//!
//! # Responsibility
//! - Subcommand parsing and dispatch; everything semantic lives in
//!   `veritrack_core`.
//! - Per-project logging bootstrap under `.veritrack/logs`.

mod commands;
mod config;
mod error;
mod menu;
mod tool;

use clap::{Parser, Subcommand};
use config::{ConfigPaths, StructureForm, StructureKind};
use error::{CliError, CliResult};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use veritrack_core::{default_log_level, init_logging};

/// Verification lifecycle tracking for source and blueprint projects.
#[derive(Parser)]
#[command(name = "veritrack")]
#[command(about = "Track verification status of code and proof artifacts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the tracked structure and write the project config
    Create {
        /// Project root directory
        #[arg(default_value = ".")]
        project_root: PathBuf,

        /// Where tracked entries come from
        #[arg(long, value_enum, default_value_t = StructureKind::Source)]
        kind: StructureKind,

        /// How the structure is persisted
        #[arg(long, value_enum, default_value_t = StructureForm::Files)]
        form: StructureForm,

        /// Structure file root (default: .veritrack/structure)
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Resolve entries against fresh atoms and enrich their metadata
    Atomize {
        /// Project root directory
        #[arg(default_value = ".")]
        project_root: PathBuf,

        /// Allow rewriting identity fields of files-form stubs
        #[arg(short = 's', long)]
        update_stubs: bool,
    },

    /// Check specification status and create specify certs interactively
    Specify {
        /// Project root directory
        #[arg(default_value = ".")]
        project_root: PathBuf,
    },

    /// Obtain verification results and sync the verify cert ledger
    Verify {
        /// Project root directory
        #[arg(default_value = ".")]
        project_root: PathBuf,

        /// Only verify functions in this module
        #[arg(long)]
        only_module: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            log::error!("event=run module=cli status=error detail=\"{err}\"");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> CliResult<()> {
    match command {
        Commands::Create {
            project_root,
            kind,
            form,
            root,
        } => {
            let project_root = resolve_root(&project_root)?;
            commands::create::run(&project_root, kind, form, root)
        }
        Commands::Atomize {
            project_root,
            update_stubs,
        } => {
            let paths = load_paths(&project_root)?;
            commands::atomize::run(&paths, update_stubs)
        }
        Commands::Specify { project_root } => {
            let paths = load_paths(&project_root)?;
            commands::specify::run(&paths)
        }
        Commands::Verify {
            project_root,
            only_module,
        } => {
            let paths = load_paths(&project_root)?;
            commands::verify::run(&paths, only_module.as_deref())
        }
    }
}

/// Canonicalizes the project root and starts file logging under it.
fn resolve_root(project_root: &Path) -> CliResult<PathBuf> {
    let project_root = project_root.canonicalize().map_err(|err| {
        CliError::Config(format!(
            "failed to resolve project root `{}`: {err}",
            project_root.display()
        ))
    })?;
    init_logging(default_log_level(), &config::default_logs_dir(&project_root))
        .map_err(CliError::Logging)?;
    Ok(project_root)
}

fn load_paths(project_root: &Path) -> CliResult<ConfigPaths> {
    let project_root = resolve_root(project_root)?;
    ConfigPaths::load(&project_root)
}
