//! External collaborator tool invocation.
//!
//! # Responsibility
//! - Run the code-intelligence tool and the blueprint web build as
//!   blocking subprocesses.
//! - Turn a non-zero exit into a fatal, stderr-carrying error.

use crate::error::{CliError, CliResult};
use log::info;
use std::path::Path;
use std::process::{Command, Output};

/// Code-intelligence tool providing `atomize`, `specify`, `verify`.
pub const PROBE_BIN: &str = "codeprobe";
/// Blueprint generator whose `web` subcommand renders the graph report.
pub const BLUEPRINT_BIN: &str = "leanblueprint";

/// Runs `program args` and returns the raw output without judging the
/// exit status.
pub fn run_tool(program: &str, args: &[&str], cwd: Option<&Path>) -> CliResult<Output> {
    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    info!(
        "event=tool_run module=tool status=start program={program} args={}",
        args.join(" ")
    );
    command.output().map_err(|err| CliError::Tool {
        program: program.to_string(),
        detail: format!("could not be started: {err}"),
    })
}

/// Runs `program args` and fails the whole run on a non-zero exit.
pub fn run_checked(program: &str, args: &[&str], cwd: Option<&Path>) -> CliResult<Output> {
    let output = run_tool(program, args, cwd)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::error!(
            "event=tool_run module=tool status=error program={program} code={:?}",
            output.status.code()
        );
        return Err(CliError::Tool {
            program: program.to_string(),
            detail: if stderr.trim().is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr.trim().to_string()
            },
        });
    }
    info!("event=tool_run module=tool status=ok program={program}");
    Ok(output)
}
