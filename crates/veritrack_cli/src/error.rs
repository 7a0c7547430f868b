//! CLI-level error type.
//!
//! # Responsibility
//! - Funnel every core error and the CLI's own failure modes into one
//!   type so `main` has a single exit path.

use std::error::Error;
use std::fmt::{Display, Formatter};
use veritrack_core::certs::CertError;
use veritrack_core::graph::GraphError;
use veritrack_core::status::StatusError;
use veritrack_core::structure::StructureError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub enum CliError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
    Graph(GraphError),
    Certs(CertError),
    Structure(StructureError),
    Status(StatusError),
    /// Missing or unusable project configuration.
    Config(String),
    /// An external collaborator tool failed or could not be run.
    Tool { program: String, detail: String },
    Logging(String),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Json(err) => write!(f, "invalid JSON: {err}"),
            Self::Csv(err) => write!(f, "invalid CSV: {err}"),
            Self::Graph(err) => write!(f, "{err}"),
            Self::Certs(err) => write!(f, "{err}"),
            Self::Structure(err) => write!(f, "{err}"),
            Self::Status(err) => write!(f, "{err}"),
            Self::Config(detail) => write!(f, "configuration error: {detail}"),
            Self::Tool { program, detail } => write!(f, "`{program}` failed: {detail}"),
            Self::Logging(detail) => write!(f, "logging setup failed: {detail}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::Graph(err) => Some(err),
            Self::Certs(err) => Some(err),
            Self::Structure(err) => Some(err),
            Self::Status(err) => Some(err),
            Self::Config(_) | Self::Tool { .. } | Self::Logging(_) => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<csv::Error> for CliError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<GraphError> for CliError {
    fn from(value: GraphError) -> Self {
        Self::Graph(value)
    }
}

impl From<CertError> for CliError {
    fn from(value: CertError) -> Self {
        Self::Certs(value)
    }
}

impl From<StructureError> for CliError {
    fn from(value: StructureError) -> Self {
        Self::Structure(value)
    }
}

impl From<StatusError> for CliError {
    fn from(value: StatusError) -> Self {
        Self::Status(value)
    }
}
