//! Certificate ledger: one persisted file per qualifying identifier.
//!
//! # Responsibility
//! - Encode identifiers losslessly into storage-safe file names.
//! - Keep a certificate directory synchronized with a computed
//!   qualifying set, within an externally supplied scope.
//!
//! # Invariants
//! - `decode_name(encode_name(x)) == x` for every identifier.
//! - Certificates are never mutated in place; delete-then-recreate only.
//! - `sync` never creates or deletes outside the supplied scope.
//! - `sync` is idempotent: re-running with unchanged inputs is a no-op.

use chrono::{DateTime, Utc};
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type CertResult<T> = Result<T, CertError>;

/// Ledger persistence error.
#[derive(Debug)]
pub enum CertError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl Display for CertError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "certificate store io error: {err}"),
            Self::Json(err) => write!(f, "certificate content error: {err}"),
        }
    }
}

impl Error for CertError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CertError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CertError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Certificate file content: the fact an identifier qualified, and when.
#[derive(Debug, Serialize, Deserialize)]
pub struct Cert {
    pub timestamp: DateTime<Utc>,
}

/// What `sync` did for one identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertAction {
    Created,
    Deleted,
}

/// One applied ledger change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertChange {
    pub id: String,
    pub action: CertAction,
}

/// Full report of one `sync` pass.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Every applied change, creations first, each side in sorted order.
    pub changes: Vec<CertChange>,
    /// Certified identifiers before the pass.
    pub existing: usize,
    /// Certified identifiers after the pass.
    pub total: usize,
}

impl SyncReport {
    pub fn created(&self) -> impl Iterator<Item = &CertChange> {
        self.changes
            .iter()
            .filter(|change| change.action == CertAction::Created)
    }

    pub fn deleted(&self) -> impl Iterator<Item = &CertChange> {
        self.changes
            .iter()
            .filter(|change| change.action == CertAction::Deleted)
    }

    pub fn created_count(&self) -> usize {
        self.created().count()
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted().count()
    }

    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Encodes an identifier for use as a file name.
///
/// Every non-alphanumeric byte is percent-encoded, so distinct
/// identifiers can never collide on disk.
pub fn encode_name(name: &str) -> String {
    utf8_percent_encode(name, NON_ALPHANUMERIC).to_string()
}

/// Decodes a file name back to the identifier it was created from.
pub fn decode_name(encoded: &str) -> String {
    percent_decode_str(encoded).decode_utf8_lossy().to_string()
}

/// One certificate directory. The store never knows how qualification
/// was computed; the two ledgers (specify, verify) are two instances.
#[derive(Debug, Clone)]
pub struct CertStore {
    dir: PathBuf,
}

impl CertStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reads the currently certified identifier set.
    ///
    /// A missing directory is an empty store, not an error.
    pub fn existing(&self) -> CertResult<BTreeSet<String>> {
        let mut existing = BTreeSet::new();
        if !self.dir.exists() {
            return Ok(existing);
        }

        for dir_entry in std::fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem() {
                    existing.insert(decode_name(&stem.to_string_lossy()));
                }
            }
        }
        Ok(existing)
    }

    /// Writes a fresh certificate for `name`, stamped now.
    pub fn create(&self, name: &str) -> CertResult<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.cert_path(name);
        let cert = Cert {
            timestamp: Utc::now(),
        };
        std::fs::write(&path, serde_json::to_string_pretty(&cert)?)?;
        Ok(path)
    }

    /// Removes the certificate for `name` if present.
    pub fn delete(&self, name: &str) -> CertResult<Option<PathBuf>> {
        let path = self.cert_path(name);
        if !path.exists() {
            return Ok(None);
        }
        std::fs::remove_file(&path)?;
        Ok(Some(path))
    }

    /// Brings the store in sync with the qualifying set, within scope.
    ///
    /// `to_create = (qualifying ∩ scope) − existing` and
    /// `to_delete = (scope − qualifying) ∩ existing`; identifiers outside
    /// `scope` are untouched even when their qualification is known.
    /// Changes apply in stable sorted order, creations before deletions.
    pub fn sync(
        &self,
        qualifying: &BTreeSet<String>,
        scope: &BTreeSet<String>,
    ) -> CertResult<SyncReport> {
        let existing = self.existing()?;

        let to_create: Vec<&String> = scope
            .intersection(qualifying)
            .filter(|id| !existing.contains(*id))
            .collect();
        let to_delete: Vec<&String> = scope
            .difference(qualifying)
            .filter(|id| existing.contains(*id))
            .collect();

        let mut changes = Vec::with_capacity(to_create.len() + to_delete.len());
        for id in to_create {
            self.create(id)?;
            changes.push(CertChange {
                id: id.clone(),
                action: CertAction::Created,
            });
        }
        for id in to_delete {
            self.delete(id)?;
            changes.push(CertChange {
                id: id.clone(),
                action: CertAction::Deleted,
            });
        }

        let created = changes
            .iter()
            .filter(|change| change.action == CertAction::Created)
            .count();
        let deleted = changes.len() - created;
        let report = SyncReport {
            existing: existing.len(),
            total: existing.len() + created - deleted,
            changes,
        };

        log::info!(
            "event=cert_sync module=certs status=ok dir={} created={} deleted={} total={}",
            self.dir.display(),
            report.created_count(),
            report.deleted_count(),
            report.total
        );
        Ok(report)
    }

    fn cert_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_name(name)))
    }
}
