//! JSON-backed ledger store
//!
//! One document per file. Writes go to a sibling temp file first and are
//! renamed over the target, so a reader never sees a partial document.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use serde_json::{Map, Value};

use super::types::{Ledger, REQUIRED_KEYS, SCORE_KEYS};
use crate::error::LedgerError;

#[derive(Debug)]
pub(crate) struct LedgerStore {
    path: PathBuf,
    ledger: Ledger,
}

impl LedgerStore {
    /// Load the ledger at `path`, or start an empty one if the file is absent.
    ///
    /// Nothing is written until the first mutation.
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let ledger = load(&path)?;
        Ok(Self { path, ledger })
    }

    /// Like `open`, but a malformed file yields an empty in-memory ledger.
    ///
    /// Only for callers about to overwrite the whole document (import, reset).
    pub(crate) fn open_for_replace(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        match load(&path) {
            Ok(ledger) => Ok(Self { path, ledger }),
            Err(LedgerError::MalformedStore { reason, .. }) => {
                warn!(
                    path = %path.display(),
                    %reason,
                    "existing ledger is malformed and will be replaced"
                );
                Ok(Self {
                    path,
                    ledger: Ledger::empty(),
                })
            }
            Err(e) => Err(e),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub(crate) fn save(&self) -> Result<(), LedgerError> {
        write_atomic(&self.path, &serialize(&self.ledger)?)
    }

    /// Discard every collection and persist a fresh document.
    pub(crate) fn reset(&mut self) -> Result<(), LedgerError> {
        self.replace_and_save(Ledger::empty())?;
        info!(path = %self.path.display(), "ledger reset");
        Ok(())
    }

    /// Replace the whole ledger with `raw`. On any error the store is untouched.
    pub(crate) fn import_document(&mut self, raw: &str) -> Result<(), LedgerError> {
        let incoming = parse_document(raw)?;
        self.replace_and_save(incoming)?;
        info!(
            sessions = self.ledger.sessions.len(),
            tasks = self.ledger.tasks.len(),
            scores = self.ledger.scores.len(),
            notes = self.ledger.notes.len(),
            "ledger imported"
        );
        Ok(())
    }

    /// The document exactly as `save` writes it.
    pub(crate) fn export_document(&self) -> Result<String, LedgerError> {
        serialize(&self.ledger)
    }

    /// Apply `mutate` to a copy of the ledger, persist it, then swap it in.
    pub(super) fn commit<T>(
        &mut self,
        mutate: impl FnOnce(&mut Ledger) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let mut draft = self.ledger.clone();
        let out = mutate(&mut draft)?;
        self.replace_and_save(draft)?;
        Ok(out)
    }

    /// Swap in `next` and persist it, restoring the old document if the write fails.
    fn replace_and_save(&mut self, next: Ledger) -> Result<(), LedgerError> {
        let previous = std::mem::replace(&mut self.ledger, next);
        if let Err(e) = self.save() {
            self.ledger = previous;
            return Err(e);
        }
        Ok(())
    }
}

fn load(path: &Path) -> Result<Ledger, LedgerError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no ledger file, starting empty");
            return Ok(Ledger::empty());
        }
        Err(source) => return Err(io_error("read", path)(source)),
    };
    let ledger = parse_document(&raw).map_err(|e| LedgerError::MalformedStore {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    debug!(
        path = %path.display(),
        sessions = ledger.sessions.len(),
        "loaded ledger"
    );
    Ok(ledger)
}

/// Parse and check a raw document without touching any store.
fn parse_document(raw: &str) -> Result<Ledger, LedgerError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| LedgerError::InvalidDocument(e.to_string()))?;
    let Some(object) = value.as_object() else {
        return Err(LedgerError::InvalidDocument(
            "top-level value is not an object".to_string(),
        ));
    };
    let missing: Vec<&'static str> = REQUIRED_KEYS
        .into_iter()
        .filter(|key| !object.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(LedgerError::SchemaMismatch { missing });
    }
    check_score_keys(object)?;
    let ledger: Ledger =
        serde_json::from_value(value).map_err(|e| LedgerError::InvalidDocument(e.to_string()))?;
    ledger.validate().map_err(LedgerError::InvalidDocument)?;
    Ok(ledger)
}

/// Snapshots flatten their scores, which rules out `deny_unknown_fields`,
/// so their keys are checked against the raw document instead.
fn check_score_keys(object: &Map<String, Value>) -> Result<(), LedgerError> {
    let Some(rows) = object.get("scores").and_then(Value::as_array) else {
        return Ok(());
    };
    for row in rows {
        if let Some(fields) = row.as_object()
            && let Some(key) = fields.keys().find(|k| !SCORE_KEYS.contains(&k.as_str()))
        {
            return Err(LedgerError::InvalidDocument(format!(
                "unknown field `{key}` in score snapshot"
            )));
        }
    }
    Ok(())
}

fn serialize(ledger: &Ledger) -> Result<String, LedgerError> {
    serde_json::to_string_pretty(ledger).map_err(|e| LedgerError::InvalidDocument(e.to_string()))
}

fn io_error(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> LedgerError {
    let path = path.to_path_buf();
    move |source| LedgerError::Io {
        action,
        path,
        source,
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), LedgerError> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_error("create directory", dir))?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).map_err(io_error("write", &tmp))?;
    if let Err(source) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(io_error("replace", path)(source));
    }
    debug!(path = %path.display(), bytes = contents.len(), "saved ledger");
    Ok(())
}
