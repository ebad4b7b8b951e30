//! JSON snapshot persistence
//!
//! The whole store serializes to one JSON document. Writes go to a sibling
//! temp file first and are renamed into place, so a crash mid-write leaves
//! the previous snapshot intact rather than a truncated one.

use std::fs;
use std::path::Path;

use rdc_core::{ConsentRecord, SurveyRecord};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// On-disk shape of the store
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    pub(crate) consents: Vec<ConsentRecord>,
    pub(crate) surveys: Vec<SurveyRecord>,
}

/// Load a snapshot, `None` when the file does not exist yet
pub(crate) fn load(path: &Path) -> Result<Option<Snapshot>, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(StoreError::Storage(format!("read {}: {err}", path.display()))),
    };
    let snapshot = serde_json::from_slice(&bytes)
        .map_err(|err| StoreError::Storage(format!("parse {}: {err}", path.display())))?;
    Ok(Some(snapshot))
}

/// Write a snapshot atomically (temp file + rename)
pub(crate) fn save(path: &Path, snapshot: &Snapshot) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(snapshot)
        .map_err(|err| StoreError::Storage(format!("encode snapshot: {err}")))?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)
        .map_err(|err| StoreError::Storage(format!("write {}: {err}", tmp.display())))?;
    fs::rename(&tmp, path)
        .map_err(|err| StoreError::Storage(format!("rename {}: {err}", path.display())))?;
    Ok(())
}
