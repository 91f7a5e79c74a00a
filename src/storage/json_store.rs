// File-backed run state: seen listing ids and the pending delivery queue.
//
// Both files are plain JSON arrays so they stay hand-inspectable and
// editable. Loads are best-effort: the "corrupt or missing file means
// empty state" policy is applied here, in one place, and nowhere else.
use crate::model::{Listing, LoadError, StoreError};
use crate::utils::id_ordinal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Seen ids kept per save, newest (highest ordinal) retained.
pub const SEEN_CAP: usize = 5000;

pub struct StateStore {
    seen_path: PathBuf,
    pending_path: PathBuf,
}

impl StateStore {
    pub fn new(seen_path: impl Into<PathBuf>, pending_path: impl Into<PathBuf>) -> Self {
        Self {
            seen_path: seen_path.into(),
            pending_path: pending_path.into(),
        }
    }

    pub fn load_seen(&self) -> HashSet<String> {
        let ids: Vec<String> = load_or_default(&self.seen_path, "seen ids");
        ids.into_iter().collect()
    }

    /// Persists the seen set, truncated to the `SEEN_CAP` most recent ids
    /// by numeric ordinal so the file cannot grow without bound.
    pub fn save_seen(&self, seen: &HashSet<String>) -> Result<(), StoreError> {
        let mut recent: Vec<&String> = seen.iter().collect();
        recent.sort_by_key(|id| id_ordinal(id));
        if recent.len() > SEEN_CAP {
            recent = recent.split_off(recent.len() - SEEN_CAP);
        }
        write_json(&self.seen_path, &recent)
    }

    pub fn load_pending(&self) -> Vec<Listing> {
        load_or_default(&self.pending_path, "pending queue")
    }

    /// Replaces the pending queue wholesale; order is re-established by the
    /// ranker on the next load.
    pub fn save_pending(&self, listings: &[Listing]) -> Result<(), StoreError> {
        write_json(&self.pending_path, &listings)
    }
}

fn try_load<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    if !path.exists() {
        return Err(LoadError::Missing);
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn load_or_default<T: DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    match try_load(path) {
        Ok(value) => value,
        Err(LoadError::Missing) => T::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unreadable {} state, starting empty", what);
            T::default()
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let encoded = serde_json::to_string(value)?;
    fs::write(path, encoded)?;
    Ok(())
}
