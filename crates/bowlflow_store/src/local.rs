//! Local durable snapshot store (JSON file).

use crate::state::TrackerState;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Whole-state JSON file store with atomic replace on save.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the full state. Writes a sibling temp file first and
    /// renames over the target so a crash never leaves a torn snapshot.
    pub fn save(&self, state: &TrackerState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create state directory: {}", parent.display())
            })?;
        }
        let json = serde_json::to_string_pretty(state).context("Failed to serialize state")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write state file: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace state file: {}", self.path.display()))?;
        Ok(())
    }

    /// Load the persisted state. A missing file is `None`, not an error;
    /// an unreadable or unparseable file is an error.
    pub fn load(&self) -> Result<Option<TrackerState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state file: {}", self.path.display()))?;
        let state = serde_json::from_str(&raw)
            .with_context(|| format!("State file is not valid JSON: {}", self.path.display()))?;
        Ok(Some(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bowlflow_protocol::BowlRecord;

    fn record(code: &str) -> BowlRecord {
        BowlRecord {
            code: code.to_string(),
            ..BowlRecord::default()
        }
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("state.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("state.json"));
        let state = TrackerState {
            active_bowls: vec![record("a1")],
            prepared_bowls: vec![record("p1"), record("p2")],
            last_delivery_company: Some("Acme".to_string()),
            ..TrackerState::default()
        };
        store.save(&state).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("nested/data/state.json"));
        store.save(&TrackerState::default()).unwrap();
        assert!(store.load().unwrap().is_some());
    }

    #[test]
    fn corrupt_file_is_an_error_not_a_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json").unwrap();
        let store = LocalStore::new(path);
        assert!(store.load().is_err());
    }
}
