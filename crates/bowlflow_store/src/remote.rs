//! Remote replicated store seam.
//!
//! The remote mirror is last-write-wins: `publish` overwrites the ENTIRE
//! collection, matching the legacy wire contract (see DESIGN.md for the
//! per-record-write improvement this forgoes). Log appends are best-effort
//! and must never block or fail a scan.

use anyhow::Result;
use bowlflow_protocol::{record_key, BowlRecord, Collection};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Structured entry appended to the remote activity/error streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub user: String,
    pub mode: String,
    pub action: String,
    pub timestamp: i64,
}

/// A wholesale collection replacement delivered by another session.
#[derive(Debug, Clone)]
pub struct RemoteUpdate {
    pub collection: Collection,
    pub records: Vec<BowlRecord>,
}

/// Remote replicated store.
///
/// Implementations must be cheap to call from a detached task; callers
/// treat every error as non-fatal.
pub trait RemoteStore: Send + Sync {
    /// Overwrite the whole remote collection with `records`.
    fn publish(&self, collection: Collection, records: &[BowlRecord]) -> Result<()>;

    /// Append an entry to a log stream (activity or error path).
    fn append(&self, path: &str, entry: &LogEntry) -> Result<()>;
}

/// In-memory remote store.
///
/// Backs tests and offline operation. Records are keyed the way the real
/// backend keys them (forbidden key characters replaced), and a failure
/// flag lets tests exercise the errors-are-swallowed contract.
#[derive(Default)]
pub struct MemoryRemote {
    collections: Mutex<HashMap<Collection, BTreeMap<String, BowlRecord>>>,
    logs: Mutex<Vec<(String, LogEntry)>>,
    fail_writes: AtomicBool,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, to test best-effort handling.
    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of one remote collection, in key order.
    pub fn collection(&self, collection: Collection) -> Vec<BowlRecord> {
        let guard = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .get(&collection)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }

    /// All appended log entries for one stream path.
    pub fn log_entries(&self, path: &str) -> Vec<LogEntry> {
        let guard = self.logs.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, entry)| entry.clone())
            .collect()
    }
}

impl RemoteStore for MemoryRemote {
    fn publish(&self, collection: Collection, records: &[BowlRecord]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("remote write rejected");
        }
        let keyed: BTreeMap<String, BowlRecord> = records
            .iter()
            .map(|record| (record_key(&record.code), record.clone()))
            .collect();
        let mut guard = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        guard.insert(collection, keyed);
        Ok(())
    }

    fn append(&self, path: &str, entry: &LogEntry) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("remote append rejected");
        }
        let mut guard = self.logs.lock().unwrap_or_else(|e| e.into_inner());
        guard.push((path.to_string(), entry.clone()));
        Ok(())
    }
}
