//! Operator session: the single owner of tracker state.
//!
//! All mutation funnels through here: scans via the engine, bulk imports
//! via the reconciler, wholesale collection replacement from the remote
//! listener, and the daily cleanup. Persistence sequencing is in-memory
//! mutation first, then local save, then detached remote publish; remote
//! errors are logged, never retried, never surfaced to the operator.

use crate::cleanup::DailyCleanup;
use crate::engine::{self, ScanError, ScanOutcome};
use crate::reconcile::{self, ManifestError, ReconcileSummary};
use crate::registry::Registry;
use crate::report;
use anyhow::{Context, Result};
use bowlflow_protocol::{
    timestamp_millis, Collection, ScanContext, ScanEvent, SystemConfig, DATE_FORMAT,
};
use bowlflow_store::{CustomerRecord, LocalStore, LogEntry, RemoteStore, RemoteUpdate, TrackerState};
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tracing::{info, warn};

/// Remote stream receiving one entry per accepted transition.
pub const ACTIVITY_LOG_PATH: &str = "logs/scans";
/// Remote stream receiving business-rule rejections.
pub const ERROR_LOG_PATH: &str = "logs/errors";

pub struct Session {
    registry: Registry,
    scan_history: Vec<ScanEvent>,
    my_scans: Vec<ScanEvent>,
    customer_data: Vec<CustomerRecord>,
    last_sync: Option<i64>,
    last_delivery_date: Option<String>,
    last_delivery_company: Option<String>,
    local: Option<LocalStore>,
    remote: Option<Arc<dyn RemoteStore>>,
}

impl Session {
    /// In-memory session with no persistence adapters.
    pub fn new() -> Self {
        Self::with_stores(None, None)
    }

    pub fn with_stores(local: Option<LocalStore>, remote: Option<Arc<dyn RemoteStore>>) -> Self {
        Self {
            registry: Registry::new(),
            scan_history: Vec::new(),
            my_scans: Vec::new(),
            customer_data: Vec::new(),
            last_sync: None,
            last_delivery_date: None,
            last_delivery_company: None,
            local,
            remote,
        }
    }

    /// Open a session on the configured local store, restoring any
    /// persisted snapshot.
    pub fn open(config: &SystemConfig, remote: Option<Arc<dyn RemoteStore>>) -> Result<Self> {
        let local = LocalStore::new(config.state_path.clone());
        let state = local
            .load()
            .with_context(|| format!("Failed to load state from {}", local.path().display()))?;
        let mut session = Self::with_stores(Some(local), remote);
        if let Some(state) = state {
            session.restore(state);
        }
        Ok(session)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn scan_history(&self) -> &[ScanEvent] {
        &self.scan_history
    }

    pub fn my_scans(&self) -> &[ScanEvent] {
        &self.my_scans
    }

    pub fn last_sync(&self) -> Option<i64> {
        self.last_sync
    }

    pub fn last_delivery(&self) -> (Option<&str>, Option<&str>) {
        (
            self.last_delivery_date.as_deref(),
            self.last_delivery_company.as_deref(),
        )
    }

    /// Load tracker state wholesale (startup restore).
    pub fn restore(&mut self, state: TrackerState) {
        self.registry.replace(Collection::Active, state.active_bowls);
        self.registry
            .replace(Collection::Prepared, state.prepared_bowls);
        self.registry
            .replace(Collection::Returned, state.returned_bowls);
        self.scan_history = state.scan_history;
        self.my_scans = state.my_scans;
        self.customer_data = state.customer_data;
        self.last_sync = state.last_sync;
        self.last_delivery_date = state.last_delivery_date;
        self.last_delivery_company = state.last_delivery_company;
    }

    /// Serialize the full session state for persistence.
    pub fn snapshot(&self, today: NaiveDate) -> TrackerState {
        let delivery_days_ago = self
            .last_delivery_date
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw, DATE_FORMAT).ok())
            .map(|date| report::business_days_active(date, today));
        TrackerState {
            active_bowls: self.registry.records(Collection::Active).to_vec(),
            prepared_bowls: self.registry.records(Collection::Prepared).to_vec(),
            returned_bowls: self.registry.records(Collection::Returned).to_vec(),
            scan_history: self.scan_history.clone(),
            my_scans: self.my_scans.clone(),
            customer_data: self.customer_data.clone(),
            last_sync: self.last_sync,
            last_delivery_date: self.last_delivery_date.clone(),
            delivery_days_ago,
            last_delivery_company: self.last_delivery_company.clone(),
        }
    }

    /// Process one scan attempt.
    ///
    /// The scan is logically complete once the registry is updated;
    /// persistence and remote mirroring are best-effort side effects.
    pub fn handle_scan(
        &mut self,
        ctx: &ScanContext,
        raw: &str,
        now: NaiveDateTime,
    ) -> Result<ScanOutcome, ScanError> {
        let result = engine::apply_scan(&mut self.registry, ctx, raw, now);
        match &result {
            Ok(outcome) => {
                self.scan_history.push(outcome.event.clone());
                self.my_scans.push(outcome.event.clone());
                self.persist(now);
                self.publish_collections();
                self.append_log(
                    ACTIVITY_LOG_PATH,
                    LogEntry {
                        user: ctx.user.clone(),
                        mode: ctx.mode.to_string(),
                        action: outcome.kind.to_string(),
                        timestamp: timestamp_millis(now),
                    },
                );
            }
            Err(err) if err.is_business_rule() => {
                // No state changed, but the rejection still persists the
                // snapshot and reaches the remote error stream.
                self.persist(now);
                self.append_log(
                    ERROR_LOG_PATH,
                    LogEntry {
                        user: ctx.user.clone(),
                        mode: ctx.mode.to_string(),
                        action: err.to_string(),
                        timestamp: timestamp_millis(now),
                    },
                );
            }
            Err(_) => {}
        }
        result
    }

    /// Import a pasted delivery manifest.
    pub fn import_manifest(
        &mut self,
        text: &str,
        now: NaiveDateTime,
    ) -> Result<ReconcileSummary, ManifestError> {
        let manifest = reconcile::parse_manifest(text)?;
        let summary = reconcile::reconcile(&mut self.registry, &manifest, now)?;
        if summary.moved + summary.created > 0 {
            self.last_delivery_date = Some(now.format(DATE_FORMAT).to_string());
            self.last_delivery_company = summary.company.clone();
            self.customer_data.extend(summary.customers.iter().cloned());
        }
        self.persist(now);
        self.publish_collections();
        self.append_log(
            ACTIVITY_LOG_PATH,
            LogEntry {
                user: "JSON Import".to_string(),
                mode: "import".to_string(),
                action: format!(
                    "moved={} created={} skipped={}",
                    summary.moved, summary.created, summary.skipped
                ),
                timestamp: timestamp_millis(now),
            },
        );
        Ok(summary)
    }

    /// Apply a wholesale collection replacement from another session.
    ///
    /// Last apply wins by arrival order; the update is saved locally but
    /// not echoed back to the remote.
    pub fn apply_remote_update(&mut self, update: RemoteUpdate, now: NaiveDateTime) {
        info!(
            collection = %update.collection,
            records = update.records.len(),
            "applying remote update"
        );
        self.registry.replace(update.collection, update.records);
        self.last_sync = Some(timestamp_millis(now));
        self.persist(now);
    }

    /// Operator-triggered (or scheduled) clear of the returned collection.
    pub fn clear_returned(&mut self, now: NaiveDateTime) -> usize {
        let removed = self.registry.clear(Collection::Returned);
        self.persist(now);
        self.publish_collections();
        removed
    }

    /// Run the daily cleanup if its cutoff has passed. Returns how many
    /// returned bowls were cleared, or `None` when not due.
    pub fn run_cleanup(&mut self, cleanup: &mut DailyCleanup, now: NaiveDateTime) -> Option<usize> {
        if !cleanup.due(now) {
            return None;
        }
        let removed = self.clear_returned(now);
        cleanup.mark_ran(now);
        info!(removed, "daily cleanup cleared returned bowls");
        Some(removed)
    }

    /// Save the snapshot to the local store. Persistence failures are
    /// logged and swallowed: the in-memory registry is the authority.
    fn persist(&self, now: NaiveDateTime) {
        if let Some(local) = &self.local {
            if let Err(err) = local.save(&self.snapshot(now.date())) {
                warn!(error = %err, "local state save failed");
            }
        }
    }

    /// Mirror all three collections to the remote store (whole-collection
    /// overwrite, matching the legacy wire contract).
    fn publish_collections(&self) {
        for collection in Collection::ALL {
            let records = self.registry.records(collection).to_vec();
            self.dispatch("publish", move |remote| {
                remote.publish(collection, &records)
            });
        }
    }

    fn append_log(&self, path: &'static str, entry: LogEntry) {
        self.dispatch("append", move |remote| remote.append(path, &entry));
    }

    /// Fire-and-forget remote call: detached when a tokio runtime is
    /// running, inline otherwise; errors are logged, never retried, and
    /// never block the caller.
    fn dispatch<F>(&self, what: &'static str, task: F)
    where
        F: FnOnce(&dyn RemoteStore) -> Result<()> + Send + 'static,
    {
        let Some(remote) = self.remote.clone() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = task(remote.as_ref()) {
                        warn!(what, error = %err, "remote call failed; not retried");
                    }
                });
            }
            Err(_) => {
                if let Err(err) = task(remote.as_ref()) {
                    warn!(what, error = %err, "remote call failed; not retried");
                }
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bowlflow_protocol::ScanKind;
    use bowlflow_store::MemoryRemote;
    use chrono::NaiveTime;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    const CODE: &str = "https://VYT.TO/abc123";

    #[test]
    fn accepted_scan_appends_history_and_mirrors_remote() {
        let remote = Arc::new(MemoryRemote::new());
        let mut session = Session::with_stores(None, Some(remote.clone()));
        session
            .handle_scan(
                &ScanContext::kitchen("Hamid", "B"),
                CODE,
                at("2025-03-01 08:00:00"),
            )
            .unwrap();
        assert_eq!(session.scan_history().len(), 1);
        assert_eq!(session.scan_history()[0].kind, ScanKind::Prepare);
        assert_eq!(remote.collection(Collection::Prepared).len(), 1);
        assert_eq!(remote.log_entries(ACTIVITY_LOG_PATH).len(), 1);
        assert!(remote.log_entries(ERROR_LOG_PATH).is_empty());
    }

    #[test]
    fn business_rejection_reaches_the_error_stream_only() {
        let remote = Arc::new(MemoryRemote::new());
        let mut session = Session::with_stores(None, Some(remote.clone()));
        let ctx = ScanContext::kitchen("Hamid", "B");
        session.handle_scan(&ctx, CODE, at("2025-03-01 08:00:00")).unwrap();
        let err = session
            .handle_scan(&ctx, CODE, at("2025-03-01 09:00:00"))
            .unwrap_err();
        assert_eq!(err, ScanError::AlreadyPreparedToday);
        assert_eq!(remote.log_entries(ERROR_LOG_PATH).len(), 1);
        // History records transitions only.
        assert_eq!(session.scan_history().len(), 1);
    }

    #[test]
    fn input_rejection_is_not_remote_logged() {
        let remote = Arc::new(MemoryRemote::new());
        let mut session = Session::with_stores(None, Some(remote.clone()));
        let err = session
            .handle_scan(
                &ScanContext::kitchen("Hamid", "B"),
                "no marker here",
                at("2025-03-01 08:00:00"),
            )
            .unwrap_err();
        assert!(!err.is_business_rule());
        assert!(remote.log_entries(ERROR_LOG_PATH).is_empty());
    }

    #[test]
    fn remote_failures_never_fail_the_scan() {
        let remote = Arc::new(MemoryRemote::new());
        remote.set_failing(true);
        let mut session = Session::with_stores(None, Some(remote.clone()));
        session
            .handle_scan(
                &ScanContext::kitchen("Hamid", "B"),
                CODE,
                at("2025-03-01 08:00:00"),
            )
            .unwrap();
        assert_eq!(session.registry().len(Collection::Prepared), 1);
    }

    #[test]
    fn remote_update_replaces_a_collection_wholesale() {
        let mut session = Session::new();
        session
            .handle_scan(
                &ScanContext::kitchen("Hamid", "B"),
                CODE,
                at("2025-03-01 08:00:00"),
            )
            .unwrap();
        session.apply_remote_update(
            RemoteUpdate {
                collection: Collection::Prepared,
                records: Vec::new(),
            },
            at("2025-03-01 08:05:00"),
        );
        assert_eq!(session.registry().len(Collection::Prepared), 0);
        assert!(session.last_sync().is_some());
    }

    #[test]
    fn cleanup_runs_once_per_day() {
        let mut session = Session::new();
        session
            .handle_scan(
                &ScanContext::kitchen("Hamid", "B"),
                CODE,
                at("2025-03-01 08:00:00"),
            )
            .unwrap();
        session
            .handle_scan(
                &ScanContext::returns("Sultan"),
                CODE,
                at("2025-03-01 12:00:00"),
            )
            .unwrap();

        let mut cleanup = DailyCleanup::new(NaiveTime::from_hms_opt(19, 0, 0).unwrap());
        assert!(session.run_cleanup(&mut cleanup, at("2025-03-01 18:00:00")).is_none());
        assert_eq!(
            session.run_cleanup(&mut cleanup, at("2025-03-01 19:00:05")),
            Some(1)
        );
        assert!(session.run_cleanup(&mut cleanup, at("2025-03-01 19:00:55")).is_none());
        assert_eq!(session.registry().len(Collection::Returned), 0);
        // Scan history survives the cleanup.
        assert_eq!(session.scan_history().len(), 2);
    }
}
