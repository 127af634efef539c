//! Persisted tracker state shape.

use bowlflow_protocol::{BowlRecord, ScanEvent};
use serde::{Deserialize, Serialize};

/// Per-delivery customer bookkeeping captured at reconciliation time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerRecord {
    pub company: String,
    pub customer: String,
    pub dish: String,
    pub bowl_count: usize,
    pub date: String,
}

/// The full persisted snapshot.
///
/// Field names follow the legacy wire schema so snapshots interoperate
/// with the existing remote store; every field defaults when missing so
/// older snapshots load cleanly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerState {
    pub active_bowls: Vec<BowlRecord>,
    pub prepared_bowls: Vec<BowlRecord>,
    pub returned_bowls: Vec<BowlRecord>,
    pub scan_history: Vec<ScanEvent>,
    pub my_scans: Vec<ScanEvent>,
    pub customer_data: Vec<CustomerRecord>,
    pub last_sync: Option<i64>,
    pub last_delivery_date: Option<String>,
    pub delivery_days_ago: Option<i64>,
    pub last_delivery_company: Option<String>,
}
