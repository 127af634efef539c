//! Core bowl-tracking types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wire format for record dates (`date` / `returnDate`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Wire format for record times.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Millisecond timestamp for a local wall-clock instant.
///
/// Used as the ordering value on records and scan events when no
/// server-assigned timestamp is available.
pub fn timestamp_millis(now: NaiveDateTime) -> i64 {
    now.and_utc().timestamp_millis()
}

/// Lifecycle state of a bowl.
/// This is the CANONICAL definition - use this everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BowlStatus {
    /// Scanned in the kitchen, ready for dispatch
    #[default]
    Prepared,
    /// Out with a customer
    Active,
    /// Back from a customer or the kitchen queue
    Returned,
}

impl BowlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BowlStatus::Prepared => "PREPARED",
            BowlStatus::Active => "ACTIVE",
            BowlStatus::Returned => "RETURNED",
        }
    }
}

impl fmt::Display for BowlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BowlStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PREPARED" => Ok(BowlStatus::Prepared),
            "ACTIVE" => Ok(BowlStatus::Active),
            "RETURNED" => Ok(BowlStatus::Returned),
            _ => Err(format!("Invalid bowl status: '{}'", s)),
        }
    }
}

/// One of the three registry collections.
///
/// A code lives in exactly one collection at a time; `BowlStatus` of a
/// record must always match the collection holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Active,
    Prepared,
    Returned,
}

impl Collection {
    /// Canonical lookup order for `find`: active, prepared, returned.
    pub const ALL: [Collection; 3] = [
        Collection::Active,
        Collection::Prepared,
        Collection::Returned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Active => "active",
            Collection::Prepared => "prepared",
            Collection::Returned => "returned",
        }
    }

    /// Collection name in the persisted/remote state shape.
    pub fn remote_name(&self) -> &'static str {
        match self {
            Collection::Active => "activeBowls",
            Collection::Prepared => "preparedBowls",
            Collection::Returned => "returnedBowls",
        }
    }

    /// The status every record in this collection must carry.
    pub fn status(&self) -> BowlStatus {
        match self {
            Collection::Active => BowlStatus::Active,
            Collection::Prepared => BowlStatus::Prepared,
            Collection::Returned => BowlStatus::Returned,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tracked physical container.
///
/// Single tagged shape with every field always present; the legacy wire
/// schema uses camelCase names and omits the return fields until the bowl
/// is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BowlRecord {
    /// Full trimmed scan input; the bowl's identity.
    pub code: String,
    /// Contents label: one letter A-Z or digit 1-4, may be empty.
    pub dish: String,
    /// Operator who last transitioned the record.
    pub user: String,
    pub company: String,
    pub customer: String,
    pub multiple_customers: bool,
    pub date: String,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_by: Option<String>,
    pub status: BowlStatus,
    /// Ordering value; local wall clock unless server-assigned.
    pub timestamp: i64,
}

impl Default for BowlRecord {
    fn default() -> Self {
        Self {
            code: String::new(),
            dish: String::new(),
            user: String::new(),
            company: String::new(),
            customer: String::new(),
            multiple_customers: false,
            date: String::new(),
            time: String::new(),
            return_date: None,
            returned_by: None,
            status: BowlStatus::Prepared,
            timestamp: 0,
        }
    }
}

impl BowlRecord {
    /// Fresh PREPARED record from a kitchen scan.
    pub fn prepared(code: &str, dish: &str, user: &str, now: NaiveDateTime) -> Self {
        Self {
            code: code.to_string(),
            dish: dish.to_string(),
            user: user.to_string(),
            date: now.format(DATE_FORMAT).to_string(),
            time: now.format(TIME_FORMAT).to_string(),
            status: BowlStatus::Prepared,
            timestamp: timestamp_millis(now),
            ..Self::default()
        }
    }

    /// Fresh ACTIVE record created directly by manifest reconciliation
    /// when no prepared record matched the code.
    pub fn imported(code: &str, dish: &str, now: NaiveDateTime) -> Self {
        Self {
            code: code.to_string(),
            dish: dish.to_string(),
            user: "JSON Import".to_string(),
            date: now.format(DATE_FORMAT).to_string(),
            time: now.format(TIME_FORMAT).to_string(),
            status: BowlStatus::Active,
            timestamp: timestamp_millis(now),
            ..Self::default()
        }
    }
}

/// What a scan attempt is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Prepare a bowl for dispatch.
    Kitchen,
    /// Take a bowl back.
    Return,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Kitchen => "kitchen",
            ScanMode::Return => "return",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kitchen" | "prepare" => Ok(ScanMode::Kitchen),
            "return" => Ok(ScanMode::Return),
            _ => Err(format!(
                "Invalid scan mode: '{}'. Expected: kitchen or return",
                s
            )),
        }
    }
}

/// Operator context a scan is evaluated under.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanContext {
    pub mode: ScanMode,
    pub user: String,
    /// Selected dish; required for kitchen scans, ignored on return.
    pub dish: String,
}

impl ScanContext {
    pub fn kitchen(user: &str, dish: &str) -> Self {
        Self {
            mode: ScanMode::Kitchen,
            user: user.to_string(),
            dish: dish.to_string(),
        }
    }

    pub fn returns(user: &str) -> Self {
        Self {
            mode: ScanMode::Return,
            user: user.to_string(),
            dish: String::new(),
        }
    }
}

/// Kind of a recorded scan event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanKind {
    Prepare,
    Return,
}

impl ScanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanKind::Prepare => "prepare",
            ScanKind::Return => "return",
        }
    }
}

impl fmt::Display for ScanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Append-only history entry for one accepted scan.
///
/// Write-once: read for aggregation only, never mutated, never pruned by
/// the daily cleanup (cleanup clears only the returned collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanEvent {
    #[serde(rename = "type")]
    pub kind: ScanKind,
    pub code: String,
    /// Millisecond timestamp of the scan.
    pub when: i64,
    pub user: String,
}

impl ScanEvent {
    pub fn new(kind: ScanKind, code: &str, user: &str, now: NaiveDateTime) -> Self {
        Self {
            kind,
            code: code.to_string(),
            when: timestamp_millis(now),
            user: user.to_string(),
        }
    }
}

/// Current UTC-independent local timestamp, for call sites without an
/// injected clock.
pub fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}
