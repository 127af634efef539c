//! Scan state-transition engine.
//!
//! One canonical implementation of the kitchen/return state machine: takes
//! the operator context plus a raw scanner string, validates, and applies
//! exactly one registry transition (or rejects with no mutation at all).

use crate::registry::Registry;
use bowlflow_protocol::{
    detect_code, BowlRecord, BowlStatus, Collection, ScanContext, ScanEvent, ScanKind, ScanMode,
    DATE_FORMAT,
};
use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::debug;

/// Why a scan attempt was rejected.
///
/// Input rejections (`EmptyScan`, `Unrecognized`, `MissingOperator`,
/// `MissingDish`) never reach the remote error stream; business-rule
/// rejections (`AlreadyPreparedToday`, `NotFound`) are appended there
/// best-effort. None of them mutates the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("Scan a bowl code first")]
    EmptyScan,
    #[error("Not a recognized bowl code: {0}")]
    Unrecognized(String),
    #[error("Select an operator before scanning")]
    MissingOperator,
    #[error("Select a dish before kitchen scans")]
    MissingDish,
    #[error("Bowl already prepared today")]
    AlreadyPreparedToday,
    #[error("Bowl not found in system")]
    NotFound,
}

impl ScanError {
    /// Business-rule rejections are logged to the remote error stream;
    /// plain input rejections are not.
    pub fn is_business_rule(&self) -> bool {
        matches!(self, ScanError::AlreadyPreparedToday | ScanError::NotFound)
    }
}

/// An accepted transition.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub code: String,
    pub kind: ScanKind,
    /// Collection the record left, when it existed before the scan.
    pub from: Option<Collection>,
    pub to: Collection,
    pub event: ScanEvent,
}

/// Validate the operator context for a scan attempt.
///
/// Checked once per attempt, before any collection lookup: an operator
/// must be selected, and kitchen scans additionally need a dish.
pub fn validate_context(ctx: &ScanContext) -> Result<(), ScanError> {
    if ctx.user.trim().is_empty() {
        return Err(ScanError::MissingOperator);
    }
    if ctx.mode == ScanMode::Kitchen && ctx.dish.trim().is_empty() {
        return Err(ScanError::MissingDish);
    }
    Ok(())
}

/// Apply one scan to the registry.
///
/// On `Ok` exactly one record changed collection (or was created); on
/// `Err` the registry is untouched.
pub fn apply_scan(
    registry: &mut Registry,
    ctx: &ScanContext,
    raw: &str,
    now: NaiveDateTime,
) -> Result<ScanOutcome, ScanError> {
    validate_context(ctx)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ScanError::EmptyScan);
    }
    let code = detect_code(trimmed).ok_or_else(|| ScanError::Unrecognized(trimmed.to_string()))?;

    match ctx.mode {
        ScanMode::Kitchen => prepare_scan(registry, ctx, code, now),
        ScanMode::Return => return_scan(registry, ctx, code, now),
    }
}

fn prepare_scan(
    registry: &mut Registry,
    ctx: &ScanContext,
    code: &str,
    now: NaiveDateTime,
) -> Result<ScanOutcome, ScanError> {
    let today = now.format(DATE_FORMAT).to_string();
    if let Some(existing) = registry.find_in(Collection::Prepared, code) {
        // Same code prepared on an earlier date is allowed to re-enter;
        // the stale record is replaced below rather than duplicated.
        if existing.date == today {
            return Err(ScanError::AlreadyPreparedToday);
        }
    }

    // Defensive cleanup: a bowl that was out or already returned can be
    // re-prepared, and a non-today prepared record is superseded.
    let mut from = None;
    for collection in [Collection::Active, Collection::Returned, Collection::Prepared] {
        if registry.remove(collection, code).is_some() {
            debug!(code, %collection, "re-preparing bowl; removed stale record");
            from = from.or(Some(collection));
        }
    }

    registry.insert(
        Collection::Prepared,
        BowlRecord::prepared(code, &ctx.dish, &ctx.user, now),
    );
    let event = ScanEvent::new(ScanKind::Prepare, code, &ctx.user, now);
    Ok(ScanOutcome {
        code: code.to_string(),
        kind: ScanKind::Prepare,
        from,
        to: Collection::Prepared,
        event,
    })
}

fn return_scan(
    registry: &mut Registry,
    ctx: &ScanContext,
    code: &str,
    now: NaiveDateTime,
) -> Result<ScanOutcome, ScanError> {
    let today = now.format(DATE_FORMAT).to_string();
    // Canonical lookup order for returns: active, then prepared.
    let from = [Collection::Active, Collection::Prepared]
        .into_iter()
        .find(|collection| registry.contains(*collection, code))
        .ok_or(ScanError::NotFound)?;

    let user = ctx.user.clone();
    let _ = registry.move_and_transform(code, from, Collection::Returned, move |mut record| {
        record.status = BowlStatus::Returned;
        record.returned_by = Some(user);
        record.return_date = Some(today);
        record
    });
    let event = ScanEvent::new(ScanKind::Return, code, &ctx.user, now);
    Ok(ScanOutcome {
        code: code.to_string(),
        kind: ScanKind::Return,
        from: Some(from),
        to: Collection::Returned,
        event,
    })
}
