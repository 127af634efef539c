//! Delivery-manifest reconciliation.
//!
//! Reconciles a bulk delivery payload (boxes, dishes, bowl codes) against
//! the registry: prepared bowls move to active with destination metadata,
//! unknown codes are created directly in active, and codes already active
//! or returned are left alone so re-importing a manifest is a no-op.

use crate::registry::Registry;
use bowlflow_protocol::{
    company_from_identifier, BowlRecord, BowlStatus, Collection, DeliveryManifest, DATE_FORMAT,
};
use bowlflow_store::CustomerRecord;
use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{info, warn};

/// Why a manifest import failed. The three variants surface as distinct
/// operator messages: nothing pasted, not JSON, wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    #[error("Paste a delivery notification first")]
    EmptyInput,
    #[error("Delivery JSON does not parse: {0}")]
    InvalidJson(String),
    #[error("Delivery JSON does not match the expected shape")]
    InvalidFormat,
}

/// Per-import counters plus the bookkeeping the session persists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileSummary {
    pub moved: usize,
    pub created: usize,
    /// Bowls skipped because no company name could be derived.
    pub skipped: usize,
    /// Delivery/company name of the last processed box.
    pub company: Option<String>,
    pub customers: Vec<CustomerRecord>,
}

/// Parse raw operator input into a manifest. Malformed JSON and
/// well-formed JSON of the wrong shape are distinct failures.
pub fn parse_manifest(text: &str) -> Result<DeliveryManifest, ManifestError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ManifestError::EmptyInput);
    }
    let value: serde_json::Value =
        serde_json::from_str(trimmed).map_err(|err| ManifestError::InvalidJson(err.to_string()))?;
    serde_json::from_value(value).map_err(|_| ManifestError::InvalidFormat)
}

/// Reconcile every bowl code in the manifest against the registry.
pub fn reconcile(
    registry: &mut Registry,
    manifest: &DeliveryManifest,
    now: NaiveDateTime,
) -> Result<ReconcileSummary, ManifestError> {
    if manifest.boxes.is_empty() {
        return Err(ManifestError::InvalidFormat);
    }

    let today = now.format(DATE_FORMAT).to_string();
    let mut summary = ReconcileSummary::default();

    for package in &manifest.boxes {
        let company = manifest
            .delivery_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| company_from_identifier(&package.unique_identifier));

        if company.is_empty() {
            // Silent-skip policy: no company name means these bowls are
            // neither moved nor created, only counted and logged.
            let dropped: usize = package.dishes.iter().map(|d| d.bowl_codes.len()).sum();
            warn!(
                unique_identifier = %package.unique_identifier,
                dropped,
                "skipping box with underivable company name"
            );
            summary.skipped += dropped;
            continue;
        }

        for dish in &package.dishes {
            let customers = dish.customers();
            let multiple = dish.multiple_customers();
            let mut reconciled = 0usize;

            for code in &dish.bowl_codes {
                if registry.contains(Collection::Prepared, code) {
                    let company = company.clone();
                    let customers = customers.clone();
                    let label = dish.label.clone();
                    let _ = registry.move_and_transform(
                        code,
                        Collection::Prepared,
                        Collection::Active,
                        move |mut record| {
                            record.status = BowlStatus::Active;
                            record.company = company;
                            record.customer = customers;
                            record.multiple_customers = multiple;
                            // Manifest label wins only when present.
                            if !label.trim().is_empty() {
                                record.dish = label;
                            }
                            record
                        },
                    );
                    summary.moved += 1;
                    reconciled += 1;
                } else if registry.find(code).is_none() {
                    let mut record = BowlRecord::imported(code, &dish.label, now);
                    record.company = company.clone();
                    record.customer = customers.clone();
                    record.multiple_customers = multiple;
                    registry.insert(Collection::Active, record);
                    summary.created += 1;
                    reconciled += 1;
                }
                // Already active or returned: idempotent no-op.
            }

            if reconciled > 0 {
                summary.customers.push(CustomerRecord {
                    company: company.clone(),
                    customer: customers,
                    dish: dish.label.clone(),
                    bowl_count: reconciled,
                    date: today.clone(),
                });
            }
        }

        summary.company = Some(company);
    }

    info!(
        moved = summary.moved,
        created = summary.created,
        skipped = summary.skipped,
        "manifest reconciled"
    );
    Ok(summary)
}
