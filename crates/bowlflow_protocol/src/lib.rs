//! Bowlflow protocol types.
//!
//! Canonical domain types shared across the workspace: bowl records and
//! their lifecycle status, scan events, the delivery-manifest schema, the
//! scan-code detector, and the remote key rules. These are the CANONICAL
//! definitions - use them everywhere instead of redefining per crate.

pub mod config;
pub mod detect;
pub mod keys;
pub mod manifest;
pub mod types;

pub use config::SystemConfig;
pub use detect::detect_code;
pub use keys::record_key;
pub use manifest::{
    company_from_identifier, DeliveryManifest, ManifestBox, ManifestDish, ManifestUser,
};
pub use types::{
    local_now, timestamp_millis, BowlRecord, BowlStatus, Collection, ScanContext, ScanEvent,
    ScanKind, ScanMode, DATE_FORMAT, TIME_FORMAT,
};
