//! Bowlflow - scan-driven tracking for reusable delivery containers.
//!
//! The core is a deterministic state-transition engine over three bowl
//! collections (prepared, active, returned), fed by barcode scans and bulk
//! delivery manifests, with a local JSON snapshot and a best-effort remote
//! mirror behind injected adapter seams.

pub mod cleanup;
pub mod cli;
pub mod engine;
pub mod export;
pub mod reconcile;
pub mod registry;
pub mod report;
pub mod session;

pub use cleanup::DailyCleanup;
pub use engine::{ScanError, ScanOutcome};
pub use reconcile::{ManifestError, ReconcileSummary};
pub use registry::Registry;
pub use session::Session;
