//! Bowlflow persistence adapters.
//!
//! Two seams, both injected into the session: a local durable snapshot
//! store (JSON file, whole tracker state) and a remote replicated store
//! (whole-collection overwrite, best-effort log appends, wholesale update
//! delivery). The core never blocks on either.

pub mod local;
pub mod remote;
pub mod state;

pub use local::LocalStore;
pub use remote::{LogEntry, MemoryRemote, RemoteStore, RemoteUpdate};
pub use state::{CustomerRecord, TrackerState};
