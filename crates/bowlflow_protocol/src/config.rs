//! System configuration shared by the binary and the session.

use chrono::NaiveTime;
use std::path::PathBuf;

/// Name of the environment variable overriding the cleanup cutoff (HH:MM).
pub const CLEANUP_CUTOFF_ENV: &str = "BOWLFLOW_CLEANUP_CUTOFF";

/// Canonical system configuration used by the launcher and session.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    /// Data directory holding the state snapshot
    pub data_dir: PathBuf,
    /// Local snapshot file (JSON, whole tracker state)
    pub state_path: PathBuf,
    /// Daily cutoff after which the returned collection is cleared
    pub cleanup_cutoff: NaiveTime,
    /// Operator preselected for scans (CLI convenience)
    pub default_user: Option<String>,
}

impl SystemConfig {
    /// Resolve a configuration rooted at `data_dir`, honoring env overrides.
    pub fn resolve(data_dir: PathBuf) -> Self {
        let cleanup_cutoff = std::env::var(CLEANUP_CUTOFF_ENV)
            .ok()
            .and_then(|raw| NaiveTime::parse_from_str(raw.trim(), "%H:%M").ok())
            .unwrap_or_else(default_cutoff);
        let state_path = data_dir.join("state.json");
        Self {
            data_dir,
            state_path,
            cleanup_cutoff,
            default_user: std::env::var("BOWLFLOW_USER").ok().filter(|s| !s.is_empty()),
        }
    }
}

fn default_cutoff() -> NaiveTime {
    NaiveTime::from_hms_opt(19, 0, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_state_path_under_data_dir() {
        let config = SystemConfig::resolve(PathBuf::from("/tmp/bowlflow-test"));
        assert_eq!(config.state_path, PathBuf::from("/tmp/bowlflow-test/state.json"));
    }

    #[test]
    fn default_cutoff_is_seven_pm() {
        assert_eq!(default_cutoff(), NaiveTime::from_hms_opt(19, 0, 0).unwrap());
    }
}
