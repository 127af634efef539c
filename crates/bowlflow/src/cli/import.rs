//! `bowlflow import` - reconcile a delivery manifest.

use crate::session::Session;
use anyhow::{Context, Result};
use bowlflow_protocol::{local_now, SystemConfig};
use clap::Args;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Manifest JSON file; omit to read from stdin
    pub file: Option<PathBuf>,
}

pub fn run(args: ImportArgs, config: &SystemConfig) -> Result<()> {
    let text = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read manifest from stdin")?;
            buf
        }
    };

    let mut session = Session::open(config, None)?;
    match session.import_manifest(&text, local_now()) {
        Ok(summary) => {
            println!(
                "Reconciled delivery{}: {} moved to active, {} created, {} skipped",
                summary
                    .company
                    .as_deref()
                    .map(|c| format!(" from {}", c))
                    .unwrap_or_default(),
                summary.moved,
                summary.created,
                summary.skipped
            );
            Ok(())
        }
        // The three manifest errors carry distinct operator messages.
        Err(err) => {
            println!("REJECTED: {}", err);
            Ok(())
        }
    }
}
