//! `bowlflow export` - snapshot dumps in table, csv, or json form.

use crate::cli::new_table;
use crate::export::{delimited, export_row, json_dump, EXPORT_COLUMNS};
use crate::session::Session;
use anyhow::{anyhow, Context, Result};
use bowlflow_protocol::{local_now, BowlRecord, Collection, SystemConfig};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output format: table, csv, or json
    #[arg(long, default_value = "table")]
    pub format: String,
    /// Collection to export: active, prepared, returned, or all
    #[arg(long, default_value = "all")]
    pub collection: String,
    /// Write to a file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: ExportArgs, config: &SystemConfig) -> Result<()> {
    let session = Session::open(config, None)?;
    let (records, data_type): (Vec<BowlRecord>, &str) = match args.collection.as_str() {
        "active" => (session.registry().records(Collection::Active).to_vec(), "active"),
        "prepared" => (
            session.registry().records(Collection::Prepared).to_vec(),
            "prepared",
        ),
        "returned" => (
            session.registry().records(Collection::Returned).to_vec(),
            "returned",
        ),
        "all" => {
            let mut all = Vec::new();
            for collection in Collection::ALL {
                all.extend_from_slice(session.registry().records(collection));
            }
            (all, "all")
        }
        other => return Err(anyhow!("Unknown collection: '{}'", other)),
    };

    let rendered = match args.format.as_str() {
        "json" => json_dump(&records, data_type, local_now()),
        "csv" => delimited(&records, ';'),
        "table" => {
            let mut table = new_table(&EXPORT_COLUMNS);
            for record in &records {
                table.add_row(export_row(record).to_vec());
            }
            format!("{table}\n")
        }
        other => return Err(anyhow!("Unknown format: '{}'", other)),
    };

    match &args.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write export: {}", path.display()))?,
        None => print!("{rendered}"),
    }
    Ok(())
}
