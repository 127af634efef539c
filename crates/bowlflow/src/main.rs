//! Bowlflow launcher.

use anyhow::Result;
use bowlflow::cli::{clear, export, import, report, scan, status};
use bowlflow_logging::LogConfig;
use bowlflow_protocol::SystemConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bowlflow", version, about = "Reusable bowl tracking")]
struct Cli {
    /// Verbose console logging
    #[arg(long, global = true)]
    verbose: bool,
    /// Data directory (default: ~/.bowlflow)
    #[arg(long, global = true, env = "BOWLFLOW_HOME")]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan bowls in kitchen or return mode
    Scan(scan::ScanArgs),
    /// Reconcile a delivery manifest against current state
    Import(import::ImportArgs),
    /// Overnight shift statistics
    Report(report::ReportArgs),
    /// Collection counts and outstanding bowls
    Status(status::StatusArgs),
    /// Dump collections as table, csv, or json
    Export(export::ExportArgs),
    /// Clear the returned collection now
    ClearReturned(clear::ClearArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    bowlflow_logging::init_logging(LogConfig {
        app_name: "bowlflow",
        verbose: cli.verbose,
    })?;

    let data_dir = cli.data_dir.unwrap_or_else(bowlflow_logging::bowlflow_home);
    let config = SystemConfig::resolve(data_dir);

    match cli.command {
        Commands::Scan(args) => scan::run(args, &config).await,
        Commands::Import(args) => import::run(args, &config),
        Commands::Report(args) => report::run(args, &config),
        Commands::Status(args) => status::run(args, &config),
        Commands::Export(args) => export::run(args, &config),
        Commands::ClearReturned(args) => clear::run(args, &config),
    }
}
