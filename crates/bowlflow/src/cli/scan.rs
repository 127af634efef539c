//! `bowlflow scan` - one-shot or interactive scanning.

use crate::cleanup::DailyCleanup;
use crate::engine::ScanOutcome;
use crate::session::Session;
use anyhow::{anyhow, Result};
use bowlflow_protocol::{local_now, ScanContext, ScanKind, ScanMode, SystemConfig};
use clap::Args;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Scan mode: kitchen or return
    #[arg(long)]
    pub mode: String,
    /// Operator name (falls back to BOWLFLOW_USER)
    #[arg(long)]
    pub user: Option<String>,
    /// Dish label, required for kitchen scans
    #[arg(long)]
    pub dish: Option<String>,
    /// Bowl code; omit to read scans from stdin until EOF
    pub code: Option<String>,
}

pub async fn run(args: ScanArgs, config: &SystemConfig) -> Result<()> {
    let mode: ScanMode = args.mode.parse().map_err(|err: String| anyhow!(err))?;
    let user = args
        .user
        .or_else(|| config.default_user.clone())
        .unwrap_or_default();
    let ctx = ScanContext {
        mode,
        user,
        dish: args.dish.unwrap_or_default(),
    };

    let mut session = Session::open(config, None)?;
    match args.code {
        Some(code) => {
            report_outcome(session.handle_scan(&ctx, &code, local_now()));
            Ok(())
        }
        None => watch(&mut session, &ctx, config).await,
    }
}

/// Interactive loop: one scan per stdin line, with the minute ticker
/// driving the daily cleanup.
async fn watch(session: &mut Session, ctx: &ScanContext, config: &SystemConfig) -> Result<()> {
    let mut cleanup = DailyCleanup::new(config.cleanup_cutoff);
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(60));
    println!("Scanning in {} mode as '{}'. Ctrl-D to stop.", ctx.mode, ctx.user);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(raw) => report_outcome(session.handle_scan(ctx, &raw, local_now())),
                    None => break,
                }
            }
            _ = ticker.tick() => {
                if let Some(removed) = session.run_cleanup(&mut cleanup, local_now()) {
                    println!("Daily cleanup: cleared {} returned bowls", removed);
                }
            }
        }
    }
    Ok(())
}

fn report_outcome(result: Result<ScanOutcome, crate::engine::ScanError>) {
    match result {
        Ok(outcome) => {
            let verb = match outcome.kind {
                ScanKind::Prepare => "prepared",
                ScanKind::Return => "returned",
            };
            match outcome.from {
                Some(from) => println!("OK: {} {} (was {})", verb, outcome.code, from),
                None => println!("OK: {} {}", verb, outcome.code),
            }
        }
        // Rejections are normal operator flow, not process failures.
        Err(err) => println!("REJECTED: {}", err),
    }
}
