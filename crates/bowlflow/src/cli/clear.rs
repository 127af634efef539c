//! `bowlflow clear-returned` - operator-triggered returned clear.

use crate::session::Session;
use anyhow::Result;
use bowlflow_protocol::{local_now, SystemConfig};
use clap::Args;

#[derive(Debug, Args)]
pub struct ClearArgs {}

pub fn run(_args: ClearArgs, config: &SystemConfig) -> Result<()> {
    let mut session = Session::open(config, None)?;
    let removed = session.clear_returned(local_now());
    println!("Cleared {} returned bowls", removed);
    Ok(())
}
