//! `bowlflow report` - overnight shift statistics.

use crate::cli::new_table;
use crate::report::{by_user_by_dish, by_user_totals, overnight_window, records_in_window};
use crate::session::Session;
use anyhow::Result;
use bowlflow_protocol::{local_now, Collection, SystemConfig};
use clap::Args;

#[derive(Debug, Args)]
pub struct ReportArgs {}

pub fn run(_args: ReportArgs, config: &SystemConfig) -> Result<()> {
    let session = Session::open(config, None)?;
    let now = local_now();
    let window = overnight_window(now);
    let prepared = session.registry().records(Collection::Prepared);
    let in_window = records_in_window(prepared, &window);

    println!(
        "Overnight window {} .. {} ({} bowls prepared)",
        window.start.format("%Y-%m-%d %H:%M"),
        window.end.format("%Y-%m-%d %H:%M"),
        in_window.len()
    );

    let mut groups = new_table(&["User", "Dish", "Count", "Earliest", "Latest"]);
    for group in by_user_by_dish(&in_window) {
        groups.add_row(vec![
            group.user,
            group.dish,
            group.count.to_string(),
            group.earliest,
            group.latest,
        ]);
    }
    println!("{groups}");

    let mut totals = new_table(&["User", "Count", "Share"]);
    for total in by_user_totals(&in_window) {
        totals.add_row(vec![
            total.user,
            total.count.to_string(),
            format!("{}%", total.percent),
        ]);
    }
    println!("{totals}");
    Ok(())
}
