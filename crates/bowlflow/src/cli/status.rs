//! `bowlflow status` - collection counts and outstanding bowls.

use crate::cli::new_table;
use crate::report::business_days_active;
use crate::session::Session;
use anyhow::Result;
use bowlflow_protocol::{local_now, Collection, SystemConfig, DATE_FORMAT};
use chrono::NaiveDate;
use clap::Args;
use comfy_table::{Cell, Color};

/// Active bowls out at least this many business days are highlighted.
const OVERDUE_BUSINESS_DAYS: i64 = 5;

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Also list every active bowl with its days out
    #[arg(long)]
    pub active: bool,
}

pub fn run(args: StatusArgs, config: &SystemConfig) -> Result<()> {
    let session = Session::open(config, None)?;
    let today = local_now().date();

    let mut counts = new_table(&["Collection", "Bowls"]);
    for collection in Collection::ALL {
        counts.add_row(vec![
            collection.to_string(),
            session.registry().len(collection).to_string(),
        ]);
    }
    println!("{counts}");

    let (date, company) = session.last_delivery();
    if let Some(date) = date {
        println!(
            "Last delivery: {}{}",
            date,
            company.map(|c| format!(" ({})", c)).unwrap_or_default()
        );
    }

    if args.active {
        let mut table = new_table(&["Code", "Dish", "Company", "Customer", "Days out"]);
        for record in session.registry().records(Collection::Active) {
            let days = NaiveDate::parse_from_str(&record.date, DATE_FORMAT)
                .map(|date| business_days_active(date, today))
                .unwrap_or(0);
            let days_cell = if days >= OVERDUE_BUSINESS_DAYS {
                Cell::new(days.to_string()).fg(Color::Red)
            } else {
                Cell::new(days.to_string())
            };
            table.add_row(vec![
                Cell::new(&record.code),
                Cell::new(&record.dish),
                Cell::new(&record.company),
                Cell::new(&record.customer),
                days_cell,
            ]);
        }
        println!("{table}");
    }
    Ok(())
}
