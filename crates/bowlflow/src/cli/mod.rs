//! CLI commands for the bowlflow binary.
//!
//! Commands render core results; they never compute transitions or
//! aggregations themselves.

pub mod clear;
pub mod export;
pub mod import;
pub mod report;
pub mod scan;
pub mod status;

use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};

/// Base table style shared by all commands.
pub fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    table
}
