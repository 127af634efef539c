//! Read-only export rendering of registry snapshots.
//!
//! Consumers of core state, never mutators. The column set is fixed at
//! nine to match the spreadsheet-backed endpoint's row schema.

use bowlflow_protocol::{BowlRecord, DATE_FORMAT};
use chrono::NaiveDateTime;
use serde_json::json;

/// Fixed export column set (spreadsheet row schema).
pub const EXPORT_COLUMNS: [&str; 9] = [
    "code",
    "dish",
    "user",
    "company",
    "customer",
    "date",
    "time",
    "status",
    "returnedBy",
];

/// Values for one record in `EXPORT_COLUMNS` order.
pub fn export_row(record: &BowlRecord) -> [String; 9] {
    [
        record.code.clone(),
        record.dish.clone(),
        record.user.clone(),
        record.company.clone(),
        record.customer.clone(),
        record.date.clone(),
        record.time.clone(),
        record.status.to_string(),
        record.returned_by.clone().unwrap_or_default(),
    ]
}

/// Raw JSON dump with the `exportDate`/`dataType`/`records` envelope.
pub fn json_dump(records: &[BowlRecord], data_type: &str, now: NaiveDateTime) -> String {
    let envelope = json!({
        "exportDate": now.format(DATE_FORMAT).to_string(),
        "dataType": data_type,
        "records": records,
    });
    serde_json::to_string_pretty(&envelope).unwrap_or_else(|_| "{}".to_string())
}

/// Delimited text rendering: header row plus one row per record.
pub fn delimited(records: &[BowlRecord], separator: char) -> String {
    let sep = separator.to_string();
    let mut out = EXPORT_COLUMNS.join(&sep);
    out.push('\n');
    for record in records {
        out.push_str(&export_row(record).join(&sep));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn record() -> BowlRecord {
        let mut r = BowlRecord::prepared("VYTAL-1", "B", "Hamid", at("2025-03-01 08:00:00"));
        r.company = "Acme".to_string();
        r
    }

    #[test]
    fn dump_carries_the_envelope_fields() {
        let dump = json_dump(&[record()], "prepared", at("2025-03-01 09:00:00"));
        let value: serde_json::Value = serde_json::from_str(&dump).unwrap();
        assert_eq!(value["exportDate"], "2025-03-01");
        assert_eq!(value["dataType"], "prepared");
        assert_eq!(value["records"][0]["code"], "VYTAL-1");
    }

    #[test]
    fn delimited_has_a_header_and_nine_columns() {
        let text = delimited(&[record()], ';');
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap().split(';').count(), 9);
        let row = lines.next().unwrap();
        assert_eq!(row.split(';').count(), 9);
        assert!(row.starts_with("VYTAL-1;B;Hamid;Acme"));
    }
}
