//! Shift reporting over registry snapshots.
//!
//! Pure read-only aggregation; every function takes the clock as an
//! argument and never touches the registry.

use bowlflow_protocol::{BowlRecord, DATE_FORMAT, TIME_FORMAT};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use std::collections::BTreeMap;

/// The fixed overnight reporting cycle: 22:00 one day to 10:00 the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OvernightWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl OvernightWindow {
    pub fn contains(&self, when: NaiveDateTime) -> bool {
        self.start <= when && when < self.end
    }
}

/// The overnight cycle `now` belongs to.
///
/// From 22:00 onward the window is tonight's (today 22:00 to tomorrow
/// 10:00); any earlier time of day reports on the most recent window
/// (yesterday 22:00 to today 10:00).
pub fn overnight_window(now: NaiveDateTime) -> OvernightWindow {
    let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default();
    let twenty_two = NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default();
    let (start_day, end_day) = if now.time() >= twenty_two {
        (now.date(), next_day(now.date()))
    } else {
        (previous_day(now.date()), now.date())
    };
    OvernightWindow {
        start: start_day.and_time(twenty_two),
        end: end_day.and_time(ten),
    }
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(date)
}

fn previous_day(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(1)).unwrap_or(date)
}

/// Parse a record's `date`/`time` fields into one instant. Records with
/// unparseable fields fall outside every window.
pub fn record_datetime(record: &BowlRecord) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(&record.date, DATE_FORMAT).ok()?;
    let time = NaiveTime::parse_from_str(&record.time, TIME_FORMAT).ok()?;
    Some(date.and_time(time))
}

/// Prepared records falling inside the window.
pub fn records_in_window<'a>(
    records: &'a [BowlRecord],
    window: &OvernightWindow,
) -> Vec<&'a BowlRecord> {
    records
        .iter()
        .filter(|record| record_datetime(record).is_some_and(|when| window.contains(when)))
        .collect()
}

/// One `(user, dish)` group of prepared bowls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DishGroup {
    pub user: String,
    pub dish: String,
    pub count: usize,
    pub earliest: String,
    pub latest: String,
}

/// Group records by `(user, dish)` with count and time range per group.
///
/// Sorted by dish first (letters before digits, digits numerically,
/// letters alphabetically), then by user.
pub fn by_user_by_dish(records: &[&BowlRecord]) -> Vec<DishGroup> {
    let mut groups: BTreeMap<(String, String), Vec<&BowlRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.user.clone(), record.dish.clone()))
            .or_default()
            .push(record);
    }

    let mut result: Vec<DishGroup> = groups
        .into_iter()
        .map(|((user, dish), members)| {
            // Order by instant, not time-of-day: an overnight window
            // straddles midnight.
            let mut instants: Vec<(NaiveDateTime, &str)> = members
                .iter()
                .filter_map(|r| record_datetime(r).map(|when| (when, r.time.as_str())))
                .collect();
            instants.sort_unstable();
            DishGroup {
                user,
                dish,
                count: members.len(),
                earliest: instants.first().map(|(_, t)| t.to_string()).unwrap_or_default(),
                latest: instants.last().map(|(_, t)| t.to_string()).unwrap_or_default(),
            }
        })
        .collect();
    result.sort_by(|a, b| {
        dish_sort_key(&a.dish)
            .cmp(&dish_sort_key(&b.dish))
            .then_with(|| a.user.cmp(&b.user))
    });
    result
}

/// Sort key placing letter dishes before numeric ones, numeric ascending.
fn dish_sort_key(dish: &str) -> (u8, u32, String) {
    match dish.parse::<u32>() {
        Ok(n) => (1, n, dish.to_string()),
        Err(_) => (0, 0, dish.to_string()),
    }
}

/// Per-user totals over a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTotal {
    pub user: String,
    pub count: usize,
    /// Share of the window total, rounded to the nearest integer. A zero
    /// total yields 0% rather than a division error.
    pub percent: u32,
}

pub fn by_user_totals(records: &[&BowlRecord]) -> Vec<UserTotal> {
    let total = records.len();
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.user.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(user, count)| UserTotal {
            user: user.to_string(),
            count,
            percent: if total == 0 {
                0
            } else {
                ((count as f64 / total as f64) * 100.0).round() as u32
            },
        })
        .collect()
}

/// Business days (Mon-Fri) a record has been live: weekdays from its date
/// through `today` inclusive, minus one so the start day itself does not
/// count. Saturates at zero.
pub fn business_days_active(start: NaiveDate, today: NaiveDate) -> i64 {
    if start > today {
        return 0;
    }
    let mut days = 0i64;
    let mut cursor = start;
    while cursor <= today {
        if !matches!(cursor.weekday(), Weekday::Sat | Weekday::Sun) {
            days += 1;
        }
        cursor = next_day(cursor);
    }
    (days - 1).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn prepared(user: &str, dish: &str, date: &str, time: &str) -> BowlRecord {
        BowlRecord {
            code: format!("{user}-{dish}-{date}-{time}"),
            user: user.to_string(),
            dish: dish.to_string(),
            date: date.to_string(),
            time: time.to_string(),
            ..BowlRecord::default()
        }
    }

    #[test]
    fn window_before_ten_spans_the_previous_night() {
        let window = overnight_window(at("2025-03-02 03:00:00"));
        assert_eq!(window.start, at("2025-03-01 22:00:00"));
        assert_eq!(window.end, at("2025-03-02 10:00:00"));
    }

    #[test]
    fn window_after_twenty_two_is_tonights() {
        let window = overnight_window(at("2025-03-02 22:30:00"));
        assert_eq!(window.start, at("2025-03-02 22:00:00"));
        assert_eq!(window.end, at("2025-03-03 10:00:00"));
    }

    #[test]
    fn daytime_reports_on_the_most_recent_window() {
        let window = overnight_window(at("2025-03-02 14:00:00"));
        assert_eq!(window.start, at("2025-03-01 22:00:00"));
        assert!(window.contains(at("2025-03-02 09:59:59")));
        assert!(!window.contains(at("2025-03-02 10:00:00")));
    }

    #[test]
    fn overnight_totals_split_fifty_fifty() {
        let records = vec![
            prepared("A", "B", "2025-03-01", "23:30:00"),
            prepared("B", "B", "2025-03-02", "09:00:00"),
            prepared("C", "B", "2025-03-02", "12:00:00"), // outside window
        ];
        let window = overnight_window(at("2025-03-02 03:00:00"));
        let in_window = records_in_window(&records, &window);
        assert_eq!(in_window.len(), 2);
        let totals = by_user_totals(&in_window);
        assert_eq!(totals.len(), 2);
        assert!(totals.iter().all(|t| t.percent == 50 && t.count == 1));
    }

    #[test]
    fn empty_window_yields_no_totals_and_no_division_error() {
        let records: Vec<BowlRecord> = Vec::new();
        let window = overnight_window(at("2025-03-02 03:00:00"));
        assert!(by_user_totals(&records_in_window(&records, &window)).is_empty());
    }

    #[test]
    fn groups_carry_count_and_time_range() {
        let records = vec![
            prepared("A", "B", "2025-03-01", "23:30:00"),
            prepared("A", "B", "2025-03-02", "08:15:00"),
            prepared("A", "2", "2025-03-02", "09:00:00"),
        ];
        let refs: Vec<&BowlRecord> = records.iter().collect();
        let groups = by_user_by_dish(&refs);
        assert_eq!(groups.len(), 2);
        // Letter dish sorts before the numeric one. The 23:30 record is a
        // day earlier, so it is the chronological start of the range.
        assert_eq!(groups[0].dish, "B");
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].earliest, "23:30:00");
        assert_eq!(groups[0].latest, "08:15:00");
        assert_eq!(groups[1].dish, "2");
    }

    #[test]
    fn dishes_sort_letters_then_digits_numeric() {
        let records = vec![
            prepared("A", "10", "2025-03-01", "23:00:00"),
            prepared("A", "2", "2025-03-01", "23:00:00"),
            prepared("A", "Z", "2025-03-01", "23:00:00"),
            prepared("A", "B", "2025-03-01", "23:00:00"),
        ];
        let refs: Vec<&BowlRecord> = records.iter().collect();
        let dishes: Vec<String> = by_user_by_dish(&refs).into_iter().map(|g| g.dish).collect();
        assert_eq!(dishes, vec!["B", "Z", "2", "10"]);
    }

    #[test]
    fn business_days_exclude_weekends_and_the_start_day() {
        // Monday through Friday of the same week.
        assert_eq!(business_days_active(day("2025-03-03"), day("2025-03-07")), 4);
        // Same day: zero.
        assert_eq!(business_days_active(day("2025-03-03"), day("2025-03-03")), 0);
        // Friday to Monday: only Monday counts.
        assert_eq!(business_days_active(day("2025-03-07"), day("2025-03-10")), 1);
        // Saturday to Sunday: saturates at zero.
        assert_eq!(business_days_active(day("2025-03-08"), day("2025-03-09")), 0);
        // Start after today: zero.
        assert_eq!(business_days_active(day("2025-03-10"), day("2025-03-07")), 0);
    }
}
