//! Daily returned-collection cleanup.
//!
//! Checked on a coarse minute tick against a fixed cutoff (19:00 by
//! default). The once-per-day guard is explicit: repeated ticks within
//! the cutoff minute, or a late process start, still clear at most once
//! per calendar day.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

#[derive(Debug, Clone)]
pub struct DailyCleanup {
    cutoff: NaiveTime,
    last_run: Option<NaiveDate>,
}

impl DailyCleanup {
    pub fn new(cutoff: NaiveTime) -> Self {
        Self {
            cutoff,
            last_run: None,
        }
    }

    pub fn cutoff(&self) -> NaiveTime {
        self.cutoff
    }

    /// Whether the cleanup should fire at `now`.
    pub fn due(&self, now: NaiveDateTime) -> bool {
        now.time() >= self.cutoff && self.last_run != Some(now.date())
    }

    /// Record that the cleanup ran for `now`'s calendar day.
    pub fn mark_ran(&mut self, now: NaiveDateTime) {
        self.last_run = Some(now.date());
    }
}
