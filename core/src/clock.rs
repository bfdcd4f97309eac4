//! Calendar arithmetic: month boundaries in UTC epoch seconds.

use crate::types::{EpochSeconds, Month, Year};
use chrono::{Months, NaiveDate};

/// Inclusive epoch-second bounds of one calendar month in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub month: Month,
    pub start: EpochSeconds,
    pub end:   EpochSeconds,
}

impl MonthWindow {
    /// Bounds for `month` of `year`: midnight of the 1st through the
    /// last second before the next month begins.
    /// Returns None for a month outside 1..=12 or an unrepresentable year.
    pub fn of(year: Year, month: Month) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = first.checked_add_months(Months::new(1))?;
        let start = first.and_hms_opt(0, 0, 0)?.and_utc().timestamp();
        let end = next.and_hms_opt(0, 0, 0)?.and_utc().timestamp() - 1;
        Some(Self { month, start, end })
    }

    /// Width of the window in seconds (end - start).
    pub fn range(&self) -> EpochSeconds {
        self.end - self.start
    }

    pub fn contains(&self, t: EpochSeconds) -> bool {
        (self.start..=self.end).contains(&t)
    }
}
