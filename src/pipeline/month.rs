//! Calendar month keys for cohort grouping

use chrono::{Datelike, NaiveDate};
use std::fmt;

/// A calendar month, ordered chronologically.
///
/// Field order matters: the derived `Ord` compares year first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Truncate a date to its month
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Absolute month index (`year * 12 + month`), exact across year boundaries
    pub fn index(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month)
    }

    /// Whole calendar months from `start` to `self`; negative if `self` is earlier
    pub fn months_since(&self, start: YearMonth) -> i64 {
        self.index() - start.index()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
