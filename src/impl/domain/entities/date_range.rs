use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use fractic_server_error::ServerError;

use crate::errors::InvalidRange;

/// Inclusive range of calendar days, `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ServerError> {
        if start > end {
            return Err(InvalidRange::new(&start, &end));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Overlap of both ranges, or `None` if they share no day.
    pub fn intersect(&self, other: &DateRange) -> Option<DateRange> {
        let start = std::cmp::max(self.start, other.start);
        let end = std::cmp::min(self.end, other.end);
        (start <= end).then_some(DateRange { start, end })
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.intersect(other).is_some()
    }

    /// Half-open instant window `[start 00:00, end + 1 day 00:00)` covered by
    /// the range. Ranges ending on the last representable day are closed at
    /// `NaiveDateTime::MAX`.
    pub fn instant_window(&self) -> (NaiveDateTime, NaiveDateTime) {
        let until = self
            .end
            .succ_opt()
            .map_or(NaiveDateTime::MAX, |next| next.and_time(NaiveTime::MIN));
        (self.start.and_time(NaiveTime::MIN), until)
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
