use chrono::Days;
use fractic_server_error::ServerError;

use crate::entities::{CareType, Contract, DateRange, HoursType};

const DAYS_PER_WEEK: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SplitPolicy {
    /// Consecutive 7-day buckets anchored at the first day of the range; the
    /// last bucket may be shorter.
    Weekly,
    /// The whole range as a single period.
    WholeRange,
}

pub(crate) struct PeriodSplitter {
    policy: SplitPolicy,
}

impl PeriodSplitter {
    pub(crate) fn new(policy: SplitPolicy) -> Self {
        Self { policy }
    }

    /// Only ambulante contracts with a weekly hours budget are billed week by
    /// week. Accommodation is billed over the full range by elapsed days.
    pub(crate) fn for_contract(contract: &Contract) -> Self {
        let policy = match (contract.care_type, contract.hours_type) {
            (CareType::Ambulante, Some(HoursType::Weekly)) => SplitPolicy::Weekly,
            (CareType::Ambulante, Some(HoursType::AllPeriod) | None) => SplitPolicy::WholeRange,
            (CareType::Accommodation, _) => SplitPolicy::WholeRange,
        };
        Self::new(policy)
    }

    /// Ordered, disjoint periods whose union is exactly `effective`.
    pub(crate) fn split(&self, effective: &DateRange) -> Result<Vec<DateRange>, ServerError> {
        match self.policy {
            SplitPolicy::WholeRange => Ok(vec![*effective]),
            SplitPolicy::Weekly => weekly_buckets(effective),
        }
    }
}

fn weekly_buckets(effective: &DateRange) -> Result<Vec<DateRange>, ServerError> {
    let mut buckets = Vec::new();
    let mut bucket_start = effective.start();
    loop {
        let bucket_end = bucket_start
            .checked_add_days(Days::new(DAYS_PER_WEEK - 1))
            .map_or(effective.end(), |d| std::cmp::min(d, effective.end()));
        buckets.push(DateRange::new(bucket_start, bucket_end)?);
        if bucket_end >= effective.end() {
            break;
        }
        match bucket_end.succ_opt() {
            Some(next) => bucket_start = next,
            None => break,
        }
    }
    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
        DateRange::new(start, end).unwrap()
    }

    fn assert_exact_cover(periods: &[DateRange], effective: &DateRange) {
        assert_eq!(periods.first().unwrap().start(), effective.start());
        assert_eq!(periods.last().unwrap().end(), effective.end());
        for pair in periods.windows(2) {
            assert_eq!(pair[0].end().succ_opt().unwrap(), pair[1].start());
        }
        let covered: i64 = periods.iter().map(DateRange::num_days).sum();
        assert_eq!(covered, effective.num_days());
    }

    #[test]
    fn weekly_split_anchors_at_start_and_shortens_last_bucket() {
        let effective = range(d(2024, 6, 3), d(2024, 6, 19));
        let periods = PeriodSplitter::new(SplitPolicy::Weekly).split(&effective).unwrap();

        assert_eq!(
            periods,
            vec![
                range(d(2024, 6, 3), d(2024, 6, 9)),
                range(d(2024, 6, 10), d(2024, 6, 16)),
                range(d(2024, 6, 17), d(2024, 6, 19)),
            ]
        );
        assert_exact_cover(&periods, &effective);
    }

    #[test]
    fn weekly_split_of_exact_weeks() {
        let effective = range(d(2024, 6, 1), d(2024, 6, 14));
        let periods = PeriodSplitter::new(SplitPolicy::Weekly).split(&effective).unwrap();
        assert_eq!(periods.len(), 2);
        assert_exact_cover(&periods, &effective);
    }

    #[test]
    fn single_day_range_is_one_bucket() {
        let effective = range(d(2024, 2, 29), d(2024, 2, 29));
        for policy in [SplitPolicy::Weekly, SplitPolicy::WholeRange] {
            let periods = PeriodSplitter::new(policy).split(&effective).unwrap();
            assert_eq!(periods, vec![effective]);
        }
    }

    #[test]
    fn whole_range_is_not_split() {
        let effective = range(d(2024, 1, 1), d(2024, 12, 31));
        let periods = PeriodSplitter::new(SplitPolicy::WholeRange)
            .split(&effective)
            .unwrap();
        assert_eq!(periods, vec![effective]);
    }

    #[test]
    fn buckets_stay_disjoint_across_many_lengths() {
        for len in 0..60 {
            let start = d(2023, 12, 20);
            let effective = range(start, start + chrono::Duration::days(len));
            let periods = PeriodSplitter::new(SplitPolicy::Weekly).split(&effective).unwrap();
            assert_exact_cover(&periods, &effective);
            assert!(periods.iter().all(|p| p.num_days() <= 7));
        }
    }
}
