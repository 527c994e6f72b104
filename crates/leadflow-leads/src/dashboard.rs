//! Dashboard aggregator: funnel counts over a creation-time window
//! plus the lead source distribution.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use leadflow_core::error::{LeadflowError, LeadflowResult};
use leadflow_core::models::lead::LeadStatus;
use leadflow_core::repository::LeadRepository;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_leads: u64,
    pub qualified_leads: u64,
    pub unqualified_leads: u64,
    pub lost_leads: u64,
    /// Whatever is left of the total once the three terminal statuses
    /// are taken out.
    pub pending_leads: i64,
    /// Percentage of qualified leads; `0` for an empty window.
    pub conversion_rate: f64,
    /// Lead count per source label, over all leads.
    pub source_distribution: BTreeMap<String, u64>,
}

/// Raw counts for one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FunnelCounts {
    pub total: u64,
    pub qualified: u64,
    pub unqualified: u64,
    pub lost: u64,
}

impl FunnelCounts {
    pub fn into_stats(self, source_distribution: BTreeMap<String, u64>) -> DashboardStats {
        let pending =
            self.total as i64 - (self.qualified + self.unqualified + self.lost) as i64;
        let conversion_rate = if self.total == 0 {
            0.0
        } else {
            self.qualified as f64 / self.total as f64 * 100.0
        };

        DashboardStats {
            total_leads: self.total,
            qualified_leads: self.qualified,
            unqualified_leads: self.unqualified,
            lost_leads: self.lost,
            pending_leads: pending,
            conversion_rate,
            source_distribution,
        }
    }
}

const GAP_STEP: TimeDelta = TimeDelta::minutes(15);
const GAP_SEARCH_STEPS: u32 = 4 * 24;

/// Resolve a local wall-clock time. A time inside a DST gap moves
/// forward to the first wall-clock time after the gap.
fn to_utc<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    let mut local = naive;
    for _ in 0..=GAP_SEARCH_STEPS {
        if let Some(dt) = tz.from_local_datetime(&local).earliest() {
            return dt.with_timezone(&Utc);
        }
        local += GAP_STEP;
    }
    naive.and_utc()
}

/// First and last instant of the calendar month containing `today`,
/// read in `tz`.
pub fn month_window_in<Tz: TimeZone>(tz: &Tz, today: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let first = today.with_day(1).unwrap_or(today);
    let next_month = first
        .checked_add_months(chrono::Months::new(1))
        .unwrap_or(NaiveDate::MAX);

    let start = to_utc(tz, first.and_time(chrono::NaiveTime::MIN));
    let end = to_utc(tz, next_month.and_time(chrono::NaiveTime::MIN)) - TimeDelta::milliseconds(1);
    (start, end)
}

/// The current calendar month in server local time.
pub fn current_month_window() -> (DateTime<Utc>, DateTime<Utc>) {
    month_window_in(&Local, Local::now().date_naive())
}

pub struct DashboardService<L: LeadRepository> {
    leads: L,
}

impl<L: LeadRepository> DashboardService<L> {
    pub fn new(leads: L) -> Self {
        Self { leads }
    }

    /// Funnel statistics for `[from, to]`. When either bound is
    /// missing the window is the current month.
    pub async fn compute_stats(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> LeadflowResult<DashboardStats> {
        let (from, to) = match (from, to) {
            (Some(from), Some(to)) => (from, to),
            _ => current_month_window(),
        };
        if from > to {
            return Err(LeadflowError::validation(
                "fromDate must not be after toDate",
            ));
        }

        let counts = FunnelCounts {
            total: self.leads.count_created_between(from, to).await?,
            qualified: self.count(LeadStatus::Qualified, from, to).await?,
            unqualified: self.count(LeadStatus::Unqualified, from, to).await?,
            lost: self.count(LeadStatus::Lost, from, to).await?,
        };

        let sources = self
            .leads
            .count_by_source()
            .await?
            .into_iter()
            .filter_map(|c| c.source.map(|s| (s, c.total)))
            .collect();

        Ok(counts.into_stats(sources))
    }

    async fn count(
        &self,
        status: LeadStatus,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> LeadflowResult<u64> {
        self.leads
            .count_by_status_created_between(status, from, to)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, MappedLocalTime};

    #[test]
    fn pending_is_the_remainder() {
        let stats = FunnelCounts {
            total: 20,
            qualified: 5,
            unqualified: 3,
            lost: 2,
        }
        .into_stats(BTreeMap::new());

        assert_eq!(stats.pending_leads, 10);
        assert_eq!(stats.conversion_rate, 25.0);
    }

    #[test]
    fn empty_window_has_zero_conversion() {
        let stats = FunnelCounts::default().into_stats(BTreeMap::new());
        assert_eq!(stats.total_leads, 0);
        assert_eq!(stats.pending_leads, 0);
        assert_eq!(stats.conversion_rate, 0.0);
    }

    #[test]
    fn conversion_is_a_percentage_of_total() {
        let stats = FunnelCounts {
            total: 3,
            qualified: 1,
            ..FunnelCounts::default()
        }
        .into_stats(BTreeMap::new());
        assert!((stats.conversion_rate - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.pending_leads, 2);
    }

    #[test]
    fn month_window_spans_whole_month() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 14).unwrap();
        let (start, end) = month_window_in(&Utc, today);

        assert_eq!(start.to_rfc3339(), "2024-02-01T00:00:00+00:00");
        assert_eq!(
            end.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            "2024-02-29 23:59:59.999"
        );
    }

    #[test]
    fn december_window_rolls_into_next_year() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let (start, end) = month_window_in(&Utc, today);
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(end.date_naive(), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    /// UTC-3 until 2024-09-01 03:00Z, UTC-2 afterwards: local midnight
    /// of September 1st never happens.
    #[derive(Clone, Copy)]
    struct MidnightGap;

    impl MidnightGap {
        fn transition() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2024, 9, 1)
                .unwrap()
                .and_hms_opt(3, 0, 0)
                .unwrap()
        }

        fn before() -> FixedOffset {
            FixedOffset::west_opt(3 * 3600).unwrap()
        }

        fn after() -> FixedOffset {
            FixedOffset::west_opt(2 * 3600).unwrap()
        }
    }

    impl TimeZone for MidnightGap {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            MidnightGap
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> MappedLocalTime<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(chrono::NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> MappedLocalTime<FixedOffset> {
            let still_before = *local + TimeDelta::hours(3) < Self::transition();
            let already_after = *local + TimeDelta::hours(2) >= Self::transition();
            match (still_before, already_after) {
                (true, true) => MappedLocalTime::Ambiguous(Self::before(), Self::after()),
                (true, false) => MappedLocalTime::Single(Self::before()),
                (false, true) => MappedLocalTime::Single(Self::after()),
                (false, false) => MappedLocalTime::None,
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(chrono::NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::transition() {
                Self::before()
            } else {
                Self::after()
            }
        }
    }

    #[test]
    fn month_starting_in_a_dst_gap_begins_after_the_gap() {
        let september = NaiveDate::from_ymd_opt(2024, 9, 14).unwrap();
        let (start, _) = month_window_in(&MidnightGap, september);
        assert_eq!(start.to_rfc3339(), "2024-09-01T03:00:00+00:00");

        let august = NaiveDate::from_ymd_opt(2024, 8, 20).unwrap();
        let (start, end) = month_window_in(&MidnightGap, august);
        assert_eq!(start.to_rfc3339(), "2024-08-01T03:00:00+00:00");
        assert_eq!(
            end.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            "2024-09-01T02:59:59.999"
        );
    }

    #[test]
    fn stats_serialize_in_camel_case() {
        let json = serde_json::to_value(FunnelCounts::default().into_stats(BTreeMap::new())).unwrap();
        assert!(json.get("conversionRate").is_some());
        assert!(json.get("sourceDistribution").is_some());
    }
}
