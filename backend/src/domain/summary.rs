//! Period summary and annual income monitoring.
//!
//! Aggregates the entry snapshot for presentation: totals for the pay
//! period containing a reference date, and calendar-year income measured by
//! payment date against the annual ceiling.

use chrono::{Datelike, NaiveDate};
use shared::{AnnualIncomeReport, PeriodSummary, UserSettings, WorkEntry};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use crate::domain::{period, wage};

/// Minutes shown per block in the summary card. Only the intra-block break
/// is displayed; inter-block intervals stay a pay-calculation detail.
const DISPLAYED_MINUTES_PER_BLOCK: u32 = 5;

/// Aggregate the pay period containing `reference`.
pub fn period_summary(
    entries: &BTreeMap<NaiveDate, WorkEntry>,
    settings: &UserSettings,
    reference: NaiveDate,
) -> PeriodSummary {
    let range = period::period_range(reference, settings.closing_day);

    let mut total_pay: i64 = 0;
    let mut class_count: u32 = 0;
    let mut support_minutes: u32 = 0;
    let mut work_day_count: u32 = 0;

    for entry in entries.range(range.start..=range.end).map(|(_, e)| e) {
        let daily_pay = wage::compute_daily_total(entry, settings);
        total_pay += daily_pay;
        class_count += entry.class_count();
        support_minutes +=
            entry.support_minutes + entry.class_count() * DISPLAYED_MINUTES_PER_BLOCK;
        if daily_pay > 0 || !entry.selected_blocks.is_empty() {
            work_day_count += 1;
        }
    }

    let payment_date =
        period::payment_date(range.end, settings.closing_day, settings.payment_month_lag);

    info!(
        period = %range.label(),
        total_pay,
        class_count,
        work_day_count,
        "aggregated pay period"
    );

    PeriodSummary {
        range,
        total_pay,
        class_count,
        support_minutes,
        work_day_count,
        payment_date,
    }
}

/// Income attributed to a calendar year by payment date, against the
/// configured annual ceiling.
pub fn annual_income_report(
    entries: &BTreeMap<NaiveDate, WorkEntry>,
    settings: &UserSettings,
    year: i32,
) -> AnnualIncomeReport {
    let mut total_income: i64 = 0;
    for entry in entries.values() {
        let paid_on =
            period::payment_date(entry.date, settings.closing_day, settings.payment_month_lag);
        if paid_on.year() == year {
            total_income += wage::compute_daily_total(entry, settings);
        }
    }

    let limit = settings.annual_limit.max(1);
    let remaining = (limit - total_income).max(0);
    let progress_percent = ((total_income * 100) / limit).clamp(0, 100) as u32;

    AnnualIncomeReport {
        year,
        total_income,
        limit,
        remaining,
        progress_percent,
    }
}

/// Calendar years that have income attributed to them, newest first. The
/// current year is always present so the monitor has something to show.
pub fn years_with_income(
    entries: &BTreeMap<NaiveDate, WorkEntry>,
    settings: &UserSettings,
    current_year: i32,
) -> Vec<i32> {
    let mut years: BTreeSet<i32> = BTreeSet::new();
    years.insert(current_year);
    for entry in entries.values() {
        let paid_on =
            period::payment_date(entry.date, settings.closing_day, settings.payment_month_lag);
        years.insert(paid_on.year());
    }
    years.into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Campus, WorkBlock};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn two_block_day(entries: &mut BTreeMap<NaiveDate, WorkEntry>, day: NaiveDate) {
        let mut entry = WorkEntry::new(day, Campus::Hiraoka);
        entry.selected_blocks = vec![WorkBlock::A, WorkBlock::B];
        entry.has_transport = false;
        entries.insert(day, entry);
    }

    #[test]
    fn test_period_summary_filters_to_the_active_period() {
        let settings = UserSettings::default(); // closing day 15
        let mut entries = BTreeMap::new();
        two_block_day(&mut entries, date(2026, 6, 10)); // in period
        two_block_day(&mut entries, date(2026, 5, 20)); // in period
        two_block_day(&mut entries, date(2026, 5, 10)); // previous period
        two_block_day(&mut entries, date(2026, 6, 16)); // next period

        let summary = period_summary(&entries, &settings, date(2026, 6, 1));
        assert_eq!(summary.range.start, date(2026, 5, 16));
        assert_eq!(summary.range.end, date(2026, 6, 15));
        assert_eq!(summary.class_count, 4);
        assert_eq!(summary.work_day_count, 2);
        // Two days of two blocks each: manual 0 + 2 * 5 minutes per day.
        assert_eq!(summary.support_minutes, 20);
        // Payment for the period ending June 15 with no lag is June 25.
        assert_eq!(summary.payment_date, date(2026, 6, 25));
    }

    #[test]
    fn test_period_summary_empty_period() {
        let settings = UserSettings::default();
        let summary = period_summary(&BTreeMap::new(), &settings, date(2026, 6, 1));
        assert_eq!(summary.total_pay, 0);
        assert_eq!(summary.work_day_count, 0);
        assert_eq!(summary.class_count, 0);
    }

    #[test]
    fn test_period_summary_respects_payment_lag() {
        let mut settings = UserSettings::default();
        settings.payment_month_lag = 1;
        let summary = period_summary(&BTreeMap::new(), &settings, date(2025, 12, 20));
        assert_eq!(summary.range.end, date(2026, 1, 15));
        assert_eq!(summary.payment_date, date(2026, 2, 25));
    }

    #[test]
    fn test_annual_report_attributes_income_by_payment_date() {
        let mut settings = UserSettings::default();
        settings.payment_month_lag = 1;
        let mut entries = BTreeMap::new();
        // Work after the December closing day, with a one-month lag, pays in
        // February of the following year.
        two_block_day(&mut entries, date(2025, 12, 20));

        let this_year = annual_income_report(&entries, &settings, 2025);
        assert_eq!(this_year.total_income, 0);

        let next_year = annual_income_report(&entries, &settings, 2026);
        assert!(next_year.total_income > 0);
        assert_eq!(
            next_year.remaining,
            next_year.limit - next_year.total_income
        );
    }

    #[test]
    fn test_annual_report_progress_is_capped() {
        let mut settings = UserSettings::default();
        settings.annual_limit = 1000;
        let mut entries = BTreeMap::new();
        two_block_day(&mut entries, date(2026, 6, 10));

        let report = annual_income_report(&entries, &settings, 2026);
        assert_eq!(report.progress_percent, 100);
        assert_eq!(report.remaining, 0);
    }

    #[test]
    fn test_years_with_income_includes_current_year() {
        let settings = UserSettings::default();
        let mut entries = BTreeMap::new();
        two_block_day(&mut entries, date(2024, 3, 10));

        let years = years_with_income(&entries, &settings, 2026);
        assert_eq!(years, vec![2026, 2024]);
    }
}
