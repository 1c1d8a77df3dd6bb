//! Pay-period resolution.
//!
//! Periods are aligned to the configured closing day: each period runs from
//! the day after one closing day through the next closing day, inclusive.
//! Payment lands on the 25th of the pay month, shifted by the configured
//! lag. Both functions are pure date arithmetic and handle year rollover in
//! both directions.

use chrono::{Datelike, Duration, NaiveDate};
use shared::PeriodRange;

/// Nominal day-of-month a period's pay arrives on.
pub const PAYMENT_DAY: u32 = 25;

/// Resolve the pay period containing `reference`.
///
/// Days on or before the closing day belong to the period that ends this
/// month; later days belong to the period ending next month. The start day
/// is `closing_day + 1`, rolled into the following month when that day does
/// not exist (a closing day of 28 puts the start on February 29th, which in
/// a non-leap year rolls to March 1st and keeps periods contiguous).
pub fn period_range(reference: NaiveDate, closing_day: u32) -> PeriodRange {
    let closing_day = clamp_closing_day(closing_day);

    let (end_year, end_month) = if reference.day() <= closing_day {
        (reference.year(), reference.month())
    } else {
        next_month(reference.year(), reference.month())
    };
    let (start_year, start_month) = previous_month(end_year, end_month);

    PeriodRange {
        start: date_with_overflow(start_year, start_month, closing_day + 1),
        end: date_with_overflow(end_year, end_month, closing_day),
    }
}

/// Resolve the nominal payment date for work done on `work_date`.
///
/// Work after the closing day is attributed to the next month; the payment
/// month is that month shifted by `lag_months`, and payment lands on the
/// 25th.
pub fn payment_date(work_date: NaiveDate, closing_day: u32, lag_months: u32) -> NaiveDate {
    let closing_day = clamp_closing_day(closing_day);

    let (mut year, mut month) = (work_date.year(), work_date.month());
    if work_date.day() > closing_day {
        (year, month) = next_month(year, month);
    }

    let total_months = (month - 1) + lag_months;
    year += (total_months / 12) as i32;
    month = total_months % 12 + 1;

    date_with_overflow(year, month, PAYMENT_DAY)
}

/// The period immediately following `range`. Stepping by `end + 1 day`
/// guarantees adjacent, non-overlapping coverage of the calendar regardless
/// of period length.
pub fn next_period(range: &PeriodRange, closing_day: u32) -> PeriodRange {
    period_range(range.end + Duration::days(1), closing_day)
}

/// Closing days outside 1..=28 would make period boundaries fall on days
/// that do not exist in every month.
fn clamp_closing_day(closing_day: u32) -> u32 {
    closing_day.clamp(1, 28)
}

/// Navigate to the previous calendar month.
pub(crate) fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Navigate to the next calendar month.
pub(crate) fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Build a date, rolling a too-large day into the following month the way
/// the period arithmetic expects (day 29 in a 28-day February becomes
/// March 1st).
fn date_with_overflow(year: i32, month: u32, day: u32) -> NaiveDate {
    if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
        return date;
    }
    let last = last_day_of_month(year, month);
    let (next_year, next_month_num) = next_month(year, month);
    // Day numbers here never exceed 29, so the overflow is at most one day.
    NaiveDate::from_ymd_opt(next_year, next_month_num, day - last)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(next_year, next_month_num, 1).unwrap())
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month_num) = next_month(year, month);
    NaiveDate::from_ymd_opt(next_year, next_month_num, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(next_year, 1, 1).unwrap())
        .pred_opt()
        .map(|d| d.day())
        .unwrap_or(28)
}
