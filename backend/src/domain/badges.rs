//! Badge derivation.
//!
//! Badges are pure views over the entry snapshot: streak badges for runs of
//! consecutive work days within a period, a single earnings-tier badge per
//! period, and date-triggered event badges. Lifetime totals replay every
//! pay period from the first recorded entry forward, stepping period by
//! period so no date window is ever visited twice.

use chrono::{Local, Months, NaiveDate};
use shared::{Badge, BadgeKind, BadgeTier, BadgeTotals, PeriodRange, UserSettings, WorkEntry};
use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::period;
use crate::domain::wage;

/// The new-year training event: working either day unlocks the event badge.
pub const NEW_YEAR_TRAINING_DATES: [(i32, u32, u32); 2] = [(2026, 1, 2), (2026, 1, 3)];

/// Fixed identity of the new-year training badge.
pub const NEW_YEAR_TRAINING_BADGE_ID: &str = "event-newyear-2026";

const EARNINGS_TIERS: [(i64, BadgeTier); 4] = [
    (160_000, BadgeTier::Platinum),
    (130_000, BadgeTier::Gold),
    (100_000, BadgeTier::Silver),
    (70_000, BadgeTier::Bronze),
];

/// Streak badges for one pay period: one badge per maximal run of
/// consecutive work days, sized by the run's length. A period with several
/// disjoint qualifying runs yields several badges.
pub fn streak_badges(
    entries: &BTreeMap<NaiveDate, WorkEntry>,
    range: &PeriodRange,
) -> Vec<Badge> {
    let mut badges = Vec::new();
    let mut run_length: u32 = 0;
    let mut previous: Option<NaiveDate> = None;

    for date in entries.range(range.start..=range.end).map(|(d, _)| *d) {
        match previous {
            Some(prev) if (date - prev).num_days() == 1 => run_length += 1,
            _ => {
                close_run(run_length, &mut badges);
                run_length = 1;
            }
        }
        previous = Some(date);
    }
    close_run(run_length, &mut badges);

    badges
}

fn close_run(run_length: u32, badges: &mut Vec<Badge>) {
    let tier = match run_length {
        0..=2 => return,
        3 => BadgeTier::Bronze,
        4 => BadgeTier::Silver,
        _ => BadgeTier::Gold,
    };
    let label_key = match tier {
        BadgeTier::Bronze => "badges.streakBronze",
        BadgeTier::Silver => "badges.streakSilver",
        _ => "badges.streakGold",
    };
    badges.push(Badge {
        id: format!("streak-{}-{}", tier.as_str(), badges.len()),
        kind: BadgeKind::Streak,
        tier,
        label_key: label_key.to_string(),
        description_key: "badges.streakDesc".to_string(),
        icon: "flame".to_string(),
    });
}

/// The single highest earnings-tier badge a period total qualifies for.
pub fn earnings_badge(period_total: i64) -> Option<Badge> {
    let (_, tier) = EARNINGS_TIERS
        .iter()
        .find(|(threshold, _)| period_total >= *threshold)?;
    let (label_key, description_key) = match tier {
        BadgeTier::Platinum => ("badges.earnPlatinum", "badges.earnPlatinumDesc"),
        BadgeTier::Gold => ("badges.earnGold", "badges.earnGoldDesc"),
        BadgeTier::Silver => ("badges.earnSilver", "badges.earnSilverDesc"),
        BadgeTier::Bronze => ("badges.earnBronze", "badges.earnBronzeDesc"),
    };
    Some(Badge {
        id: format!("earnings-{}-0", tier.as_str()),
        kind: BadgeKind::Earnings,
        tier: *tier,
        label_key: label_key.to_string(),
        description_key: description_key.to_string(),
        icon: "trophy".to_string(),
    })
}

/// Event badges earned anywhere in the entry history. Not period-scoped.
pub fn event_badges(entries: &BTreeMap<NaiveDate, WorkEntry>) -> Vec<Badge> {
    let attended = NEW_YEAR_TRAINING_DATES.iter().any(|&(y, m, d)| {
        NaiveDate::from_ymd_opt(y, m, d)
            .map(|date| entries.contains_key(&date))
            .unwrap_or(false)
    });

    if attended {
        vec![Badge {
            id: NEW_YEAR_TRAINING_BADGE_ID.to_string(),
            kind: BadgeKind::Event,
            tier: BadgeTier::Gold,
            label_key: "badges.eventNewYear".to_string(),
            description_key: "badges.eventNewYearDesc".to_string(),
            icon: "sunrise".to_string(),
        }]
    } else {
        Vec::new()
    }
}

/// Total pay for the entries falling inside a period.
pub fn period_total(
    entries: &BTreeMap<NaiveDate, WorkEntry>,
    range: &PeriodRange,
    settings: &UserSettings,
) -> i64 {
    entries
        .range(range.start..=range.end)
        .map(|(_, entry)| wage::compute_daily_total(entry, settings))
        .sum()
}

/// Lifetime badge counts, replaying every pay period from the first entry
/// through one calendar month past today.
pub fn lifetime_badge_totals(
    entries: &BTreeMap<NaiveDate, WorkEntry>,
    settings: &UserSettings,
) -> BadgeTotals {
    lifetime_badge_totals_as_of(entries, settings, Local::now().date_naive())
}

/// Replay core with an injectable "today" so the walk is testable.
///
/// Periods are visited in strictly increasing order by stepping from one
/// period's end to the day after; a streak badge counts once per emitted
/// instance, an earnings badge at most once per period.
pub fn lifetime_badge_totals_as_of(
    entries: &BTreeMap<NaiveDate, WorkEntry>,
    settings: &UserSettings,
    today: NaiveDate,
) -> BadgeTotals {
    let mut totals = BadgeTotals {
        events: event_badges(entries).len() as u32,
        ..BadgeTotals::default()
    };

    let Some(first_date) = entries.keys().next().copied() else {
        return totals;
    };

    let horizon = today
        .checked_add_months(Months::new(1))
        .unwrap_or(today);
    let final_period = period_range(horizon, settings);

    let mut current = period_range(first_date, settings);
    while current.start <= final_period.start {
        let streaks = streak_badges(entries, &current);
        totals.streak += streaks.len() as u32;

        let total = period_total(entries, &current, settings);
        if earnings_badge(total).is_some() {
            totals.earnings += 1;
        }

        debug!(
            period_start = %current.start,
            period_end = %current.end,
            streak_badges = streaks.len(),
            period_total = total,
            "replayed pay period"
        );

        current = period::next_period(&current, settings.closing_day);
    }

    totals
}

fn period_range(reference: NaiveDate, settings: &UserSettings) -> PeriodRange {
    period::period_range(reference, settings.closing_day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Campus, WorkBlock};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn work_day(entries: &mut BTreeMap<NaiveDate, WorkEntry>, day: NaiveDate) {
        let mut entry = WorkEntry::new(day, Campus::Hiraoka);
        entry.selected_blocks = vec![WorkBlock::A, WorkBlock::B];
        entry.has_transport = false;
        entries.insert(day, entry);
    }

    fn june_period() -> PeriodRange {
        PeriodRange {
            start: date(2026, 5, 16),
            end: date(2026, 6, 15),
        }
    }

    #[test]
    fn test_five_consecutive_days_earn_one_gold_badge() {
        let mut entries = BTreeMap::new();
        for day in 1..=5 {
            work_day(&mut entries, date(2026, 6, day));
        }

        let badges = streak_badges(&entries, &june_period());
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].tier, BadgeTier::Gold);
        assert_eq!(badges[0].kind, BadgeKind::Streak);
    }

    #[test]
    fn test_split_runs_earn_separate_badges() {
        let mut entries = BTreeMap::new();
        // Three days, a gap, then three more days in the same period.
        for day in [1, 2, 3, 5, 6, 7] {
            work_day(&mut entries, date(2026, 6, day));
        }

        let badges = streak_badges(&entries, &june_period());
        assert_eq!(badges.len(), 2);
        assert!(badges.iter().all(|b| b.tier == BadgeTier::Bronze));
        // Deterministic identities distinguish the two runs.
        assert_eq!(badges[0].id, "streak-bronze-0");
        assert_eq!(badges[1].id, "streak-bronze-1");
    }

    #[test]
    fn test_short_runs_earn_nothing() {
        let mut entries = BTreeMap::new();
        for day in [1, 2, 4, 5, 8] {
            work_day(&mut entries, date(2026, 6, day));
        }
        assert!(streak_badges(&entries, &june_period()).is_empty());
    }

    #[test]
    fn test_four_day_run_is_silver() {
        let mut entries = BTreeMap::new();
        for day in 10..=13 {
            work_day(&mut entries, date(2026, 6, day));
        }
        let badges = streak_badges(&entries, &june_period());
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].tier, BadgeTier::Silver);
    }

    #[test]
    fn test_run_spanning_period_boundary_is_cut_by_the_window() {
        let mut entries = BTreeMap::new();
        // June 13-18 is six consecutive days, but only 13-15 fall inside
        // the period ending June 15.
        for day in 13..=18 {
            work_day(&mut entries, date(2026, 6, day));
        }
        let badges = streak_badges(&entries, &june_period());
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].tier, BadgeTier::Bronze);
    }

    #[test]
    fn test_earnings_badge_tiers_are_exclusive() {
        assert!(earnings_badge(69_999).is_none());
        assert_eq!(earnings_badge(70_000).unwrap().tier, BadgeTier::Bronze);
        assert_eq!(earnings_badge(100_000).unwrap().tier, BadgeTier::Silver);
        // 135,000 qualifies for gold and only gold.
        let badge = earnings_badge(135_000).unwrap();
        assert_eq!(badge.tier, BadgeTier::Gold);
        assert_eq!(earnings_badge(160_000).unwrap().tier, BadgeTier::Platinum);
    }

    #[test]
    fn test_event_badge_requires_a_training_date() {
        let mut entries = BTreeMap::new();
        work_day(&mut entries, date(2026, 1, 5));
        assert!(event_badges(&entries).is_empty());

        work_day(&mut entries, date(2026, 1, 2));
        let badges = event_badges(&entries);
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].id, NEW_YEAR_TRAINING_BADGE_ID);
        assert_eq!(badges[0].kind, BadgeKind::Event);
    }

    #[test]
    fn test_event_badge_is_not_duplicated_for_both_dates() {
        let mut entries = BTreeMap::new();
        work_day(&mut entries, date(2026, 1, 2));
        work_day(&mut entries, date(2026, 1, 3));
        assert_eq!(event_badges(&entries).len(), 1);
    }

    #[test]
    fn test_lifetime_totals_replay_multiple_periods() {
        let settings = UserSettings::default(); // closing day 15
        let mut entries = BTreeMap::new();

        // Period ending 2026-05-15: a 3-day run.
        for day in 4..=6 {
            work_day(&mut entries, date(2026, 5, day));
        }
        // Period ending 2026-06-15: a 5-day run and a separate 3-day run.
        for day in 1..=5 {
            work_day(&mut entries, date(2026, 6, day));
        }
        for day in 8..=10 {
            work_day(&mut entries, date(2026, 6, day));
        }

        let totals =
            lifetime_badge_totals_as_of(&entries, &settings, date(2026, 6, 20));
        assert_eq!(totals.streak, 3);
        assert_eq!(totals.events, 0);
    }

    #[test]
    fn test_lifetime_totals_count_earnings_periods_once() {
        let mut settings = UserSettings::default();
        settings.teaching_hourly_rate = 1380;
        let mut entries = BTreeMap::new();

        // Two-block days pay roughly 5,300 yen each, so both filled
        // periods clear an earnings threshold.
        for day in 1..=31 {
            work_day(&mut entries, date(2026, 5, day));
        }
        for day in 1..=15 {
            work_day(&mut entries, date(2026, 6, day));
        }

        let totals =
            lifetime_badge_totals_as_of(&entries, &settings, date(2026, 6, 20));
        // Two full periods qualify (each at most one earnings badge);
        // the trailing partly-filled periods do not.
        assert!(totals.earnings >= 2);
        let replayed_again =
            lifetime_badge_totals_as_of(&entries, &settings, date(2026, 6, 20));
        assert_eq!(totals, replayed_again);
    }

    #[test]
    fn test_lifetime_totals_empty_history() {
        let entries = BTreeMap::new();
        let settings = UserSettings::default();
        assert_eq!(
            lifetime_badge_totals_as_of(&entries, &settings, date(2026, 6, 20)),
            BadgeTotals::default()
        );
    }

    #[test]
    fn test_replay_is_stable_across_february_with_closing_day_28() {
        let mut settings = UserSettings::default();
        settings.closing_day = 28;
        let mut entries = BTreeMap::new();
        for day in 10..=12 {
            work_day(&mut entries, date(2026, 1, day));
        }
        for day in 5..=7 {
            work_day(&mut entries, date(2026, 3, day));
        }

        // Period boundaries roll through the short February without
        // revisiting or skipping any window.
        let totals =
            lifetime_badge_totals_as_of(&entries, &settings, date(2026, 3, 20));
        assert_eq!(totals.streak, 2);
    }
}
