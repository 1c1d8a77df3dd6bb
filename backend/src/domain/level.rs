//! Level and experience derivation.
//!
//! Lifetime earnings, class count and work-day count fold into a single XP
//! total; the level curve `floor(14 * (level - 1)^2.2)` maps XP to a level.
//! Titles unlock at fixed level thresholds and, once unlocked, are never
//! revoked: the caller merges newly eligible titles into the profile with
//! a set union, never a replacement.

use chrono::NaiveDate;
use shared::{Badge, LevelData, UserProfile, UserSettings, WorkEntry};
use std::collections::BTreeMap;

use crate::domain::badges::NEW_YEAR_TRAINING_BADGE_ID;
use crate::domain::wage;

/// XP granted per 100 yen of lifetime earnings.
const XP_PER_100_YEN: u64 = 1;
/// XP granted per taught block.
const XP_PER_CLASS: u64 = 50;
/// XP granted per work day.
const XP_PER_WORK_DAY: u64 = 50;

const CURVE_COEFFICIENT: f64 = 14.0;
const CURVE_EXPONENT: f64 = 2.2;

/// Level thresholds and the title each one unlocks, ascending.
pub const TITLES: [(u32, &str); 7] = [
    (10, "rookie"),
    (20, "rolePlayer"),
    (30, "starter"),
    (40, "allStar"),
    (50, "franchisePlayer"),
    (60, "superStar"),
    (70, "hallOfFamer"),
];

/// Title unlocked by the new-year training event badge.
pub const NEW_YEAR_TRAINING_TITLE: &str = "gasho2026";

/// Cumulative XP required to reach `level`. `xp_for_level(1) == 0`.
pub fn xp_for_level(level: u32) -> u64 {
    if level <= 1 {
        return 0;
    }
    (CURVE_COEFFICIENT * f64::from(level - 1).powf(CURVE_EXPONENT)).floor() as u64
}

/// Largest level whose cumulative requirement does not exceed `xp`.
///
/// The fractional-power inverse can land one level off exactly at a curve
/// boundary, so the estimate is verified against the forward curve and
/// nudged until it brackets `xp`.
pub fn level_from_xp(xp: u64) -> u32 {
    let estimate = (xp as f64 / CURVE_COEFFICIENT)
        .powf(1.0 / CURVE_EXPONENT)
        .floor() as u32;
    let mut level = estimate.saturating_add(1).max(1);

    while xp_for_level(level + 1) <= xp {
        level += 1;
    }
    while level > 1 && xp_for_level(level) > xp {
        level -= 1;
    }
    level
}

/// Fold the entire entry history into level data.
pub fn calculate_level_data(
    entries: &BTreeMap<NaiveDate, WorkEntry>,
    settings: &UserSettings,
) -> LevelData {
    let mut total_earnings: i64 = 0;
    let mut total_classes: u32 = 0;
    let mut total_work_days: u32 = 0;

    for entry in entries.values() {
        let daily_pay = wage::compute_daily_total(entry, settings);
        total_earnings += daily_pay;
        total_classes += entry.class_count();
        if daily_pay > 0 || !entry.selected_blocks.is_empty() {
            total_work_days += 1;
        }
    }

    let xp = (total_earnings.max(0) as u64 / 100) * XP_PER_100_YEN
        + u64::from(total_classes) * XP_PER_CLASS
        + u64::from(total_work_days) * XP_PER_WORK_DAY;

    let level = level_from_xp(xp);
    let current_base = xp_for_level(level);
    let next_base = xp_for_level(level + 1);

    let span = next_base.saturating_sub(current_base);
    let progress = if span > 0 {
        (((xp - current_base) * 100) / span).min(100) as u32
    } else {
        0
    };

    LevelData {
        level,
        xp,
        next_level_xp: next_base,
        progress,
        total_earnings,
        total_classes,
        total_work_days,
    }
}

/// All titles a level qualifies for, lowest threshold first.
pub fn eligible_titles(level: u32) -> Vec<&'static str> {
    TITLES
        .iter()
        .filter(|(threshold, _)| level >= *threshold)
        .map(|(_, id)| *id)
        .collect()
}

/// The highest-threshold title a level qualifies for, if any.
pub fn title_for_level(level: u32) -> Option<&'static str> {
    TITLES
        .iter()
        .rev()
        .find(|(threshold, _)| level >= *threshold)
        .map(|(_, id)| *id)
}

/// Merge newly eligible titles into the profile's unlocked set. Union only:
/// nothing is ever removed, even when the computed level has dropped since
/// a title was unlocked. Returns true if the set changed.
pub fn unlock_titles(profile: &mut UserProfile, level: u32, event_badges: &[Badge]) -> bool {
    let mut changed = false;

    for title in eligible_titles(level) {
        if !profile.unlocked_titles.iter().any(|t| t == title) {
            profile.unlocked_titles.push(title.to_string());
            changed = true;
        }
    }

    let attended_training = event_badges
        .iter()
        .any(|badge| badge.id == NEW_YEAR_TRAINING_BADGE_ID);
    if attended_training
        && !profile
            .unlocked_titles
            .iter()
            .any(|t| t == NEW_YEAR_TRAINING_TITLE)
    {
        profile
            .unlocked_titles
            .push(NEW_YEAR_TRAINING_TITLE.to_string());
        changed = true;
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::badges;
    use shared::{Campus, WorkBlock};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_curve_starts_at_zero() {
        assert_eq!(xp_for_level(0), 0);
        assert_eq!(xp_for_level(1), 0);
        assert!(xp_for_level(2) > 0);
    }

    #[test]
    fn test_curve_is_strictly_increasing() {
        for level in 1..100 {
            assert!(
                xp_for_level(level + 1) > xp_for_level(level),
                "curve must grow at level {}",
                level
            );
        }
    }

    #[test]
    fn test_level_inversion_is_exact_at_boundaries() {
        // XP exactly at a level's requirement must land on that level, and
        // one point below must land on the level before it.
        for level in 2..80 {
            let base = xp_for_level(level);
            assert_eq!(level_from_xp(base), level, "at boundary of level {}", level);
            assert_eq!(
                level_from_xp(base - 1),
                level - 1,
                "just below boundary of level {}",
                level
            );
        }
    }

    #[test]
    fn test_level_is_monotonic_in_xp() {
        let mut previous = level_from_xp(0);
        for xp in (0..200_000).step_by(137) {
            let level = level_from_xp(xp);
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn test_level_from_zero_xp() {
        assert_eq!(level_from_xp(0), 1);
    }

    #[test]
    fn test_level_data_accumulates_lifetime_totals() {
        let settings = UserSettings::default();
        let mut entries = BTreeMap::new();

        let mut teaching_day = WorkEntry::new(date(2026, 4, 6), Campus::Hiraoka);
        teaching_day.selected_blocks = vec![WorkBlock::A, WorkBlock::B];
        teaching_day.has_transport = false;
        entries.insert(teaching_day.date, teaching_day);

        let mut support_day = WorkEntry::new(date(2026, 4, 7), Campus::Tsukisamu);
        support_day.support_minutes = 90;
        support_day.location = support_day.campus.location();
        support_day.has_transport = false;
        entries.insert(support_day.date, support_day);

        let data = calculate_level_data(&entries, &settings);
        assert_eq!(data.total_classes, 2);
        assert_eq!(data.total_work_days, 2);
        assert!(data.total_earnings > 0);
        assert_eq!(
            data.xp,
            data.total_earnings as u64 / 100 + 2 * 50 + 2 * 50
        );
        assert!(data.progress <= 100);
        assert!(data.next_level_xp > data.xp || data.level == level_from_xp(data.xp));
    }

    #[test]
    fn test_transport_only_day_counts_as_work_day() {
        // A day with transport reimbursement but no blocks still has
        // positive pay, so it counts toward the work-day total.
        let settings = UserSettings::default();
        let mut entries = BTreeMap::new();
        let entry = WorkEntry::new(date(2026, 4, 8), Campus::Hiraoka);
        entries.insert(entry.date, entry);

        let data = calculate_level_data(&entries, &settings);
        assert_eq!(data.total_classes, 0);
        assert_eq!(data.total_work_days, 1);
    }

    #[test]
    fn test_empty_history_is_level_one() {
        let data = calculate_level_data(&BTreeMap::new(), &UserSettings::default());
        assert_eq!(data.level, 1);
        assert_eq!(data.xp, 0);
        assert_eq!(data.progress, 0);
    }

    #[test]
    fn test_eligible_titles_follow_thresholds() {
        assert!(eligible_titles(9).is_empty());
        assert_eq!(eligible_titles(10), vec!["rookie"]);
        assert_eq!(
            eligible_titles(35),
            vec!["rookie", "rolePlayer", "starter"]
        );
        assert_eq!(title_for_level(35), Some("starter"));
        assert_eq!(title_for_level(70), Some("hallOfFamer"));
        assert_eq!(title_for_level(5), None);
    }

    #[test]
    fn test_unlock_titles_is_a_one_way_ratchet() {
        let mut profile = UserProfile::default();
        assert!(unlock_titles(&mut profile, 25, &[]));
        assert!(profile.unlocked_titles.iter().any(|t| t == "rookie"));
        assert!(profile.unlocked_titles.iter().any(|t| t == "rolePlayer"));

        // A later, lower level must not remove anything.
        let before = profile.unlocked_titles.clone();
        assert!(!unlock_titles(&mut profile, 3, &[]));
        assert_eq!(profile.unlocked_titles, before);
    }

    #[test]
    fn test_unlock_titles_event_title() {
        let mut entries = BTreeMap::new();
        let mut entry = WorkEntry::new(date(2026, 1, 2), Campus::Hiraoka);
        entry.selected_blocks = vec![WorkBlock::A];
        entries.insert(entry.date, entry);
        let event = badges::event_badges(&entries);

        let mut profile = UserProfile::default();
        assert!(unlock_titles(&mut profile, 1, &event));
        assert!(profile
            .unlocked_titles
            .iter()
            .any(|t| t == NEW_YEAR_TRAINING_TITLE));

        // Idempotent on a second pass.
        assert!(!unlock_titles(&mut profile, 1, &event));
    }
}
