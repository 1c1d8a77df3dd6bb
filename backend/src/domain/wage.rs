//! Daily wage calculation.
//!
//! Turns one day's raw entry into a yen amount under the layered wage
//! policy, in strict additive order:
//!
//! 1. teaching-block pay (site differential, role overrides, 90-minute slot
//!    factor)
//! 2. administrative pay (manual minutes plus imputed break minutes)
//! 3. flat location allowance
//! 4. manual allowance
//! 5. transport reimbursement
//!
//! All arithmetic is integer-only. Block pay is accumulated in half-yen so
//! the 1.5x slot factor never needs floating point; administrative pay
//! floors the minutes-to-hours conversion.

use shared::{Campus, Location, UserSettings, WorkBlock, WorkEntry};

/// Fixed hourly base for a block taught in the leader role.
const LEADER_HOURLY_RATE: i64 = 2000;
/// Fixed hourly base for a block taught in the sub-leader role.
const SUB_LEADER_HOURLY_RATE: i64 = 1500;
/// Yen added or removed when home and work sites straddle the primary site.
const SITE_DIFFERENTIAL: i64 = 100;
/// Paid break inside every taught block.
const INTRA_BLOCK_BREAK_MINUTES: u32 = 5;
/// Paid break between two chronologically adjacent blocks.
const INTER_BLOCK_BREAK_MINUTES: u32 = 10;
/// Flat daily allowance at the primary site.
const PRIMARY_SITE_ALLOWANCE: i64 = 800;
/// Flat daily allowance at any other site.
const OTHER_SITE_ALLOWANCE: i64 = 400;

/// Compute the total expected pay for one day's entry, in yen.
pub fn compute_daily_total(entry: &WorkEntry, settings: &UserSettings) -> i64 {
    let mut total = block_pay(entry, settings);
    total += administrative_pay(entry, settings);

    // The location allowance requires actual recorded activity; a day with
    // only a manual allowance or transport flag earns none.
    if !entry.selected_blocks.is_empty() || entry.support_minutes > 0 {
        total += match entry.location {
            Location::Hiraoka => PRIMARY_SITE_ALLOWANCE,
            Location::Other => OTHER_SITE_ALLOWANCE,
        };
    }

    total += entry.allowance_amount;

    if entry.has_transport {
        total += transport_cost(entry, settings);
    }

    total
}

/// Teaching rate after the site-differential adjustment: -100 when a
/// primary-site tutor works away, +100 when an away tutor works at the
/// primary site, unchanged otherwise.
pub fn standard_rate(entry: &WorkEntry, settings: &UserSettings) -> i64 {
    let home = settings.default_campus;
    let work = entry.campus;
    let mut rate = settings.teaching_hourly_rate;
    if home == Campus::Hiraoka && work != Campus::Hiraoka {
        rate -= SITE_DIFFERENTIAL;
    } else if home != Campus::Hiraoka && work == Campus::Hiraoka {
        rate += SITE_DIFFERENTIAL;
    }
    rate
}

/// Pay for the taught blocks. Each block bills 1.5x its hourly figure
/// (a slot is 90 minutes); the sum is kept in half-yen and floored once.
fn block_pay(entry: &WorkEntry, settings: &UserSettings) -> i64 {
    let rate = standard_rate(entry, settings);
    let mut half_yen = 0i64;
    for block in &entry.selected_blocks {
        let hourly = if entry.leader_blocks.contains(block) {
            LEADER_HOURLY_RATE
        } else if entry.sub_leader_blocks.contains(block) {
            SUB_LEADER_HOURLY_RATE
        } else {
            rate
        };
        half_yen += hourly * 3;
    }
    half_yen / 2
}

/// Administrative minutes for the day: manual minutes, a 5-minute break per
/// block, and a 10-minute break between chronologically adjacent blocks.
/// The B-to-C boundary is the unpaid lunch break and contributes nothing.
pub fn administrative_minutes(entry: &WorkEntry) -> u32 {
    let mut minutes = entry.support_minutes;
    minutes += entry.class_count() * INTRA_BLOCK_BREAK_MINUTES;

    let mut sorted = entry.selected_blocks.clone();
    sorted.sort();
    sorted.dedup();

    for pair in sorted.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        if next.index() == current.index() + 1 {
            if current == WorkBlock::B && next == WorkBlock::C {
                continue;
            }
            minutes += INTER_BLOCK_BREAK_MINUTES;
        }
    }

    minutes
}

fn administrative_pay(entry: &WorkEntry, settings: &UserSettings) -> i64 {
    let minutes = administrative_minutes(entry) as i64;
    minutes * settings.hourly_rate / 60
}

/// Transport reimbursement for the day: per-entry override, then the
/// per-campus rate, then the global default.
pub fn transport_cost(entry: &WorkEntry, settings: &UserSettings) -> i64 {
    match entry.transport_cost {
        Some(cost) => cost,
        None => settings.transport_rate_for(entry.campus),
    }
}
