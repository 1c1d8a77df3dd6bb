use chrono::{Datelike, Local};
use tracing::{info, Level};

use juku_pay_backend::domain::{badges, entry_service::EntryService, level, summary};
use juku_pay_backend::storage::{EntryRepository, SettingsRepository, StoreConnection};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let connection = StoreConnection::new_default()?;
    info!("Using data directory {}", connection.base_directory().display());

    let settings_repository = SettingsRepository::new(connection.clone());
    let entry_repository = EntryRepository::new(connection);
    let service = EntryService::new(entry_repository, settings_repository.clone());

    let settings = settings_repository.load_or_create()?;
    let entries = service.snapshot()?;
    let today = Local::now().date_naive();

    let period = summary::period_summary(&entries, &settings, today);
    println!("{}", period.range.label());
    println!("  period        {} .. {}", period.range.start, period.range.end);
    println!("  total pay     {} yen", period.total_pay);
    println!("  classes       {}", period.class_count);
    println!("  work days     {}", period.work_day_count);
    println!("  admin minutes {}", period.support_minutes);
    println!("  payment date  {}", period.payment_date);

    let report = summary::annual_income_report(&entries, &settings, today.year());
    println!();
    println!("Income for {}", report.year);
    println!(
        "  {} of {} yen ({}%), {} remaining",
        report.total_income, report.limit, report.progress_percent, report.remaining
    );

    let level_data = level::calculate_level_data(&entries, &settings);
    println!();
    println!(
        "Level {} ({} XP, {}% toward level {})",
        level_data.level,
        level_data.xp,
        level_data.progress,
        level_data.level + 1
    );
    if let Some(title) = level::title_for_level(level_data.level) {
        println!("  current title {}", title);
    }

    let period_badges = badges::streak_badges(&entries, &period.range);
    let earned = badges::earnings_badge(period.total_pay);
    let events = badges::event_badges(&entries);
    println!();
    println!("Badges this period");
    for badge in period_badges.iter().chain(earned.iter()).chain(events.iter()) {
        println!("  {} [{}]", badge.id, badge.tier.as_str());
    }

    let totals = badges::lifetime_badge_totals(&entries, &settings);
    println!(
        "Lifetime badges: {} streak, {} earnings, {} event",
        totals.streak, totals.earnings, totals.events
    );

    Ok(())
}
