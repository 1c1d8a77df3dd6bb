//! Work-entry editing service.
//!
//! Sits between callers and the repositories: applies partial updates to a
//! day, normalizes the result so the stored entry always satisfies the
//! block-set invariants, and prunes days that have become empty.

use anyhow::Result;
use chrono::NaiveDate;
use shared::{WorkBlock, WorkEntry, WorkEntryUpdate};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::storage::{EntryRepository, SettingsRepository};

/// Minutes in a day; the manual administrative figure cannot exceed it.
const MAX_SUPPORT_MINUTES: u32 = 1440;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum EntryValidationError {
    #[error("Support minutes cannot exceed a full day")]
    SupportMinutesTooLarge,
    #[error("Allowance amount cannot be negative")]
    NegativeAllowance,
    #[error("Transport cost cannot be negative")]
    NegativeTransportCost,
}

pub struct EntryService {
    entry_repository: EntryRepository,
    settings_repository: SettingsRepository,
}

impl EntryService {
    pub fn new(
        entry_repository: EntryRepository,
        settings_repository: SettingsRepository,
    ) -> Self {
        Self {
            entry_repository,
            settings_repository,
        }
    }

    /// Apply a partial update to a day's entry, creating the entry if the
    /// day has none yet.
    ///
    /// Returns the stored entry, or `None` when the update left the day
    /// empty and it was pruned instead.
    pub fn upsert_entry(
        &self,
        date: NaiveDate,
        update: WorkEntryUpdate,
    ) -> Result<Option<WorkEntry>> {
        validate_update(&update)?;

        let mut entry = match self.entry_repository.get(date)? {
            Some(existing) => existing,
            None => {
                let settings = self.settings_repository.load_or_create()?;
                debug!("Creating new entry for {}", date);
                WorkEntry::new(date, settings.default_campus)
            }
        };

        apply_update(&mut entry, update);
        normalize_entry(&mut entry);

        if entry.is_empty() {
            let removed = self.entry_repository.delete(date)?;
            if removed {
                info!("Pruned emptied entry for {}", date);
            }
            return Ok(None);
        }

        self.entry_repository.upsert(&entry)?;
        Ok(Some(entry))
    }

    /// Remove a day's entry outright. Returns whether anything was removed.
    pub fn delete_entry(&self, date: NaiveDate) -> Result<bool> {
        let removed = self.entry_repository.delete(date)?;
        if removed {
            info!("Deleted entry for {}", date);
        }
        Ok(removed)
    }

    pub fn entry(&self, date: NaiveDate) -> Result<Option<WorkEntry>> {
        self.entry_repository.get(date)
    }

    /// The full entry history, ordered by date.
    pub fn snapshot(&self) -> Result<BTreeMap<NaiveDate, WorkEntry>> {
        self.entry_repository.load_all()
    }
}

fn validate_update(update: &WorkEntryUpdate) -> Result<(), EntryValidationError> {
    if matches!(update.support_minutes, Some(m) if m > MAX_SUPPORT_MINUTES) {
        return Err(EntryValidationError::SupportMinutesTooLarge);
    }
    if matches!(update.allowance_amount, Some(a) if a < 0) {
        return Err(EntryValidationError::NegativeAllowance);
    }
    if matches!(update.transport_cost, Some(Some(c)) if c < 0) {
        return Err(EntryValidationError::NegativeTransportCost);
    }
    Ok(())
}

fn apply_update(entry: &mut WorkEntry, update: WorkEntryUpdate) {
    if let Some(blocks) = update.selected_blocks {
        entry.selected_blocks = blocks;
    }
    if let Some(minutes) = update.support_minutes {
        entry.support_minutes = minutes;
    }
    if let Some(amount) = update.allowance_amount {
        entry.allowance_amount = amount;
    }
    if let Some(campus) = update.campus {
        entry.campus = campus;
    }
    if let Some(has_transport) = update.has_transport {
        entry.has_transport = has_transport;
    }
    if let Some(cost) = update.transport_cost {
        entry.transport_cost = cost;
    }
    if let Some(blocks) = update.leader_blocks {
        entry.leader_blocks = blocks;
    }
    if let Some(blocks) = update.sub_leader_blocks {
        entry.sub_leader_blocks = blocks;
    }
}

/// Restore the entry invariants after an arbitrary partial update.
///
/// Role blocks are kept as subsets of the selected set: selecting a role
/// for an untaught slot also selects the slot, and deselecting a slot drops
/// its roles. Leader takes precedence when a slot carries both roles.
fn normalize_entry(entry: &mut WorkEntry) {
    // A role assignment implies the slot was taught.
    for block in entry
        .leader_blocks
        .iter()
        .chain(entry.sub_leader_blocks.iter())
        .copied()
        .collect::<Vec<_>>()
    {
        if !entry.selected_blocks.contains(&block) {
            entry.selected_blocks.push(block);
        }
    }

    sort_blocks(&mut entry.selected_blocks);
    sort_blocks(&mut entry.leader_blocks);
    sort_blocks(&mut entry.sub_leader_blocks);

    let selected = entry.selected_blocks.clone();
    entry.leader_blocks.retain(|b| selected.contains(b));
    entry.sub_leader_blocks.retain(|b| selected.contains(b));

    // Leader wins when both roles name the same slot.
    let leaders = entry.leader_blocks.clone();
    entry.sub_leader_blocks.retain(|b| !leaders.contains(b));

    entry.location = entry.campus.location();
}

fn sort_blocks(blocks: &mut Vec<WorkBlock>) {
    blocks.sort();
    blocks.dedup();
}
