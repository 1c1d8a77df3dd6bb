//! CSV-backed work-entry repository.
//!
//! One row per recorded day, keyed by date. Block sets are stored in the
//! compact slot-string form ("ADE"); the location column is not stored at
//! all because it is derived from the campus on load. Rows that fail to
//! parse are skipped with a warning rather than failing the whole load, so
//! a hand-edited file degrades gracefully.

use anyhow::Result;
use chrono::NaiveDate;
use csv::{Reader, Writer};
use shared::{Campus, WorkBlock, WorkEntry};
use std::collections::BTreeMap;
use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use tracing::{debug, warn};

use super::connection::StoreConnection;

const HEADER: [&str; 10] = [
    "id",
    "date",
    "blocks",
    "leader_blocks",
    "sub_leader_blocks",
    "support_minutes",
    "allowance_amount",
    "campus",
    "has_transport",
    "transport_cost",
];

/// CSV-based repository for the work-entry map.
#[derive(Debug, Clone)]
pub struct EntryRepository {
    connection: StoreConnection,
}

impl EntryRepository {
    pub fn new(connection: StoreConnection) -> Self {
        Self { connection }
    }

    /// Load the full entry snapshot. A missing file is an empty store.
    pub fn load_all(&self) -> Result<BTreeMap<NaiveDate, WorkEntry>> {
        let path = self.connection.entries_file_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let file = File::open(&path)?;
        let mut reader = Reader::from_reader(BufReader::new(file));

        let mut entries = BTreeMap::new();
        for result in reader.records() {
            let record = result?;

            let date_field = record.get(1).unwrap_or("");
            let date = match NaiveDate::parse_from_str(date_field, "%Y-%m-%d") {
                Ok(date) => date,
                Err(_) => {
                    warn!("Skipping entry row with unparseable date '{}'", date_field);
                    continue;
                }
            };

            let campus = Campus::from_str_value(record.get(7).unwrap_or(""))
                .unwrap_or_else(|_| {
                    warn!(
                        "Unknown campus '{}' on {}, treating as an away site",
                        record.get(7).unwrap_or(""),
                        date
                    );
                    Campus::Tsukisamu
                });

            let id_field = record.get(0).unwrap_or("");
            let entry = WorkEntry {
                id: if id_field.is_empty() {
                    WorkEntry::generate_id()
                } else {
                    id_field.to_string()
                },
                date,
                selected_blocks: WorkBlock::parse_set(record.get(2).unwrap_or("")),
                leader_blocks: WorkBlock::parse_set(record.get(3).unwrap_or("")),
                sub_leader_blocks: WorkBlock::parse_set(record.get(4).unwrap_or("")),
                support_minutes: record.get(5).unwrap_or("0").parse().unwrap_or(0),
                allowance_amount: record.get(6).unwrap_or("0").parse().unwrap_or(0),
                location: campus.location(),
                campus,
                has_transport: record.get(8).unwrap_or("false") == "true",
                transport_cost: record
                    .get(9)
                    .filter(|v| !v.is_empty())
                    .and_then(|v| v.parse().ok()),
            };

            entries.insert(date, entry);
        }

        debug!("Loaded {} work entries from {}", entries.len(), path.display());
        Ok(entries)
    }

    /// Replace the whole entry file with the given snapshot, atomically.
    pub fn save_all(&self, entries: &BTreeMap<NaiveDate, WorkEntry>) -> Result<()> {
        let path = self.connection.entries_file_path();
        let temp_path = path.with_extension("tmp");

        {
            let file = File::create(&temp_path)?;
            let mut writer = Writer::from_writer(BufWriter::new(file));
            writer.write_record(HEADER)?;
            for entry in entries.values() {
                writer.write_record(&[
                    entry.id.clone(),
                    entry.date.format("%Y-%m-%d").to_string(),
                    WorkBlock::encode_set(&entry.selected_blocks),
                    WorkBlock::encode_set(&entry.leader_blocks),
                    WorkBlock::encode_set(&entry.sub_leader_blocks),
                    entry.support_minutes.to_string(),
                    entry.allowance_amount.to_string(),
                    entry.campus.as_str().to_string(),
                    entry.has_transport.to_string(),
                    entry
                        .transport_cost
                        .map(|c| c.to_string())
                        .unwrap_or_default(),
                ])?;
            }
            writer.flush()?;
        }

        fs::rename(&temp_path, &path)?;
        debug!("Saved {} work entries to {}", entries.len(), path.display());
        Ok(())
    }

    /// Fetch a single day's entry.
    pub fn get(&self, date: NaiveDate) -> Result<Option<WorkEntry>> {
        Ok(self.load_all()?.remove(&date))
    }

    /// Insert or replace the entry for its date.
    pub fn upsert(&self, entry: &WorkEntry) -> Result<()> {
        let mut entries = self.load_all()?;
        entries.insert(entry.date, entry.clone());
        self.save_all(&entries)
    }

    /// Remove the entry for a date. Returns whether anything was removed.
    pub fn delete(&self, date: NaiveDate) -> Result<bool> {
        let mut entries = self.load_all()?;
        let removed = entries.remove(&date).is_some();
        if removed {
            self.save_all(&entries)?;
        }
        Ok(removed)
    }
}
