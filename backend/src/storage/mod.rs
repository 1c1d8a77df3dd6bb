//! # File-based storage
//!
//! The store owns two files in the data directory and hands the domain a
//! complete snapshot on every read:
//!
//! ```text
//! data/
//! ├── work_entries.csv    ← one row per recorded day
//! └── settings.yaml       ← the single settings record
//! ```
//!
//! Writes are atomic (temp file, then rename) so a crash mid-save never
//! leaves a torn file behind.

pub mod connection;
pub mod entry_repository;
pub mod settings_repository;

pub use connection::StoreConnection;
pub use entry_repository::EntryRepository;
pub use settings_repository::SettingsRepository;
