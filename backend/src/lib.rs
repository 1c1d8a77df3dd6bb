//! Payroll estimation engine for part-time tutoring work.
//!
//! The domain layer is a set of pure functions over the shared DTO types:
//! daily wage calculation, pay-period resolution, badge derivation and the
//! level/XP curve. The storage layer owns the on-disk entry and settings
//! files and hands the domain a complete snapshot on every read.

pub mod domain;
pub mod storage;
