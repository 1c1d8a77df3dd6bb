//! Domain logic: the payroll calculation and period-accounting engine plus
//! the derived gamification layer.

pub mod badges;
pub mod entry_service;
pub mod level;
pub mod period;
pub mod summary;
pub mod wage;
