//! Local persistence for outsync.
//!
//! Upsert-only SQLite storage of directory users, calendar-view entries
//! with attendees, and personal-event recurrence rows.

pub mod store;

pub use store::{StoreCounts, SyncStore};
