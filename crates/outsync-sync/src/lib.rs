//! Sync engine for outsync.
//!
//! Orchestrates directory sync, then windowed calendar-view and
//! personal-event ingestion into the local store.

pub mod engine;
pub mod error;

pub use engine::{SyncEngine, SyncReport};
pub use error::SyncError;
