//! Graph API surface for outsync.
//!
//! Client with paged listing, event mutations, and the flattened row
//! types the store persists.

pub mod client;
pub mod error;
pub mod payload;
pub mod types;
pub mod window;

pub use client::GraphClient;
pub use error::GraphError;
pub use payload::{AttendeePayload, DateTimeTimeZone, EventPayload, ItemBody, Location, Recurrence};
pub use types::{ApiEvent, ApiUser, Attendee, CalendarEntry, ListPage, PersonalEvent, User};
pub use window::SyncWindow;
