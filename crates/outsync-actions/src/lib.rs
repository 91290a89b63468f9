//! Event mutation actions: create and edit calendar events, then
//! re-sync the affected user.

pub mod error;
pub mod handlers;
pub mod params;

pub use error::ActionError;
pub use handlers::{
    create_onetime_event, create_recurring_event, edit_onetime_event_current_timezone,
    edit_onetime_event_custom_timezone, edit_recurring_event,
};
pub use params::{
    AttendeeSlot, OneTimeEventEditParams, OneTimeEventParams, RecurringEventEditParams,
    RecurringEventParams,
};
