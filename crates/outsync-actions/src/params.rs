//! Flat parameter bags for the event actions.
//!
//! Every field is a plain string or boolean so callers can map form
//! input straight onto a bag. Validation beyond "does it parse"
//! belongs to the caller.

/// One attendee slot out of the six an event form offers.
///
/// A slot with no address is skipped when the payload is built; a
/// filled slot without a type is treated as "required".
#[derive(Debug, Clone, Default)]
pub struct AttendeeSlot {
    pub email: Option<String>,
    pub attendee_type: Option<String>,
}

impl AttendeeSlot {
    pub fn new(email: impl Into<String>, attendee_type: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            attendee_type: Some(attendee_type.into()),
        }
    }
}

/// Fields for a one-time event whose start and end arrive as separate
/// date and time strings plus an explicit timezone.
///
/// Shared by the create action and the custom-timezone edit; the
/// datetime sent to the server is composed as `{date}T{time}`.
#[derive(Debug, Clone, Default)]
pub struct OneTimeEventParams {
    pub user_id: String,
    pub subject: String,
    pub content: String,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    pub timezone: String,
    pub location: Option<String>,
    pub attendees: [AttendeeSlot; 6],
    pub is_online_meeting: bool,
    pub online_meeting_provider: Option<String>,
}

/// Fields for the current-timezone edit: start and end are complete
/// datetime strings passed through verbatim.
#[derive(Debug, Clone, Default)]
pub struct OneTimeEventEditParams {
    pub user_id: String,
    pub subject: String,
    pub content: String,
    pub start_date_time: String,
    pub end_date_time: String,
    pub timezone: String,
    pub location: Option<String>,
    pub attendees: [AttendeeSlot; 6],
    pub is_online_meeting: bool,
    pub online_meeting_provider: Option<String>,
}

/// Fields for creating a recurring event.
///
/// `days` is a single day name and becomes a one-element `daysOfWeek`
/// list. `day_of_month` arrives as a string and must parse as a
/// number when present. The meeting provider is always Teams and the
/// created series carries no attendees.
#[derive(Debug, Clone, Default)]
pub struct RecurringEventParams {
    pub user_id: String,
    pub subject: String,
    pub content: String,
    pub timezone: String,
    pub recurrence_type: String,
    pub days: Option<String>,
    pub day_of_month: Option<String>,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    pub recur_end_date: String,
    pub is_online_meeting: bool,
}

/// Fields for editing a recurring event: the create fields plus the
/// six attendee slots.
#[derive(Debug, Clone, Default)]
pub struct RecurringEventEditParams {
    pub user_id: String,
    pub subject: String,
    pub content: String,
    pub timezone: String,
    pub recurrence_type: String,
    pub days: Option<String>,
    pub day_of_month: Option<String>,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    pub recur_end_date: String,
    pub attendees: [AttendeeSlot; 6],
    pub is_online_meeting: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bag_has_empty_slots() {
        let params = OneTimeEventParams::default();
        assert_eq!(params.attendees.len(), 6);
        assert!(params.attendees.iter().all(|slot| slot.email.is_none()));
    }

    #[test]
    fn test_slot_constructor_fills_both_fields() {
        let slot = AttendeeSlot::new("kim@example.com", "optional");
        assert_eq!(slot.email.as_deref(), Some("kim@example.com"));
        assert_eq!(slot.attendee_type.as_deref(), Some("optional"));
    }
}
