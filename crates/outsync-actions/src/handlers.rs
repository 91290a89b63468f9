//! Event actions.
//!
//! Each action turns a parameter bag into a typed payload, sends it
//! to the events endpoint, and on success re-syncs the affected user
//! so the local store reflects the mutation.

use chrono::Utc;

use outsync_graph::{
    AttendeePayload, DateTimeTimeZone, EventPayload, ItemBody, Location, Recurrence, SyncWindow,
};
use outsync_sync::SyncEngine;

use crate::error::ActionError;
use crate::params::{
    AttendeeSlot, OneTimeEventEditParams, OneTimeEventParams, RecurringEventEditParams,
    RecurringEventParams,
};

const TEAMS_PROVIDER: &str = "teamsForBusiness";

/// Create a one-time event, then re-sync its owner.
pub async fn create_onetime_event(
    engine: &SyncEngine,
    params: &OneTimeEventParams,
) -> Result<(), ActionError> {
    tracing::debug!("Creating one-time event for user {}", params.user_id);
    let payload = onetime_payload(params);
    engine.client().create_event(&payload).await?;
    tracing::info!("Created one-time event, re-syncing {}", params.user_id);
    resync(engine, &params.user_id).await
}

/// Create a recurring event, then re-sync its owner.
pub async fn create_recurring_event(
    engine: &SyncEngine,
    params: &RecurringEventParams,
) -> Result<(), ActionError> {
    tracing::debug!("Creating recurring event for user {}", params.user_id);
    let payload = EventPayload {
        subject: Some(params.subject.clone()),
        body: Some(ItemBody::html(&params.content)),
        start: Some(DateTimeTimeZone::compose(
            &params.start_date,
            &params.start_time,
            &params.timezone,
        )),
        end: Some(DateTimeTimeZone::compose(
            &params.end_date,
            &params.end_time,
            &params.timezone,
        )),
        location: None,
        attendees: Vec::new(),
        allow_new_time_proposals: Some(true),
        is_online_meeting: Some(params.is_online_meeting),
        online_meeting_provider: Some(TEAMS_PROVIDER.to_string()),
        recurrence: Some(recurrence_block(
            &params.recurrence_type,
            params.days.as_deref(),
            params.day_of_month.as_deref(),
            &params.start_date,
            &params.recur_end_date,
        )?),
    };
    engine.client().create_event(&payload).await?;
    tracing::info!("Created recurring event, re-syncing {}", params.user_id);
    resync(engine, &params.user_id).await
}

/// Edit a one-time event whose start/end arrive as complete datetime
/// strings in the caller's timezone.
pub async fn edit_onetime_event_current_timezone(
    engine: &SyncEngine,
    event_id: &str,
    params: &OneTimeEventEditParams,
) -> Result<(), ActionError> {
    tracing::debug!("Editing event {} for user {}", event_id, params.user_id);
    let payload = EventPayload {
        subject: Some(params.subject.clone()),
        body: Some(ItemBody::html(&params.content)),
        start: Some(DateTimeTimeZone::new(
            &params.start_date_time,
            &params.timezone,
        )),
        end: Some(DateTimeTimeZone::new(&params.end_date_time, &params.timezone)),
        location: location_payload(params.location.as_deref()),
        attendees: attendee_payloads(&params.attendees),
        allow_new_time_proposals: Some(true),
        is_online_meeting: Some(params.is_online_meeting),
        online_meeting_provider: params.online_meeting_provider.clone(),
        recurrence: None,
    };
    engine.client().update_event(event_id, &payload).await?;
    tracing::info!("Edited event {}, re-syncing {}", event_id, params.user_id);
    resync(engine, &params.user_id).await
}

/// Edit a one-time event whose start/end arrive as separate date and
/// time strings plus an explicit timezone.
pub async fn edit_onetime_event_custom_timezone(
    engine: &SyncEngine,
    event_id: &str,
    params: &OneTimeEventParams,
) -> Result<(), ActionError> {
    tracing::debug!("Editing event {} for user {}", event_id, params.user_id);
    let payload = onetime_payload(params);
    engine.client().update_event(event_id, &payload).await?;
    tracing::info!("Edited event {}, re-syncing {}", event_id, params.user_id);
    resync(engine, &params.user_id).await
}

/// Edit a recurring event: the recurring-create payload plus the six
/// attendee slots.
pub async fn edit_recurring_event(
    engine: &SyncEngine,
    event_id: &str,
    params: &RecurringEventEditParams,
) -> Result<(), ActionError> {
    tracing::debug!(
        "Editing recurring event {} for user {}",
        event_id,
        params.user_id
    );
    let payload = EventPayload {
        subject: Some(params.subject.clone()),
        body: Some(ItemBody::html(&params.content)),
        start: Some(DateTimeTimeZone::compose(
            &params.start_date,
            &params.start_time,
            &params.timezone,
        )),
        end: Some(DateTimeTimeZone::compose(
            &params.end_date,
            &params.end_time,
            &params.timezone,
        )),
        location: None,
        attendees: attendee_payloads(&params.attendees),
        allow_new_time_proposals: Some(true),
        is_online_meeting: Some(params.is_online_meeting),
        online_meeting_provider: Some(TEAMS_PROVIDER.to_string()),
        recurrence: Some(recurrence_block(
            &params.recurrence_type,
            params.days.as_deref(),
            params.day_of_month.as_deref(),
            &params.start_date,
            &params.recur_end_date,
        )?),
    };
    engine.client().update_event(event_id, &payload).await?;
    tracing::info!("Edited recurring event {}, re-syncing {}", event_id, params.user_id);
    resync(engine, &params.user_id).await
}

fn onetime_payload(params: &OneTimeEventParams) -> EventPayload {
    EventPayload {
        subject: Some(params.subject.clone()),
        body: Some(ItemBody::html(&params.content)),
        start: Some(DateTimeTimeZone::compose(
            &params.start_date,
            &params.start_time,
            &params.timezone,
        )),
        end: Some(DateTimeTimeZone::compose(
            &params.end_date,
            &params.end_time,
            &params.timezone,
        )),
        location: location_payload(params.location.as_deref()),
        attendees: attendee_payloads(&params.attendees),
        allow_new_time_proposals: Some(true),
        is_online_meeting: Some(params.is_online_meeting),
        online_meeting_provider: params.online_meeting_provider.clone(),
        recurrence: None,
    }
}

fn location_payload(location: Option<&str>) -> Option<Location> {
    location.filter(|name| !name.is_empty()).map(|name| Location {
        display_name: name.to_string(),
    })
}

/// Slots with no address are dropped; a filled slot without a type
/// defaults to "required".
fn attendee_payloads(slots: &[AttendeeSlot]) -> Vec<AttendeePayload> {
    slots
        .iter()
        .filter_map(|slot| {
            let email = slot.email.as_deref().filter(|email| !email.is_empty())?;
            let attendee_type = slot.attendee_type.as_deref().unwrap_or("required");
            Some(AttendeePayload::new(email, attendee_type))
        })
        .collect()
}

fn recurrence_block(
    recurrence_type: &str,
    days: Option<&str>,
    day_of_month: Option<&str>,
    start_date: &str,
    recur_end_date: &str,
) -> Result<Recurrence, ActionError> {
    let day_of_month = match day_of_month {
        None => None,
        Some(raw) if raw.is_empty() => None,
        Some(raw) => Some(raw.parse::<i64>().map_err(|_| {
            ActionError::InvalidParams(format!("day of month must be a number, got {:?}", raw))
        })?),
    };
    Ok(Recurrence::ending_on(
        recurrence_type,
        days,
        day_of_month,
        start_date,
        recur_end_date,
    ))
}

async fn resync(engine: &SyncEngine, user_id: &str) -> Result<(), ActionError> {
    let window = SyncWindow::after_mutation(Utc::now());
    engine.resync_user(user_id, &window).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_empty_slots_are_skipped() {
        let mut slots: [AttendeeSlot; 6] = Default::default();
        slots[0] = AttendeeSlot::new("a@example.com", "required");
        slots[3] = AttendeeSlot::new("b@example.com", "optional");

        let payloads = attendee_payloads(&slots);
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].email_address.address, "a@example.com");
        assert_eq!(payloads[1].attendee_type, "optional");
    }

    #[test]
    fn test_slot_without_type_defaults_to_required() {
        let mut slots: [AttendeeSlot; 6] = Default::default();
        slots[0].email = Some("solo@example.com".to_string());

        let payloads = attendee_payloads(&slots);
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].attendee_type, "required");
    }

    #[test]
    fn test_blank_email_counts_as_empty_slot() {
        let mut slots: [AttendeeSlot; 6] = Default::default();
        slots[0].email = Some(String::new());

        assert!(attendee_payloads(&slots).is_empty());
    }

    #[test]
    fn test_day_of_month_must_be_numeric() {
        let err =
            recurrence_block("absoluteMonthly", None, Some("first"), "2024-02-01", "2024-06-01")
                .unwrap_err();
        match err {
            ActionError::InvalidParams(msg) => assert!(msg.contains("first")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_day_of_month_is_dropped() {
        let rec = recurrence_block("weekly", Some("Friday"), Some(""), "2024-02-01", "2024-06-01")
            .unwrap();
        assert!(rec.pattern.day_of_month.is_none());
        assert_eq!(rec.pattern.days_of_week, ["Friday"]);
    }

    #[test]
    fn test_blank_location_is_dropped() {
        assert!(location_payload(Some("")).is_none());
        assert_eq!(
            location_payload(Some("Room 4")).map(|l| l.display_name),
            Some("Room 4".to_string())
        );
    }
}
