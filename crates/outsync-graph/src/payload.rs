//! Typed request bodies for event mutations.

use serde::Serialize;

/// Body for creating or editing an event.
///
/// `None` fields are left out of the JSON entirely, so a PATCH only
/// touches what the caller filled in.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<ItemBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTimeTimeZone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTimeTimeZone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<AttendeePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_new_time_proposals: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_online_meeting: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub online_meeting_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    pub content_type: String,
    pub content: String,
}

impl ItemBody {
    /// HTML body, the only content type the mutation builders produce.
    pub fn html(content: impl Into<String>) -> Self {
        Self {
            content_type: "HTML".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeTimeZone {
    pub date_time: String,
    pub time_zone: String,
}

impl DateTimeTimeZone {
    pub fn new(date_time: impl Into<String>, time_zone: impl Into<String>) -> Self {
        Self {
            date_time: date_time.into(),
            time_zone: time_zone.into(),
        }
    }

    /// Compose from separate date and time fields as `{date}T{time}`.
    pub fn compose(date: &str, time: &str, time_zone: impl Into<String>) -> Self {
        Self {
            date_time: format!("{}T{}", date, time),
            time_zone: time_zone.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeePayload {
    pub email_address: EmailAddressPayload,
    #[serde(rename = "type")]
    pub attendee_type: String,
}

impl AttendeePayload {
    pub fn new(address: impl Into<String>, attendee_type: impl Into<String>) -> Self {
        Self {
            email_address: EmailAddressPayload {
                address: address.into(),
            },
            attendee_type: attendee_type.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailAddressPayload {
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recurrence {
    pub pattern: RecurrencePattern,
    pub range: RecurrenceRange,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrencePattern {
    #[serde(rename = "type")]
    pub pattern_type: String,
    pub interval: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub days_of_week: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRange {
    #[serde(rename = "type")]
    pub range_type: String,
    pub start_date: String,
    pub end_date: String,
}

impl Recurrence {
    /// Recurrence as the mutation builders emit it: interval 1, range
    /// bounded by an end date. A single `days` name is forwarded as a
    /// one-element `daysOfWeek` list.
    pub fn ending_on(
        pattern_type: &str,
        days: Option<&str>,
        day_of_month: Option<i64>,
        start_date: &str,
        end_date: &str,
    ) -> Self {
        Self {
            pattern: RecurrencePattern {
                pattern_type: pattern_type.to_string(),
                interval: 1,
                days_of_week: days.map(|d| vec![d.to_string()]).unwrap_or_default(),
                day_of_month,
            },
            range: RecurrenceRange {
                range_type: "endDate".to_string(),
                start_date: start_date.to_string(),
                end_date: end_date.to_string(),
            },
        }
    }
}
