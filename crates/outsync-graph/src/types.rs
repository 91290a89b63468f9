//! Graph API types and the flat rows stored locally.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for deriving attendee row keys.
const ATTENDEE_KEY_NAMESPACE: Uuid = Uuid::from_u128(0x8c7a_e1f4_2f6b_4dd0_9a3e_5b1c_64b8_21d7);

/// Directory user as stored locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub mail: Option<String>,
    pub user_principal_name: Option<String>,
    pub display_name: Option<String>,
}

/// Calendar-view entry flattened for storage, keyed by `iCalUId`.
///
/// Start and end are kept as the verbatim strings the API delivered;
/// absent values anywhere in the source record become `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub i_cal_u_id: String,
    pub event_id: Option<String>,
    pub subject: Option<String>,
    pub body_content: Option<String>,
    pub body_preview: Option<String>,
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
    pub is_cancelled: Option<bool>,
    pub is_online_meeting: Option<bool>,
    pub online_meeting_join_url: Option<String>,
    pub online_meeting_provider: Option<String>,
    pub organizer_email: Option<String>,
    pub organizer_name: Option<String>,
    pub original_start_time_zone: Option<String>,
    pub series_master_id: Option<String>,
    pub location_display_name: Option<String>,
}

/// Attendee of a calendar-view entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendee {
    pub unique_id: String,
    pub parent_i_cal_u_id: String,
    pub root_i_cal_u_id: String,
    pub email_address: Option<String>,
    pub display_name: Option<String>,
    pub attendee_type: Option<String>,
}

/// Recurrence projection of an event on a user's own calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalEvent {
    pub i_cal_u_id: String,
    pub event_id: Option<String>,
    pub recurrence_pattern_type: Option<String>,
    pub recurrence_day_of_month: Option<i64>,
    pub recurrence_range_end_date: Option<String>,
}

// API Response Types

/// One page of a Graph collection.
#[derive(Debug, Deserialize)]
pub struct ListPage<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Graph directory user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUser {
    pub id: String,
    pub mail: Option<String>,
    pub user_principal_name: Option<String>,
    pub display_name: Option<String>,
}

/// Graph calendar event, from both `calendarView` and `calendar/events`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: Option<String>,
    pub i_cal_u_id: Option<String>,
    pub subject: Option<String>,
    pub body: Option<ApiItemBody>,
    pub body_preview: Option<String>,
    pub start: Option<ApiDateTimeZone>,
    pub end: Option<ApiDateTimeZone>,
    pub is_cancelled: Option<bool>,
    pub is_online_meeting: Option<bool>,
    pub online_meeting: Option<ApiOnlineMeeting>,
    pub online_meeting_provider: Option<String>,
    pub organizer: Option<ApiRecipient>,
    pub original_start_time_zone: Option<String>,
    pub series_master_id: Option<String>,
    pub location: Option<ApiLocation>,
    #[serde(default)]
    pub attendees: Vec<ApiAttendee>,
    pub recurrence: Option<ApiRecurrence>,
}

#[derive(Debug, Deserialize)]
pub struct ApiItemBody {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDateTimeZone {
    pub date_time: Option<String>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOnlineMeeting {
    pub join_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecipient {
    pub email_address: Option<ApiEmailAddress>,
}

#[derive(Debug, Deserialize)]
pub struct ApiEmailAddress {
    pub address: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLocation {
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAttendee {
    pub email_address: Option<ApiEmailAddress>,
    #[serde(rename = "type")]
    pub attendee_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiRecurrence {
    pub pattern: Option<ApiRecurrencePattern>,
    pub range: Option<ApiRecurrenceRange>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecurrencePattern {
    #[serde(rename = "type")]
    pub pattern_type: Option<String>,
    pub day_of_month: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecurrenceRange {
    pub end_date: Option<String>,
}

impl From<ApiUser> for User {
    fn from(api: ApiUser) -> Self {
        Self {
            id: api.id,
            mail: api.mail,
            user_principal_name: api.user_principal_name,
            display_name: api.display_name,
        }
    }
}

impl CalendarEntry {
    /// Flatten an API event. Returns `None` when the record carries no
    /// `iCalUId`, since the row would have no key.
    pub fn from_api(api: &ApiEvent) -> Option<Self> {
        let i_cal_u_id = api.i_cal_u_id.clone()?;

        Some(Self {
            i_cal_u_id,
            event_id: api.id.clone(),
            subject: api.subject.clone(),
            body_content: api.body.as_ref().and_then(|b| b.content.clone()),
            body_preview: api.body_preview.clone(),
            start_date_time: api.start.as_ref().and_then(|t| t.date_time.clone()),
            end_date_time: api.end.as_ref().and_then(|t| t.date_time.clone()),
            is_cancelled: api.is_cancelled,
            is_online_meeting: api.is_online_meeting,
            online_meeting_join_url: api.online_meeting.as_ref().and_then(|m| m.join_url.clone()),
            online_meeting_provider: api.online_meeting_provider.clone(),
            organizer_email: api
                .organizer
                .as_ref()
                .and_then(|o| o.email_address.as_ref())
                .and_then(|e| e.address.clone()),
            organizer_name: api
                .organizer
                .as_ref()
                .and_then(|o| o.email_address.as_ref())
                .and_then(|e| e.name.clone()),
            original_start_time_zone: api.original_start_time_zone.clone(),
            series_master_id: api.series_master_id.clone(),
            location_display_name: api.location.as_ref().and_then(|l| l.display_name.clone()),
        })
    }
}

impl Attendee {
    /// Flatten one attendee of the entry keyed by `parent_i_cal_u_id`.
    ///
    /// The row id is derived, not minted: the same attendee of the same
    /// entry maps to the same id on every sync, so re-syncs overwrite
    /// instead of accumulating duplicates.
    pub fn from_api(parent_i_cal_u_id: &str, ordinal: usize, api: &ApiAttendee) -> Self {
        let email_address = api.email_address.as_ref().and_then(|e| e.address.clone());
        let display_name = api.email_address.as_ref().and_then(|e| e.name.clone());
        let unique_id = attendee_key(
            parent_i_cal_u_id,
            email_address.as_deref(),
            api.attendee_type.as_deref(),
            ordinal,
        );

        Self {
            unique_id,
            parent_i_cal_u_id: parent_i_cal_u_id.to_string(),
            root_i_cal_u_id: parent_i_cal_u_id.to_string(),
            email_address,
            display_name,
            attendee_type: api.attendee_type.clone(),
        }
    }
}

fn attendee_key(
    parent: &str,
    email: Option<&str>,
    attendee_type: Option<&str>,
    ordinal: usize,
) -> String {
    // NUL separators keep ("ab", "c") and ("a", "bc") from colliding.
    let mut name = Vec::with_capacity(parent.len() + 24);
    name.extend_from_slice(parent.as_bytes());
    name.push(0);
    name.extend_from_slice(email.unwrap_or("").as_bytes());
    name.push(0);
    name.extend_from_slice(attendee_type.unwrap_or("").as_bytes());
    name.push(0);
    name.extend_from_slice(ordinal.to_string().as_bytes());
    Uuid::new_v5(&ATTENDEE_KEY_NAMESPACE, &name).to_string()
}

impl PersonalEvent {
    /// Project the recurrence metadata of an API event. Returns `None`
    /// when the record carries no `iCalUId`.
    pub fn from_api(api: &ApiEvent) -> Option<Self> {
        let i_cal_u_id = api.i_cal_u_id.clone()?;
        let pattern = api.recurrence.as_ref().and_then(|r| r.pattern.as_ref());

        Some(Self {
            i_cal_u_id,
            event_id: api.id.clone(),
            recurrence_pattern_type: pattern.and_then(|p| p.pattern_type.clone()),
            recurrence_day_of_month: pattern.and_then(|p| p.day_of_month),
            recurrence_range_end_date: api
                .recurrence
                .as_ref()
                .and_then(|r| r.range.as_ref())
                .and_then(|r| r.end_date.clone()),
        })
    }
}
