//! SQLite sink for synced calendar data.
//!
//! Every write is an upsert keyed by the table's primary key; rows are
//! never deleted by the sync itself.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

use outsync_graph::{Attendee, CalendarEntry, PersonalEvent, User};

/// Row counts per table, for summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub users: u32,
    pub calendar_entries: u32,
    pub attendees: u32,
    pub personal_events: u32,
}

/// SQLite store for synced directory and calendar rows.
pub struct SyncStore {
    conn: Connection,
}

impl SyncStore {
    /// Open (or create) the store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create store directory")?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                mail TEXT,
                user_principal_name TEXT,
                display_name TEXT,
                synced_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS calendar_view (
                i_cal_u_id TEXT PRIMARY KEY,
                event_id TEXT,
                subject TEXT,
                body_content TEXT,
                body_preview TEXT,
                start_date_time TEXT,
                end_date_time TEXT,
                is_cancelled INTEGER,
                is_online_meeting INTEGER,
                online_meeting_join_url TEXT,
                online_meeting_provider TEXT,
                organizer_email TEXT,
                organizer_name TEXT,
                original_start_time_zone TEXT,
                series_master_id TEXT,
                location_display_name TEXT,
                synced_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS calendar_view_attendees (
                unique_id TEXT PRIMARY KEY,
                parent_i_cal_u_id TEXT NOT NULL,
                root_i_cal_u_id TEXT NOT NULL,
                email_address TEXT,
                display_name TEXT,
                attendee_type TEXT,
                synced_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS my_events (
                i_cal_u_id TEXT PRIMARY KEY,
                event_id TEXT,
                recurrence_pattern_type TEXT,
                recurrence_day_of_month INTEGER,
                recurrence_range_end_date TEXT,
                synced_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_attendees_parent
                ON calendar_view_attendees(parent_i_cal_u_id);
            CREATE INDEX IF NOT EXISTS idx_calendar_view_start
                ON calendar_view(start_date_time);
            "#,
        )?;
        Ok(())
    }

    /// Upsert a directory user.
    pub fn save_user(&self, user: &User) -> Result<()> {
        let now = Utc::now().timestamp_millis();

        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO users
            (id, mail, user_principal_name, display_name, synced_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                user.id,
                user.mail,
                user.user_principal_name,
                user.display_name,
                now,
            ],
        )?;
        Ok(())
    }

    /// Upsert a calendar-view entry.
    pub fn save_calendar_entry(&self, entry: &CalendarEntry) -> Result<()> {
        let now = Utc::now().timestamp_millis();

        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO calendar_view
            (i_cal_u_id, event_id, subject, body_content, body_preview,
             start_date_time, end_date_time, is_cancelled, is_online_meeting,
             online_meeting_join_url, online_meeting_provider, organizer_email,
             organizer_name, original_start_time_zone, series_master_id,
             location_display_name, synced_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
            params![
                entry.i_cal_u_id,
                entry.event_id,
                entry.subject,
                entry.body_content,
                entry.body_preview,
                entry.start_date_time,
                entry.end_date_time,
                entry.is_cancelled,
                entry.is_online_meeting,
                entry.online_meeting_join_url,
                entry.online_meeting_provider,
                entry.organizer_email,
                entry.organizer_name,
                entry.original_start_time_zone,
                entry.series_master_id,
                entry.location_display_name,
                now,
            ],
        )?;
        Ok(())
    }

    /// Upsert an attendee row.
    pub fn save_attendee(&self, attendee: &Attendee) -> Result<()> {
        let now = Utc::now().timestamp_millis();

        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO calendar_view_attendees
            (unique_id, parent_i_cal_u_id, root_i_cal_u_id, email_address,
             display_name, attendee_type, synced_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                attendee.unique_id,
                attendee.parent_i_cal_u_id,
                attendee.root_i_cal_u_id,
                attendee.email_address,
                attendee.display_name,
                attendee.attendee_type,
                now,
            ],
        )?;
        Ok(())
    }

    /// Upsert a personal-event recurrence row.
    pub fn save_personal_event(&self, event: &PersonalEvent) -> Result<()> {
        let now = Utc::now().timestamp_millis();

        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO my_events
            (i_cal_u_id, event_id, recurrence_pattern_type,
             recurrence_day_of_month, recurrence_range_end_date, synced_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                event.i_cal_u_id,
                event.event_id,
                event.recurrence_pattern_type,
                event.recurrence_day_of_month,
                event.recurrence_range_end_date,
                now,
            ],
        )?;
        Ok(())
    }

    /// Get a user by id.
    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, mail, user_principal_name, display_name FROM users WHERE id = ?1",
        )?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::row_to_user(row)?))
        } else {
            Ok(None)
        }
    }

    /// List all users.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, mail, user_principal_name, display_name FROM users ORDER BY id",
        )?;

        let rows = stmt.query_map([], Self::row_to_user)?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Failed to read users: {}", e))
    }

    /// Get a calendar-view entry by its key.
    pub fn get_calendar_entry(&self, i_cal_u_id: &str) -> Result<Option<CalendarEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT i_cal_u_id, event_id, subject, body_content, body_preview,
                   start_date_time, end_date_time, is_cancelled, is_online_meeting,
                   online_meeting_join_url, online_meeting_provider, organizer_email,
                   organizer_name, original_start_time_zone, series_master_id,
                   location_display_name
            FROM calendar_view WHERE i_cal_u_id = ?1
            "#,
        )?;

        let mut rows = stmt.query(params![i_cal_u_id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::row_to_entry(row)?))
        } else {
            Ok(None)
        }
    }

    /// List all calendar-view entries ordered by start.
    pub fn list_calendar_entries(&self) -> Result<Vec<CalendarEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT i_cal_u_id, event_id, subject, body_content, body_preview,
                   start_date_time, end_date_time, is_cancelled, is_online_meeting,
                   online_meeting_join_url, online_meeting_provider, organizer_email,
                   organizer_name, original_start_time_zone, series_master_id,
                   location_display_name
            FROM calendar_view ORDER BY start_date_time ASC
            "#,
        )?;

        let rows = stmt.query_map([], Self::row_to_entry)?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Failed to read calendar entries: {}", e))
    }

    /// List the attendees of one calendar-view entry.
    pub fn attendees_for_entry(&self, parent_i_cal_u_id: &str) -> Result<Vec<Attendee>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT unique_id, parent_i_cal_u_id, root_i_cal_u_id, email_address,
                   display_name, attendee_type
            FROM calendar_view_attendees
            WHERE parent_i_cal_u_id = ?1
            ORDER BY unique_id
            "#,
        )?;

        let rows = stmt.query_map(params![parent_i_cal_u_id], Self::row_to_attendee)?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Failed to read attendees: {}", e))
    }

    /// Get a personal event by its key.
    pub fn get_personal_event(&self, i_cal_u_id: &str) -> Result<Option<PersonalEvent>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT i_cal_u_id, event_id, recurrence_pattern_type,
                   recurrence_day_of_month, recurrence_range_end_date
            FROM my_events WHERE i_cal_u_id = ?1
            "#,
        )?;

        let mut rows = stmt.query(params![i_cal_u_id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::row_to_personal_event(row)?))
        } else {
            Ok(None)
        }
    }

    /// List all personal events.
    pub fn list_personal_events(&self) -> Result<Vec<PersonalEvent>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT i_cal_u_id, event_id, recurrence_pattern_type,
                   recurrence_day_of_month, recurrence_range_end_date
            FROM my_events ORDER BY i_cal_u_id
            "#,
        )?;

        let rows = stmt.query_map([], Self::row_to_personal_event)?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Failed to read personal events: {}", e))
    }

    /// Row counts for every table.
    pub fn counts(&self) -> Result<StoreCounts> {
        let count = |table: &str| -> Result<u32> {
            let n: u32 = self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", table),
                [],
                |row| row.get(0),
            )?;
            Ok(n)
        };

        Ok(StoreCounts {
            users: count("users")?,
            calendar_entries: count("calendar_view")?,
            attendees: count("calendar_view_attendees")?,
            personal_events: count("my_events")?,
        })
    }

    /// Clear all synced data.
    pub fn clear(&self) -> Result<()> {
        self.conn.execute_batch(
            "DELETE FROM users;
             DELETE FROM calendar_view;
             DELETE FROM calendar_view_attendees;
             DELETE FROM my_events;",
        )?;
        Ok(())
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            mail: row.get(1)?,
            user_principal_name: row.get(2)?,
            display_name: row.get(3)?,
        })
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<CalendarEntry> {
        Ok(CalendarEntry {
            i_cal_u_id: row.get(0)?,
            event_id: row.get(1)?,
            subject: row.get(2)?,
            body_content: row.get(3)?,
            body_preview: row.get(4)?,
            start_date_time: row.get(5)?,
            end_date_time: row.get(6)?,
            is_cancelled: row.get(7)?,
            is_online_meeting: row.get(8)?,
            online_meeting_join_url: row.get(9)?,
            online_meeting_provider: row.get(10)?,
            organizer_email: row.get(11)?,
            organizer_name: row.get(12)?,
            original_start_time_zone: row.get(13)?,
            series_master_id: row.get(14)?,
            location_display_name: row.get(15)?,
        })
    }

    fn row_to_attendee(row: &rusqlite::Row) -> rusqlite::Result<Attendee> {
        Ok(Attendee {
            unique_id: row.get(0)?,
            parent_i_cal_u_id: row.get(1)?,
            root_i_cal_u_id: row.get(2)?,
            email_address: row.get(3)?,
            display_name: row.get(4)?,
            attendee_type: row.get(5)?,
        })
    }

    fn row_to_personal_event(row: &rusqlite::Row) -> rusqlite::Result<PersonalEvent> {
        Ok(PersonalEvent {
            i_cal_u_id: row.get(0)?,
            event_id: row.get(1)?,
            recurrence_pattern_type: row.get(2)?,
            recurrence_day_of_month: row.get(3)?,
            recurrence_range_end_date: row.get(4)?,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn make_user(id: &str, mail: Option<&str>) -> User {
        User {
            id: id.to_string(),
            mail: mail.map(str::to_string),
            user_principal_name: mail.map(str::to_string),
            display_name: Some(format!("User {}", id)),
        }
    }

    fn make_entry(key: &str, subject: &str, start: &str) -> CalendarEntry {
        CalendarEntry {
            i_cal_u_id: key.to_string(),
            event_id: Some(format!("evt-{}", key)),
            subject: Some(subject.to_string()),
            body_content: None,
            body_preview: None,
            start_date_time: Some(start.to_string()),
            end_date_time: None,
            is_cancelled: Some(false),
            is_online_meeting: None,
            online_meeting_join_url: None,
            online_meeting_provider: None,
            organizer_email: Some("organizer@example.com".to_string()),
            organizer_name: None,
            original_start_time_zone: None,
            series_master_id: None,
            location_display_name: None,
        }
    }

    fn make_attendee(parent: &str, n: u32) -> Attendee {
        Attendee {
            unique_id: format!("{}-att-{}", parent, n),
            parent_i_cal_u_id: parent.to_string(),
            root_i_cal_u_id: parent.to_string(),
            email_address: Some(format!("attendee{}@example.com", n)),
            display_name: None,
            attendee_type: Some("required".to_string()),
        }
    }

    fn make_personal_event(key: &str) -> PersonalEvent {
        PersonalEvent {
            i_cal_u_id: key.to_string(),
            event_id: Some(format!("evt-{}", key)),
            recurrence_pattern_type: Some("weekly".to_string()),
            recurrence_day_of_month: None,
            recurrence_range_end_date: Some("2024-12-31".to_string()),
        }
    }

    #[test]
    fn test_save_and_get_user() {
        let store = SyncStore::in_memory().unwrap();

        store.save_user(&make_user("u1", Some("ada@example.com"))).unwrap();
        let user = store.get_user("u1").unwrap().unwrap();

        assert_eq!(user.id, "u1");
        assert_eq!(user.mail, Some("ada@example.com".to_string()));
        assert!(store.get_user("missing").unwrap().is_none());
    }

    #[test]
    fn test_user_upsert_overwrites() {
        let store = SyncStore::in_memory().unwrap();

        store.save_user(&make_user("u1", Some("old@example.com"))).unwrap();
        store.save_user(&make_user("u1", Some("new@example.com"))).unwrap();

        let users = store.list_users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].mail, Some("new@example.com".to_string()));
    }

    #[test]
    fn test_save_and_list_calendar_entries_ordered() {
        let store = SyncStore::in_memory().unwrap();

        store
            .save_calendar_entry(&make_entry("b", "Later", "2024-02-02T10:00:00"))
            .unwrap();
        store
            .save_calendar_entry(&make_entry("a", "Earlier", "2024-02-01T10:00:00"))
            .unwrap();

        let entries = store.list_calendar_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].subject, Some("Earlier".to_string()));
        assert_eq!(entries[1].subject, Some("Later".to_string()));
    }

    #[test]
    fn test_calendar_entry_upsert_overwrites() {
        let store = SyncStore::in_memory().unwrap();

        store
            .save_calendar_entry(&make_entry("k1", "Before", "2024-02-01T10:00:00"))
            .unwrap();
        store
            .save_calendar_entry(&make_entry("k1", "After", "2024-02-01T10:00:00"))
            .unwrap();

        let entries = store.list_calendar_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].subject, Some("After".to_string()));
    }

    #[test]
    fn test_nullable_fields_roundtrip() {
        let store = SyncStore::in_memory().unwrap();

        let mut entry = make_entry("k1", "Sparse", "2024-02-01T10:00:00");
        entry.is_cancelled = None;
        entry.start_date_time = None;
        entry.organizer_email = None;
        store.save_calendar_entry(&entry).unwrap();

        let read = store.get_calendar_entry("k1").unwrap().unwrap();
        assert_eq!(read.is_cancelled, None);
        assert_eq!(read.start_date_time, None);
        assert_eq!(read.organizer_email, None);
        assert_eq!(read.subject, Some("Sparse".to_string()));
    }

    #[test]
    fn test_attendees_for_entry() {
        let store = SyncStore::in_memory().unwrap();

        store.save_attendee(&make_attendee("e1", 1)).unwrap();
        store.save_attendee(&make_attendee("e1", 2)).unwrap();
        store.save_attendee(&make_attendee("e2", 1)).unwrap();

        let attendees = store.attendees_for_entry("e1").unwrap();
        assert_eq!(attendees.len(), 2);
        assert!(attendees.iter().all(|a| a.parent_i_cal_u_id == "e1"));
        assert!(attendees.iter().all(|a| a.root_i_cal_u_id == "e1"));
    }

    #[test]
    fn test_attendee_upsert_same_key() {
        let store = SyncStore::in_memory().unwrap();

        let attendee = make_attendee("e1", 1);
        store.save_attendee(&attendee).unwrap();
        store.save_attendee(&attendee).unwrap();

        assert_eq!(store.attendees_for_entry("e1").unwrap().len(), 1);
    }

    #[test]
    fn test_save_and_get_personal_event() {
        let store = SyncStore::in_memory().unwrap();

        store.save_personal_event(&make_personal_event("p1")).unwrap();
        let event = store.get_personal_event("p1").unwrap().unwrap();

        assert_eq!(event.recurrence_pattern_type, Some("weekly".to_string()));
        assert_eq!(event.recurrence_day_of_month, None);
        assert_eq!(event.recurrence_range_end_date, Some("2024-12-31".to_string()));
    }

    #[test]
    fn test_counts() {
        let store = SyncStore::in_memory().unwrap();

        store.save_user(&make_user("u1", None)).unwrap();
        store
            .save_calendar_entry(&make_entry("k1", "One", "2024-02-01T10:00:00"))
            .unwrap();
        store.save_attendee(&make_attendee("k1", 1)).unwrap();
        store.save_attendee(&make_attendee("k1", 2)).unwrap();
        store.save_personal_event(&make_personal_event("p1")).unwrap();

        let counts = store.counts().unwrap();
        assert_eq!(counts.users, 1);
        assert_eq!(counts.calendar_entries, 1);
        assert_eq!(counts.attendees, 2);
        assert_eq!(counts.personal_events, 1);
    }

    #[test]
    fn test_clear() {
        let store = SyncStore::in_memory().unwrap();

        store.save_user(&make_user("u1", None)).unwrap();
        store.save_personal_event(&make_personal_event("p1")).unwrap();
        store.clear().unwrap();

        assert_eq!(store.counts().unwrap(), StoreCounts::default());
    }
}
