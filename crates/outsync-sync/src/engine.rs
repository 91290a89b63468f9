//! Sync orchestration: directory first, then the two calendar fetchers.

use tracing::instrument;

use outsync_graph::{Attendee, CalendarEntry, GraphClient, PersonalEvent, SyncWindow, User};
use outsync_store::SyncStore;

use crate::error::SyncError;

/// Row counts written during one sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub users: u32,
    pub calendar_entries: u32,
    pub attendees: u32,
    pub personal_events: u32,
}

/// Pulls directory and calendar data from the Graph API into the store.
///
/// Client and store are injected at construction; the engine holds no
/// other state. Saves are eager: every row is written as soon as it is
/// flattened, so a failure later in the run never discards earlier rows.
pub struct SyncEngine {
    client: GraphClient,
    store: SyncStore,
}

impl SyncEngine {
    pub fn new(client: GraphClient, store: SyncStore) -> Self {
        Self { client, store }
    }

    /// The underlying store, for summaries and read-backs.
    pub fn store(&self) -> &SyncStore {
        &self.store
    }

    /// The underlying client, for mutation calls.
    pub fn client(&self) -> &GraphClient {
        &self.client
    }

    /// One full sync: the whole directory, then calendar view and
    /// personal events for every user.
    ///
    /// The user list is collected completely before either fetcher
    /// starts, and the same window is used for the whole batch. The two
    /// fetchers run concurrently and are both driven to completion;
    /// when both fail, the calendar-view error is the one reported.
    #[instrument(skip(self, window), level = "info")]
    pub async fn full_sync(&self, window: &SyncWindow) -> Result<SyncReport, SyncError> {
        let user_ids = self.sync_users().await?;
        tracing::info!("directory sync complete: {} users", user_ids.len());

        let (calendar, personal) = tokio::join!(
            self.sync_calendar_view(&user_ids, window),
            self.sync_my_events(&user_ids),
        );

        let (calendar_entries, attendees) = calendar?;
        let personal_events = personal?;

        Ok(SyncReport {
            users: user_ids.len() as u32,
            calendar_entries,
            attendees,
            personal_events,
        })
    }

    /// Re-run both fetchers for a single user, after a mutation.
    #[instrument(skip(self, window), level = "info")]
    pub async fn resync_user(&self, user_id: &str, window: &SyncWindow) -> Result<(), SyncError> {
        let ids = [user_id.to_string()];

        let (calendar, personal) = tokio::join!(
            self.sync_calendar_view(&ids, window),
            self.sync_my_events(&ids),
        );

        calendar?;
        personal?;
        Ok(())
    }

    /// Sync the user directory. Returns ids in first-seen order, only
    /// after pagination has completed.
    #[instrument(skip(self), level = "info")]
    pub async fn sync_users(&self) -> Result<Vec<String>, SyncError> {
        let api_users = self
            .client
            .list_users()
            .await
            .map_err(|source| SyncError::Directory { source })?;

        let mut user_ids = Vec::with_capacity(api_users.len());
        for api_user in api_users {
            user_ids.push(api_user.id.clone());
            self.store.save_user(&User::from(api_user))?;
        }

        Ok(user_ids)
    }

    /// Fetch the calendar view of each user and persist entries with
    /// their attendees. Returns (entries, attendees) written.
    ///
    /// A 404 means the user has no resolvable calendar and is skipped;
    /// any other failure aborts the run.
    #[instrument(skip_all, level = "info")]
    pub async fn sync_calendar_view(
        &self,
        user_ids: &[String],
        window: &SyncWindow,
    ) -> Result<(u32, u32), SyncError> {
        let mut entries = 0u32;
        let mut attendees = 0u32;

        for user_id in user_ids {
            let events = match self.client.calendar_view(user_id, window).await {
                Ok(events) => events,
                Err(err) if err.is_not_found() => {
                    tracing::debug!("no calendar view for {}, skipping", user_id);
                    continue;
                }
                Err(source) => {
                    return Err(SyncError::CalendarView {
                        user_id: user_id.clone(),
                        source,
                    });
                }
            };

            for api_event in &events {
                let entry = match CalendarEntry::from_api(api_event) {
                    Some(entry) => entry,
                    None => {
                        tracing::warn!("calendar record without iCalUId for {}, skipped", user_id);
                        continue;
                    }
                };

                self.store.save_calendar_entry(&entry)?;
                entries += 1;

                for (ordinal, api_attendee) in api_event.attendees.iter().enumerate() {
                    let attendee = Attendee::from_api(&entry.i_cal_u_id, ordinal, api_attendee);
                    self.store.save_attendee(&attendee)?;
                    attendees += 1;
                }
            }

            tracing::debug!("calendar view synced for {}", user_id);
        }

        Ok((entries, attendees))
    }

    /// Fetch each user's own event list and persist the recurrence
    /// projections. Returns the number of rows written.
    ///
    /// Same error policy as the calendar view: 404 skips the user,
    /// anything else aborts.
    #[instrument(skip_all, level = "info")]
    pub async fn sync_my_events(&self, user_ids: &[String]) -> Result<u32, SyncError> {
        let mut written = 0u32;

        for user_id in user_ids {
            let events = match self.client.list_events(user_id).await {
                Ok(events) => events,
                Err(err) if err.is_not_found() => {
                    tracing::debug!("no event list for {}, skipping", user_id);
                    continue;
                }
                Err(source) => {
                    return Err(SyncError::Events {
                        user_id: user_id.clone(),
                        source,
                    });
                }
            };

            for api_event in &events {
                let event = match PersonalEvent::from_api(api_event) {
                    Some(event) => event,
                    None => {
                        tracing::warn!("event record without iCalUId for {}, skipped", user_id);
                        continue;
                    }
                };

                self.store.save_personal_event(&event)?;
                written += 1;
            }

            tracing::debug!("events synced for {}", user_id);
        }

        Ok(written)
    }
}
