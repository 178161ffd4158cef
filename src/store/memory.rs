use super::{EventPatch, EventStore, ParticipantStore, StoreResult, UserStore, WriteCounts};
use crate::model::{Event, EventParticipant, ParticipantStatus, TimeRange, User};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory store backend
///
/// Reference backend over `tokio::sync::RwLock` maps, used by the tests and
/// for embedded deployments. Each call is atomic on its own; like the
/// production document store there is no transaction spanning calls, so the
/// services' documented inconsistency windows apply here too.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: RwLock<HashMap<String, Event>>,
    participants: RwLock<HashMap<String, EventParticipant>>,
    users: RwLock<HashMap<String, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn find_event(&self, event_id: &str) -> StoreResult<Option<Event>> {
        Ok(self.events.read().await.get(event_id).cloned())
    }

    async fn find_events(
        &self,
        event_ids: &[String],
        period: Option<TimeRange>,
    ) -> StoreResult<Vec<Event>> {
        let events = self.events.read().await;
        let matching = event_ids
            .iter()
            .filter_map(|id| events.get(id))
            .filter(|event| match period {
                Some(window) => event.time_range().overlaps(&window),
                None => true,
            })
            .cloned()
            .collect();
        Ok(matching)
    }

    async fn insert_event(&self, event: &Event) -> StoreResult<()> {
        self.events
            .write()
            .await
            .insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn update_event(&self, event_id: &str, patch: &EventPatch) -> StoreResult<WriteCounts> {
        let mut events = self.events.write().await;
        let Some(event) = events.get_mut(event_id) else {
            return Ok(WriteCounts {
                matched: 0,
                modified: 0,
            });
        };

        let before = event.clone();
        if let Some(title) = &patch.title {
            event.title = title.clone();
        }
        if let Some(description) = &patch.description {
            event.description = description.clone();
        }
        if let Some(start) = patch.start_time_utc {
            event.start_time_utc = start;
        }
        if let Some(end) = patch.end_time_utc {
            event.end_time_utc = end;
        }
        if let Some(zone) = &patch.time_zone_id {
            event.time_zone_id = Some(zone.clone());
        }

        Ok(WriteCounts {
            matched: 1,
            modified: u64::from(*event != before),
        })
    }

    async fn delete_event(&self, event_id: &str) -> StoreResult<u64> {
        let removed = self.events.write().await.remove(event_id);
        Ok(u64::from(removed.is_some()))
    }
}

#[async_trait]
impl ParticipantStore for MemoryStore {
    async fn find_for_event(&self, event_id: &str) -> StoreResult<Vec<EventParticipant>> {
        let participants = self.participants.read().await;
        let mut matching: Vec<EventParticipant> = participants
            .values()
            .filter(|p| p.event_id == event_id)
            .cloned()
            .collect();
        // Stable roster order for callers
        matching.sort_by(|a, b| a.added_at_utc.cmp(&b.added_at_utc).then(a.id.cmp(&b.id)));
        Ok(matching)
    }

    async fn find_for_user(&self, user_id: &str) -> StoreResult<Vec<EventParticipant>> {
        let participants = self.participants.read().await;
        Ok(participants
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_for_user_with_status(
        &self,
        user_id: &str,
        statuses: &[ParticipantStatus],
    ) -> StoreResult<Vec<EventParticipant>> {
        let participants = self.participants.read().await;
        Ok(participants
            .values()
            .filter(|p| p.user_id == user_id && statuses.contains(&p.status))
            .cloned()
            .collect())
    }

    async fn find_participation(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> StoreResult<Option<EventParticipant>> {
        let participants = self.participants.read().await;
        Ok(participants
            .values()
            .find(|p| p.event_id == event_id && p.user_id == user_id)
            .cloned())
    }

    async fn insert_participant(&self, participant: &EventParticipant) -> StoreResult<()> {
        self.participants
            .write()
            .await
            .insert(participant.id.clone(), participant.clone());
        Ok(())
    }

    async fn set_status(
        &self,
        event_id: &str,
        user_id: &str,
        status: ParticipantStatus,
    ) -> StoreResult<WriteCounts> {
        let mut participants = self.participants.write().await;
        let Some(participant) = participants
            .values_mut()
            .find(|p| p.event_id == event_id && p.user_id == user_id)
        else {
            return Ok(WriteCounts {
                matched: 0,
                modified: 0,
            });
        };

        let modified = u64::from(participant.status != status);
        participant.status = status;
        Ok(WriteCounts {
            matched: 1,
            modified,
        })
    }

    async fn delete_participation(&self, event_id: &str, user_id: &str) -> StoreResult<u64> {
        let mut participants = self.participants.write().await;
        let record_id = participants
            .values()
            .find(|p| p.event_id == event_id && p.user_id == user_id)
            .map(|p| p.id.clone());
        match record_id {
            Some(id) => {
                participants.remove(&id);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_for_event(&self, event_id: &str) -> StoreResult<u64> {
        let mut participants = self.participants.write().await;
        let before = participants.len();
        participants.retain(|_, p| p.event_id != event_id);
        Ok((before - participants.len()) as u64)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, user_id: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(all)
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        self.users
            .write()
            .await
            .insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> StoreResult<u64> {
        let removed = self.users.write().await.remove(user_id);
        Ok(u64::from(removed.is_some()))
    }
}
