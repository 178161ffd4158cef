use super::UNKNOWN_USER;
use crate::error::{forbidden, invalid_argument, not_found, store_inconsistency, CoreResult};
use crate::model::{
    new_document_id, Event, EventDetails, EventParticipant, ParticipantDetails, ParticipantStatus,
    TimeRange,
};
use crate::store::{EventPatch, EventStore, ParticipantStore, UserStore};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Input for event creation
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub start_time_utc: DateTime<Utc>,
    pub end_time_utc: DateTime<Utc>,
    /// Display hint only; all instants stay UTC
    pub time_zone_id: Option<String>,
    /// Users to invite; duplicates, the owner and unknown ids are skipped
    pub invited_user_ids: Vec<String>,
}

/// Partial update for an event; `None` fields stay untouched
///
/// An empty description string clears the stored value, which is distinct
/// from omitting the field. Supplying only one of the two times shifts the
/// other to preserve the event's original duration.
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time_utc: Option<DateTime<Utc>>,
    pub end_time_utc: Option<DateTime<Utc>>,
    pub time_zone_id: Option<String>,
}

/// Result of an update request
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(EventDetails),
    /// Nothing differed from current state; idempotent success
    Unchanged(EventDetails),
}

impl UpdateOutcome {
    pub fn details(&self) -> &EventDetails {
        match self {
            Self::Updated(details) | Self::Unchanged(details) => details,
        }
    }
}

/// Event lifecycle service: creation, reads, owner-gated mutation
pub struct EventService {
    events: Arc<dyn EventStore>,
    participants: Arc<dyn ParticipantStore>,
    users: Arc<dyn UserStore>,
}

impl EventService {
    pub fn new(
        events: Arc<dyn EventStore>,
        participants: Arc<dyn ParticipantStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            events,
            participants,
            users,
        }
    }

    /// Create an event owned by `owner_user_id`
    ///
    /// The owner always gets exactly one Accepted participant record, even
    /// when listed among the invitees. Invitees that do not resolve to a
    /// real user are skipped rather than failing the whole creation. The
    /// event and its participant records are written sequentially, not in
    /// one transaction; a crash in between leaves a partial participant set.
    pub async fn create_event(
        &self,
        new_event: NewEvent,
        owner_user_id: &str,
    ) -> CoreResult<EventDetails> {
        if new_event.end_time_utc <= new_event.start_time_utc {
            return Err(invalid_argument("event end must be after its start"));
        }
        if let Some(zone) = &new_event.time_zone_id {
            validate_time_zone(zone)?;
        }

        let owner = self
            .users
            .find_user(owner_user_id)
            .await?
            .ok_or_else(|| not_found("event owner"))?;

        let event = Event {
            id: new_document_id(),
            title: new_event.title,
            description: new_event.description,
            start_time_utc: new_event.start_time_utc,
            end_time_utc: new_event.end_time_utc,
            owner_user_id: owner_user_id.to_string(),
            time_zone_id: new_event.time_zone_id,
        };
        self.events.insert_event(&event).await?;

        // Owner first, always Accepted
        let owner_record = EventParticipant {
            id: new_document_id(),
            event_id: event.id.clone(),
            user_id: owner_user_id.to_string(),
            status: ParticipantStatus::Accepted,
            added_at_utc: Utc::now(),
        };
        self.participants.insert_participant(&owner_record).await?;

        let mut roster = vec![ParticipantDetails {
            user_id: owner.id.clone(),
            username: owner.username.clone(),
            status: ParticipantStatus::Accepted,
            added_at_utc: owner_record.added_at_utc,
        }];

        let mut seen = HashSet::new();
        for invited_id in &new_event.invited_user_ids {
            if invited_id.as_str() == owner_user_id || !seen.insert(invited_id.as_str()) {
                continue;
            }
            let Some(invited_user) = self.users.find_user(invited_id).await? else {
                debug!("skipping unknown invitee {} on event create", invited_id);
                continue;
            };
            let record = EventParticipant {
                id: new_document_id(),
                event_id: event.id.clone(),
                user_id: invited_id.clone(),
                status: ParticipantStatus::Invited,
                added_at_utc: Utc::now(),
            };
            self.participants.insert_participant(&record).await?;
            roster.push(ParticipantDetails {
                user_id: invited_user.id,
                username: invited_user.username,
                status: ParticipantStatus::Invited,
                added_at_utc: record.added_at_utc,
            });
        }

        info!(
            "created event {} with {} participants",
            event.id,
            roster.len()
        );
        Ok(EventDetails {
            event,
            owner_username: owner.username,
            participants: roster,
        })
    }

    /// Fetch an event with its participant roster
    ///
    /// Only the owner or a participant may read an event; everyone else
    /// gets the same NotFound as for an absent event, so existence cannot
    /// be probed.
    pub async fn get_event(
        &self,
        event_id: &str,
        requesting_user_id: &str,
    ) -> CoreResult<EventDetails> {
        let event = self
            .events
            .find_event(event_id)
            .await?
            .ok_or_else(|| not_found("event"))?;
        let participants = self.participants.find_for_event(event_id).await?;

        let is_owner = event.owner_user_id == requesting_user_id;
        let is_participant = participants
            .iter()
            .any(|p| p.user_id == requesting_user_id);
        if !is_owner && !is_participant {
            debug!(
                "user {} is not on event {}, returning not-found",
                requesting_user_id, event_id
            );
            return Err(not_found("event"));
        }

        self.build_details(event, participants).await
    }

    /// List every event the user participates in, ascending by start time
    ///
    /// Any participation status qualifies, including Invited and Declined.
    /// An invalid period degrades to an empty list; upstream validation is
    /// the caller's job.
    pub async fn list_events_for_user(
        &self,
        user_id: &str,
        period: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> CoreResult<Vec<EventDetails>> {
        let window = match period {
            Some((start, end)) => match TimeRange::new(start, end).filter(|w| w.end > w.start) {
                Some(window) => Some(window),
                None => {
                    warn!("event listing got an invalid period, returning empty");
                    return Ok(Vec::new());
                }
            },
            None => None,
        };

        let participations = self.participants.find_for_user(user_id).await?;
        if participations.is_empty() {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        let event_ids: Vec<String> = participations
            .into_iter()
            .map(|p| p.event_id)
            .filter(|id| seen.insert(id.clone()))
            .collect();

        let mut events = self.events.find_events(&event_ids, window).await?;
        events.sort_by_key(|event| event.start_time_utc);

        let mut listed = Vec::with_capacity(events.len());
        for event in events {
            let participants = self.participants.find_for_event(&event.id).await?;
            listed.push(self.build_details(event, participants).await?);
        }
        Ok(listed)
    }

    /// Apply a partial update; owner only
    ///
    /// When only one of the two times is supplied, the other is shifted to
    /// keep the original duration. A request that changes nothing succeeds
    /// as [`UpdateOutcome::Unchanged`].
    pub async fn update_event(
        &self,
        event_id: &str,
        update: EventUpdate,
        requesting_user_id: &str,
    ) -> CoreResult<UpdateOutcome> {
        let existing = self
            .events
            .find_event(event_id)
            .await?
            .ok_or_else(|| not_found("event"))?;
        if existing.owner_user_id != requesting_user_id {
            return Err(forbidden("only the owner can modify event details"));
        }

        // Resolve partial times, preserving duration when one side is absent
        let time_changed = update.start_time_utc.is_some() || update.end_time_utc.is_some();
        let (new_start, new_end) = match (update.start_time_utc, update.end_time_utc) {
            (Some(start), None) => (start, start + existing.duration()),
            (None, Some(end)) => (end - existing.duration(), end),
            (Some(start), Some(end)) => (start, end),
            (None, None) => (existing.start_time_utc, existing.end_time_utc),
        };
        if time_changed && new_end <= new_start {
            return Err(invalid_argument("event end must be after its start"));
        }
        if let Some(zone) = &update.time_zone_id {
            validate_time_zone(zone)?;
        }

        let mut patch = EventPatch::default();
        if let Some(title) = update.title {
            if title != existing.title {
                patch.title = Some(title);
            }
        }
        match update.description {
            // Empty string clears the stored description
            Some(text) if text.is_empty() => {
                if existing.description.is_some() {
                    patch.description = Some(None);
                }
            }
            Some(text) => {
                if existing.description.as_deref() != Some(text.as_str()) {
                    patch.description = Some(Some(text));
                }
            }
            None => {}
        }
        if time_changed {
            if new_start != existing.start_time_utc {
                patch.start_time_utc = Some(new_start);
            }
            if new_end != existing.end_time_utc {
                patch.end_time_utc = Some(new_end);
            }
        }
        if let Some(zone) = update.time_zone_id {
            if existing.time_zone_id.as_deref() != Some(zone.as_str()) {
                patch.time_zone_id = Some(zone);
            }
        }

        if patch.is_empty() {
            info!("update of event {} made no effective change", event_id);
            let participants = self.participants.find_for_event(event_id).await?;
            let details = self.build_details(existing, participants).await?;
            return Ok(UpdateOutcome::Unchanged(details));
        }

        let counts = self.events.update_event(event_id, &patch).await?;
        if counts.matched == 0 {
            warn!("event {} vanished between read and update", event_id);
            return Err(not_found("event"));
        }
        if counts.modified == 0 {
            return Err(store_inconsistency(
                "event update acknowledged but modified no documents",
            ));
        }

        let updated = self
            .events
            .find_event(event_id)
            .await?
            .ok_or_else(|| store_inconsistency("updated event missing on read-back"))?;
        let participants = self.participants.find_for_event(event_id).await?;
        let details = self.build_details(updated, participants).await?;
        Ok(UpdateOutcome::Updated(details))
    }

    /// Delete an event and all of its participant records; owner only
    ///
    /// Participants are cleared first, then the event. The two deletes are
    /// not atomic: an event that is already gone after its participants
    /// were cleared still counts as a successful delete.
    pub async fn delete_event(&self, event_id: &str, requesting_user_id: &str) -> CoreResult<()> {
        let event = self
            .events
            .find_event(event_id)
            .await?
            .ok_or_else(|| not_found("event"))?;
        if event.owner_user_id != requesting_user_id {
            return Err(forbidden("only the owner can delete an event"));
        }

        let cleared = self.participants.delete_for_event(event_id).await?;
        let deleted = self.events.delete_event(event_id).await?;

        if deleted == 0 {
            if cleared > 0 {
                info!(
                    "event {} was already gone; {} participant records cleared",
                    event_id, cleared
                );
                return Ok(());
            }
            return Err(store_inconsistency(
                "event vanished before deletion and no participants were cleared",
            ));
        }

        info!(
            "deleted event {} and {} participant records",
            event_id, cleared
        );
        Ok(())
    }

    /// Enrich an event and its raw participant records with display names
    async fn build_details(
        &self,
        event: Event,
        participants: Vec<EventParticipant>,
    ) -> CoreResult<EventDetails> {
        let owner_username = self
            .users
            .find_user(&event.owner_user_id)
            .await?
            .map(|user| user.username)
            .unwrap_or_else(|| UNKNOWN_USER.to_string());

        let lookups = participants
            .iter()
            .map(|p| self.users.find_user(&p.user_id));
        let resolved = join_all(lookups).await;

        let mut roster = Vec::with_capacity(participants.len());
        for (record, user) in participants.into_iter().zip(resolved) {
            let username = user?
                .map(|u| u.username)
                .unwrap_or_else(|| UNKNOWN_USER.to_string());
            roster.push(ParticipantDetails {
                user_id: record.user_id,
                username,
                status: record.status,
                added_at_utc: record.added_at_utc,
            });
        }

        Ok(EventDetails {
            event,
            owner_username,
            participants: roster,
        })
    }
}

/// Reject unknown time zone hints at the boundary
fn validate_time_zone(zone: &str) -> CoreResult<()> {
    zone.parse::<chrono_tz::Tz>()
        .map(|_| ())
        .map_err(|_| invalid_argument(&format!("unknown time zone id: {zone}")))
}
