use super::UNKNOWN_USER;
use crate::error::{
    forbidden, invalid_argument, not_found, store_inconsistency, CoreResult, Error,
};
use crate::model::{
    new_document_id, EventParticipant, ParticipantDetails, ParticipantStatus,
};
use crate::store::{EventStore, ParticipantStore, UserStore};
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of an add-participant request
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added(ParticipantDetails),
    /// The user was already on the event; the existing record is returned
    /// unchanged (informational, not an error)
    AlreadyParticipant(ParticipantDetails),
}

impl AddOutcome {
    pub fn details(&self) -> &ParticipantDetails {
        match self {
            Self::Added(details) | Self::AlreadyParticipant(details) => details,
        }
    }
}

/// Result of a status-update request
#[derive(Debug, Clone, PartialEq)]
pub enum StatusOutcome {
    Updated(ParticipantDetails),
    /// Requested status equals the current one; idempotent success
    Unchanged(ParticipantDetails),
}

impl StatusOutcome {
    pub fn details(&self) -> &ParticipantDetails {
        match self {
            Self::Updated(details) | Self::Unchanged(details) => details,
        }
    }
}

/// Participant lifecycle service: roster reads, invitations, status changes
/// and removals, with the authorization gate re-derived from stored state
pub struct ParticipantService {
    events: Arc<dyn EventStore>,
    participants: Arc<dyn ParticipantStore>,
    users: Arc<dyn UserStore>,
}

impl ParticipantService {
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

    /// Roster of an event with resolved display names
    ///
    /// Fail-soft read: a missing event or an unauthorized requester both
    /// yield an empty roster, consistent with the event read path.
    pub async fn list_participants(
        &self,
        event_id: &str,
        requesting_user_id: &str,
    ) -> CoreResult<Vec<ParticipantDetails>> {
        let Some(event) = self.events.find_event(event_id).await? else {
            warn!("roster requested for missing event {}", event_id);
            return Ok(Vec::new());
        };

        let records = self.participants.find_for_event(event_id).await?;
        let is_owner = event.owner_user_id == requesting_user_id;
        let is_participant = records.iter().any(|p| p.user_id == requesting_user_id);
        if !is_owner && !is_participant {
            warn!(
                "user {} not authorized for roster of event {}",
                requesting_user_id, event_id
            );
            return Ok(Vec::new());
        }

        let lookups = records.iter().map(|p| self.users.find_user(&p.user_id));
        let resolved = join_all(lookups).await;
        let mut roster = Vec::with_capacity(records.len());
        for (record, user) in records.into_iter().zip(resolved) {
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
        Ok(roster)
    }

    /// Invite a user to an event; owner only
    ///
    /// Adding an existing participant is idempotent: the stored record is
    /// returned with a duplicate signal instead of creating a second row
    /// for the same (event, user) pair.
    pub async fn add_participant(
        &self,
        event_id: &str,
        user_id_to_add: &str,
        requesting_user_id: &str,
    ) -> CoreResult<AddOutcome> {
        let event = self
            .events
            .find_event(event_id)
            .await?
            .ok_or_else(|| not_found("event"))?;
        if event.owner_user_id != requesting_user_id {
            return Err(forbidden("only the owner can invite participants"));
        }
        if user_id_to_add == event.owner_user_id {
            return Err(invalid_argument(
                "the owner is already an implicit participant",
            ));
        }

        let user = self
            .users
            .find_user(user_id_to_add)
            .await?
            .ok_or_else(|| not_found("user"))?;

        if let Some(existing) = self
            .participants
            .find_participation(event_id, user_id_to_add)
            .await?
        {
            info!(
                "user {} is already on event {}, returning existing record",
                user_id_to_add, event_id
            );
            return Ok(AddOutcome::AlreadyParticipant(ParticipantDetails {
                user_id: existing.user_id,
                username: user.username,
                status: existing.status,
                added_at_utc: existing.added_at_utc,
            }));
        }

        let record = EventParticipant {
            id: new_document_id(),
            event_id: event_id.to_string(),
            user_id: user_id_to_add.to_string(),
            status: ParticipantStatus::Invited,
            added_at_utc: Utc::now(),
        };
        self.participants.insert_participant(&record).await?;
        info!("invited user {} to event {}", user_id_to_add, event_id);

        Ok(AddOutcome::Added(ParticipantDetails {
            user_id: record.user_id,
            username: user.username,
            status: record.status,
            added_at_utc: record.added_at_utc,
        }))
    }

    /// Change a participant's status
    ///
    /// The raw status string is decoded case-insensitively here, at the
    /// boundary. The caller must be the event owner or the participant
    /// themselves; the owner's own record stays pinned to Accepted. Setting
    /// the current status again is an idempotent success.
    pub async fn update_status(
        &self,
        event_id: &str,
        participant_user_id: &str,
        new_status: &str,
        requesting_user_id: &str,
    ) -> CoreResult<StatusOutcome> {
        let status = ParticipantStatus::parse(new_status)
            .ok_or_else(|| Error::InvalidStatus(new_status.to_string()))?;

        let event = self
            .events
            .find_event(event_id)
            .await?
            .ok_or_else(|| not_found("event"))?;
        let record = self
            .participants
            .find_participation(event_id, participant_user_id)
            .await?
            .ok_or_else(|| not_found("participant"))?;

        let is_owner = event.owner_user_id == requesting_user_id;
        let is_self = participant_user_id == requesting_user_id;
        if !is_owner && !is_self {
            return Err(forbidden(
                "only the owner or the participant themselves can change a status",
            ));
        }
        if participant_user_id == event.owner_user_id && status != ParticipantStatus::Accepted {
            return Err(Error::OwnerStatusFixed);
        }

        if record.status == status {
            return Ok(StatusOutcome::Unchanged(self.details_for(record).await?));
        }

        let counts = self
            .participants
            .set_status(event_id, participant_user_id, status)
            .await?;
        if counts.matched == 0 {
            warn!(
                "participant {} on event {} vanished during status update",
                participant_user_id, event_id
            );
            return Err(not_found("participant"));
        }
        if counts.modified == 0 {
            return Err(store_inconsistency(
                "status update acknowledged but modified no documents",
            ));
        }

        let updated = self
            .participants
            .find_participation(event_id, participant_user_id)
            .await?
            .ok_or_else(|| store_inconsistency("updated participant missing on read-back"))?;
        info!(
            "participant {} on event {} is now {}",
            participant_user_id, event_id, status
        );
        Ok(StatusOutcome::Updated(self.details_for(updated).await?))
    }

    /// Remove a participant from an event
    ///
    /// Allowed for the owner (removing others) and for a participant
    /// leaving on their own. The owner's own record can never be removed;
    /// deleting the whole event is the only way out for the owner.
    pub async fn remove_participant(
        &self,
        event_id: &str,
        participant_user_id: &str,
        requesting_user_id: &str,
    ) -> CoreResult<()> {
        let event = self
            .events
            .find_event(event_id)
            .await?
            .ok_or_else(|| not_found("event"))?;

        let is_owner = event.owner_user_id == requesting_user_id;
        let is_self = participant_user_id == requesting_user_id;
        if !is_owner && !is_self {
            return Err(forbidden(
                "only the owner or the participant themselves can remove a participation",
            ));
        }
        // Hard rule, checked even when the owner condition would authorize it
        if participant_user_id == event.owner_user_id {
            return Err(forbidden(
                "the owner's participation cannot be removed; delete the event instead",
            ));
        }

        self.participants
            .find_participation(event_id, participant_user_id)
            .await?
            .ok_or_else(|| not_found("participant"))?;

        let deleted = self
            .participants
            .delete_participation(event_id, participant_user_id)
            .await?;
        if deleted == 0 {
            return Err(store_inconsistency(
                "participant vanished during removal",
            ));
        }

        info!(
            "removed participant {} from event {}",
            participant_user_id, event_id
        );
        Ok(())
    }

    /// Resolve the display name for one participant record
    async fn details_for(&self, record: EventParticipant) -> CoreResult<ParticipantDetails> {
        let username = self
            .users
            .find_user(&record.user_id)
            .await?
            .map(|u| u.username)
            .unwrap_or_else(|| UNKNOWN_USER.to_string());
        Ok(ParticipantDetails {
            user_id: record.user_id,
            username,
            status: record.status,
            added_at_utc: record.added_at_utc,
        })
    }
}
