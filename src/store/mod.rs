//! Document-store abstraction consumed by the services
//!
//! Three independent collections (events, participants, users) with no
//! foreign-key enforcement at the store layer; referential integrity lives
//! entirely in the services. Backends guarantee per-document atomicity only,
//! there are no cross-document transactions.

use crate::model::{Event, EventParticipant, ParticipantStatus, TimeRange, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use miette::Diagnostic;
use thiserror::Error;

pub mod memory;

pub use memory::MemoryStore;

/// Error from a store backend
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    #[diagnostic(code(aikataulu::store_backend))]
    Backend(String),
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;

/// Matched/modified counts acknowledged by an update
///
/// A zero `matched` means the target document vanished between read and
/// write; a zero `modified` with pending changes is a stale write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteCounts {
    pub matched: u64,
    pub modified: u64,
}

/// Field-level patch for event updates
///
/// `None` leaves a field untouched; for the description, `Some(None)`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub start_time_utc: Option<DateTime<Utc>>,
    pub end_time_utc: Option<DateTime<Utc>>,
    pub time_zone_id: Option<String>,
}

impl EventPatch {
    /// Whether the patch would touch any field
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.start_time_utc.is_none()
            && self.end_time_utc.is_none()
            && self.time_zone_id.is_none()
    }
}

/// Persistence primitives for the events collection
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn find_event(&self, event_id: &str) -> StoreResult<Option<Event>>;

    /// Events among `event_ids`, optionally restricted to those overlapping
    /// `period` (half-open test: `start < period.end && end > period.start`)
    async fn find_events(
        &self,
        event_ids: &[String],
        period: Option<TimeRange>,
    ) -> StoreResult<Vec<Event>>;

    async fn insert_event(&self, event: &Event) -> StoreResult<()>;

    async fn update_event(&self, event_id: &str, patch: &EventPatch) -> StoreResult<WriteCounts>;

    /// Returns the number of deleted documents
    async fn delete_event(&self, event_id: &str) -> StoreResult<u64>;
}

/// Persistence primitives for the participants collection
#[async_trait]
pub trait ParticipantStore: Send + Sync {
    async fn find_for_event(&self, event_id: &str) -> StoreResult<Vec<EventParticipant>>;

    async fn find_for_user(&self, user_id: &str) -> StoreResult<Vec<EventParticipant>>;

    /// Participations for `user_id` limited to the given statuses
    async fn find_for_user_with_status(
        &self,
        user_id: &str,
        statuses: &[ParticipantStatus],
    ) -> StoreResult<Vec<EventParticipant>>;

    async fn find_participation(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> StoreResult<Option<EventParticipant>>;

    async fn insert_participant(&self, participant: &EventParticipant) -> StoreResult<()>;

    async fn set_status(
        &self,
        event_id: &str,
        user_id: &str,
        status: ParticipantStatus,
    ) -> StoreResult<WriteCounts>;

    /// Returns the number of deleted documents
    async fn delete_participation(&self, event_id: &str, user_id: &str) -> StoreResult<u64>;

    /// Removes every participant record of an event; returns the count
    async fn delete_for_event(&self, event_id: &str) -> StoreResult<u64>;
}

/// Persistence primitives for the users collection
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, user_id: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    /// Returns the number of deleted documents
    async fn delete_user(&self, user_id: &str) -> StoreResult<u64>;
}
