use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Generate a fresh document id
pub fn new_document_id() -> String {
    Uuid::new_v4().to_string()
}

/// Stored user document
///
/// Credential fields are written by the identity layer; this core only reads
/// the directory fields (username, email, names).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at_utc: DateTime<Utc>,
}

/// Directory view of a user, without credential material
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Stored calendar event
///
/// All instants are stored and compared in UTC; `time_zone_id` is a display
/// hint only. Invariant: `end_time_utc > start_time_utc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_time_utc: DateTime<Utc>,
    pub end_time_utc: DateTime<Utc>,
    pub owner_user_id: String,
    pub time_zone_id: Option<String>,
}

impl Event {
    pub fn duration(&self) -> Duration {
        self.end_time_utc - self.start_time_utc
    }

    /// The busy interval this event occupies
    pub fn time_range(&self) -> TimeRange {
        TimeRange {
            start: self.start_time_utc,
            end: self.end_time_utc,
        }
    }
}

/// Participation status of a user on an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipantStatus {
    Invited,
    Accepted,
    Declined,
    Tentative,
}

impl ParticipantStatus {
    /// Parse external input into the closed enum, case-insensitively
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "invited" => Some(Self::Invited),
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            "tentative" => Some(Self::Tentative),
            _ => None,
        }
    }

    /// Canonical string form, as persisted
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invited => "Invited",
            Self::Accepted => "Accepted",
            Self::Declined => "Declined",
            Self::Tentative => "Tentative",
        }
    }

    /// Whether this participation blocks the user's time
    ///
    /// Only confirmed-or-likely attendance counts as busy; invitations that
    /// were not answered or were declined do not.
    pub fn blocks_time(&self) -> bool {
        matches!(self, Self::Accepted | Self::Tentative)
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored participant record linking a user to an event
///
/// At most one record exists per `(event_id, user_id)` pair. The owner's
/// record is created together with the event and stays `Accepted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventParticipant {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    pub status: ParticipantStatus,
    pub added_at_utc: DateTime<Utc>,
}

/// Closed time range with `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Build a range, rejecting inverted bounds
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Half-open overlap test: `self.start < other.end && self.end > other.start`
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Participant record enriched with the resolved display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantDetails {
    pub user_id: String,
    pub username: String,
    pub status: ParticipantStatus,
    pub added_at_utc: DateTime<Utc>,
}

/// Event enriched with the owner's display name and the participant roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDetails {
    pub event: Event,
    pub owner_username: String,
    pub participants: Vec<ParticipantDetails>,
}
