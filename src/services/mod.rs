//! Event, participant and user services
//!
//! Each service takes its store handles by constructor injection and
//! re-derives authorization from the caller identity and stored state on
//! every mutation; no client-asserted role is trusted.

pub mod events;
pub mod participants;
pub mod users;

pub use events::{EventService, EventUpdate, NewEvent, UpdateOutcome};
pub use participants::{AddOutcome, ParticipantService, StatusOutcome};
pub use users::UserService;

/// Display name used when a referenced user cannot be resolved
pub(crate) const UNKNOWN_USER: &str = "unknown user";
