#![allow(dead_code)]

use aikataulu::availability::AvailabilityService;
use aikataulu::model::{new_document_id, User};
use aikataulu::services::{EventService, NewEvent, ParticipantService, UserService};
use aikataulu::store::{MemoryStore, UserStore};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

/// Services wired over one shared in-memory store
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub events: EventService,
    pub participants: ParticipantService,
    pub users: UserService,
    pub availability: AvailabilityService,
}

pub fn context() -> TestContext {
    aikataulu::logging::init();
    let store = Arc::new(MemoryStore::new());
    TestContext {
        events: EventService::new(store.clone(), store.clone(), store.clone()),
        participants: ParticipantService::new(store.clone(), store.clone(), store.clone()),
        users: UserService::new(store.clone()),
        availability: AvailabilityService::new(store.clone(), store.clone()),
        store,
    }
}

pub async fn seed_user(store: &MemoryStore, username: &str) -> String {
    let user = User {
        id: new_document_id(),
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password_hash: "$2b$12$seeded-test-hash".to_string(),
        first_name: None,
        last_name: None,
        created_at_utc: Utc::now(),
    };
    store.insert_user(&user).await.unwrap();
    user.id
}

/// A fixed test day, hour:minute in UTC
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
}

pub fn meeting(
    title: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    invited_user_ids: Vec<String>,
) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        description: None,
        start_time_utc: start,
        end_time_utc: end,
        time_zone_id: None,
        invited_user_ids,
    }
}
