//! Availability query orchestrator
//!
//! Gathers each participant's busy intervals from the store, merges them and
//! searches for free gaps long enough for the requested meeting.

use crate::error::CoreResult;
use crate::model::{ParticipantStatus, TimeRange};
use crate::store::{EventStore, ParticipantStore};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub mod slots;

pub use slots::{find_free_gaps, merge_intervals};

/// One candidate meeting slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AvailableSlot {
    pub start_time_utc: DateTime<Utc>,
    pub end_time_utc: DateTime<Utc>,
}

/// Slot search over the participants' combined calendars
pub struct AvailabilityService {
    events: Arc<dyn EventStore>,
    participants: Arc<dyn ParticipantStore>,
}

impl AvailabilityService {
    pub fn new(events: Arc<dyn EventStore>, participants: Arc<dyn ParticipantStore>) -> Self {
        Self {
            events,
            participants,
        }
    }

    /// Find every free slot common to all given participants
    ///
    /// Only Accepted and Tentative participations count as busy; an invited
    /// or declined event does not block time. Invalid windows and
    /// non-positive durations degrade to an empty result, mirroring the
    /// fail-soft read semantics of the store model.
    pub async fn find_available_slots(
        &self,
        participant_user_ids: &[String],
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        duration_minutes: i64,
    ) -> CoreResult<Vec<AvailableSlot>> {
        if window_end <= window_start {
            warn!("slot search rejected: window end is not after start");
            return Ok(Vec::new());
        }
        if duration_minutes <= 0 {
            warn!("slot search rejected: meeting duration must be positive");
            return Ok(Vec::new());
        }

        let min_duration = Duration::minutes(duration_minutes);
        let window = TimeRange {
            start: window_start,
            end: window_end,
        };
        let blocking = [ParticipantStatus::Accepted, ParticipantStatus::Tentative];

        // Collect the distinct events any participant is committed to
        let mut seen_users = HashSet::new();
        let mut event_ids = HashSet::new();
        for user_id in participant_user_ids {
            if !seen_users.insert(user_id.as_str()) {
                continue;
            }
            let participations = self
                .participants
                .find_for_user_with_status(user_id, &blocking)
                .await?;
            for participation in participations {
                event_ids.insert(participation.event_id);
            }
        }

        let mut busy: Vec<TimeRange> = Vec::new();
        if event_ids.is_empty() {
            debug!("slot search: no blocking participations, whole window is free");
        } else {
            let ids: Vec<String> = event_ids.into_iter().collect();
            let events = self.events.find_events(&ids, Some(window)).await?;
            busy.extend(events.iter().map(|event| event.time_range()));
        }

        busy.sort_by_key(|range| range.start);
        let merged = merge_intervals(busy);
        info!(
            "slot search: merged {} busy intervals for {} participants",
            merged.len(),
            seen_users.len()
        );

        let gaps = find_free_gaps(window_start, window_end, &merged, min_duration);
        Ok(gaps
            .into_iter()
            .map(|gap| AvailableSlot {
                start_time_utc: gap.start,
                end_time_utc: gap.end,
            })
            .collect())
    }
}
