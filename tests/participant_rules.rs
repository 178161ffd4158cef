mod common;

use aikataulu::model::ParticipantStatus;
use aikataulu::services::{AddOutcome, StatusOutcome};
use aikataulu::store::ParticipantStore;
use aikataulu::Error;
use common::{at, context, meeting, seed_user};

#[tokio::test]
async fn adding_twice_returns_the_same_record() {
    let ctx = context();
    let owner = seed_user(&ctx.store, "liisa").await;
    let friend = seed_user(&ctx.store, "pekka").await;

    let details = ctx
        .events
        .create_event(meeting("sync", at(9, 0), at(10, 0), Vec::new()), &owner)
        .await
        .unwrap();
    let event_id = details.event.id.clone();

    let first = ctx
        .participants
        .add_participant(&event_id, &friend, &owner)
        .await
        .unwrap();
    let AddOutcome::Added(added) = &first else {
        panic!("first add should create a record");
    };

    let second = ctx
        .participants
        .add_participant(&event_id, &friend, &owner)
        .await
        .unwrap();
    let AddOutcome::AlreadyParticipant(existing) = &second else {
        panic!("second add should report the duplicate");
    };
    assert_eq!(existing, added);

    // Still a single row for the (event, user) pair
    let stored = ctx.store.find_for_event(&event_id).await.unwrap();
    assert_eq!(stored.iter().filter(|p| p.user_id == friend).count(), 1);
}

#[tokio::test]
async fn only_owner_may_invite() {
    let ctx = context();
    let owner = seed_user(&ctx.store, "liisa").await;
    let friend = seed_user(&ctx.store, "pekka").await;
    let third = seed_user(&ctx.store, "mikko").await;

    let details = ctx
        .events
        .create_event(
            meeting("closed", at(9, 0), at(10, 0), vec![friend.clone()]),
            &owner,
        )
        .await
        .unwrap();

    let result = ctx
        .participants
        .add_participant(&details.event.id, &third, &friend)
        .await;
    assert!(matches!(result, Err(Error::Forbidden(_))));
}

#[tokio::test]
async fn owner_cannot_be_invited_again() {
    let ctx = context();
    let owner = seed_user(&ctx.store, "liisa").await;

    let details = ctx
        .events
        .create_event(meeting("solo", at(9, 0), at(10, 0), Vec::new()), &owner)
        .await
        .unwrap();

    let result = ctx
        .participants
        .add_participant(&details.event.id, &owner, &owner)
        .await;
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[tokio::test]
async fn inviting_unknown_user_fails() {
    let ctx = context();
    let owner = seed_user(&ctx.store, "liisa").await;

    let details = ctx
        .events
        .create_event(meeting("solo", at(9, 0), at(10, 0), Vec::new()), &owner)
        .await
        .unwrap();

    let result = ctx
        .participants
        .add_participant(&details.event.id, "ghost-user", &owner)
        .await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn status_strings_are_decoded_case_insensitively() {
    let ctx = context();
    let owner = seed_user(&ctx.store, "liisa").await;
    let friend = seed_user(&ctx.store, "pekka").await;

    let details = ctx
        .events
        .create_event(
            meeting("rsvp", at(9, 0), at(10, 0), vec![friend.clone()]),
            &owner,
        )
        .await
        .unwrap();

    let outcome = ctx
        .participants
        .update_status(&details.event.id, &friend, "tentative", &friend)
        .await
        .unwrap();
    assert_eq!(outcome.details().status, ParticipantStatus::Tentative);

    let result = ctx
        .participants
        .update_status(&details.event.id, &friend, "perhaps", &friend)
        .await;
    assert!(matches!(result, Err(Error::InvalidStatus(_))));
}

#[tokio::test]
async fn owner_status_is_pinned_to_accepted() {
    let ctx = context();
    let owner = seed_user(&ctx.store, "liisa").await;
    let friend = seed_user(&ctx.store, "pekka").await;

    let details = ctx
        .events
        .create_event(
            meeting("pinned", at(9, 0), at(10, 0), vec![friend.clone()]),
            &owner,
        )
        .await
        .unwrap();
    let event_id = details.event.id.clone();

    // The owner cannot move their own record off Accepted
    let declined = ctx
        .participants
        .update_status(&event_id, &owner, "Declined", &owner)
        .await;
    assert!(matches!(declined, Err(Error::OwnerStatusFixed)));

    // Re-stating Accepted is an idempotent success
    let accepted = ctx
        .participants
        .update_status(&event_id, &owner, "accepted", &owner)
        .await
        .unwrap();
    assert!(matches!(accepted, StatusOutcome::Unchanged(_)));

    // A non-owner caller fails the authorization gate outright
    let foreign = ctx
        .participants
        .update_status(&event_id, &owner, "Declined", &friend)
        .await;
    assert!(matches!(foreign, Err(Error::Forbidden(_))));
}

#[tokio::test]
async fn participant_manages_only_their_own_status() {
    let ctx = context();
    let owner = seed_user(&ctx.store, "liisa").await;
    let friend = seed_user(&ctx.store, "pekka").await;
    let third = seed_user(&ctx.store, "mikko").await;

    let details = ctx
        .events
        .create_event(
            meeting("rsvp", at(9, 0), at(10, 0), vec![friend.clone(), third.clone()]),
            &owner,
        )
        .await
        .unwrap();
    let event_id = details.event.id.clone();

    // Self-update works
    let own = ctx
        .participants
        .update_status(&event_id, &friend, "Accepted", &friend)
        .await
        .unwrap();
    assert!(matches!(own, StatusOutcome::Updated(_)));

    // The owner may update anyone
    let by_owner = ctx
        .participants
        .update_status(&event_id, &third, "Tentative", &owner)
        .await
        .unwrap();
    assert_eq!(by_owner.details().status, ParticipantStatus::Tentative);

    // A peer may not touch someone else's record
    let foreign = ctx
        .participants
        .update_status(&event_id, &third, "Declined", &friend)
        .await;
    assert!(matches!(foreign, Err(Error::Forbidden(_))));
}

#[tokio::test]
async fn repeating_the_current_status_is_a_noop() {
    let ctx = context();
    let owner = seed_user(&ctx.store, "liisa").await;
    let friend = seed_user(&ctx.store, "pekka").await;

    let details = ctx
        .events
        .create_event(
            meeting("rsvp", at(9, 0), at(10, 0), vec![friend.clone()]),
            &owner,
        )
        .await
        .unwrap();

    let outcome = ctx
        .participants
        .update_status(&details.event.id, &friend, "Invited", &friend)
        .await
        .unwrap();
    assert!(matches!(outcome, StatusOutcome::Unchanged(_)));
    assert_eq!(outcome.details().status, ParticipantStatus::Invited);
}

#[tokio::test]
async fn participant_can_leave_and_owner_can_remove_others() {
    let ctx = context();
    let owner = seed_user(&ctx.store, "liisa").await;
    let friend = seed_user(&ctx.store, "pekka").await;
    let third = seed_user(&ctx.store, "mikko").await;

    let details = ctx
        .events
        .create_event(
            meeting("shrinking", at(9, 0), at(10, 0), vec![friend.clone(), third.clone()]),
            &owner,
        )
        .await
        .unwrap();
    let event_id = details.event.id.clone();

    ctx.participants
        .remove_participant(&event_id, &friend, &friend)
        .await
        .unwrap();
    ctx.participants
        .remove_participant(&event_id, &third, &owner)
        .await
        .unwrap();

    let stored = ctx.store.find_for_event(&event_id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].user_id, owner);
}

#[tokio::test]
async fn owner_may_never_remove_their_own_record() {
    let ctx = context();
    let owner = seed_user(&ctx.store, "liisa").await;
    let friend = seed_user(&ctx.store, "pekka").await;

    // With company on the event
    let populated = ctx
        .events
        .create_event(
            meeting("full", at(9, 0), at(10, 0), vec![friend.clone()]),
            &owner,
        )
        .await
        .unwrap();
    let result = ctx
        .participants
        .remove_participant(&populated.event.id, &owner, &owner)
        .await;
    assert!(matches!(result, Err(Error::Forbidden(_))));

    // And alone on it
    let solo = ctx
        .events
        .create_event(meeting("solo", at(11, 0), at(12, 0), Vec::new()), &owner)
        .await
        .unwrap();
    let result = ctx
        .participants
        .remove_participant(&solo.event.id, &owner, &owner)
        .await;
    assert!(matches!(result, Err(Error::Forbidden(_))));
}

#[tokio::test]
async fn peers_cannot_remove_each_other() {
    let ctx = context();
    let owner = seed_user(&ctx.store, "liisa").await;
    let friend = seed_user(&ctx.store, "pekka").await;
    let third = seed_user(&ctx.store, "mikko").await;

    let details = ctx
        .events
        .create_event(
            meeting("guarded", at(9, 0), at(10, 0), vec![friend.clone(), third.clone()]),
            &owner,
        )
        .await
        .unwrap();

    let result = ctx
        .participants
        .remove_participant(&details.event.id, &third, &friend)
        .await;
    assert!(matches!(result, Err(Error::Forbidden(_))));
}

#[tokio::test]
async fn roster_reads_fail_soft() {
    let ctx = context();
    let owner = seed_user(&ctx.store, "liisa").await;
    let friend = seed_user(&ctx.store, "pekka").await;
    let outsider = seed_user(&ctx.store, "mikko").await;

    let details = ctx
        .events
        .create_event(
            meeting("quiet", at(9, 0), at(10, 0), vec![friend.clone()]),
            &owner,
        )
        .await
        .unwrap();

    // Missing event and unauthorized requester both yield empty rosters
    let missing = ctx
        .participants
        .list_participants("no-such-event", &owner)
        .await
        .unwrap();
    assert!(missing.is_empty());

    let unauthorized = ctx
        .participants
        .list_participants(&details.event.id, &outsider)
        .await
        .unwrap();
    assert!(unauthorized.is_empty());

    // A member sees the roster with resolved names
    let roster = ctx
        .participants
        .list_participants(&details.event.id, &friend)
        .await
        .unwrap();
    assert_eq!(roster.len(), 2);
    assert!(roster.iter().any(|p| p.username == "liisa"));
    assert!(roster.iter().any(|p| p.username == "pekka"));
}
