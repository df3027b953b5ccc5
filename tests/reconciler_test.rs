//! Offline sync reconciler integration tests: strict FIFO replay, failed-draft
//! retention, and localId idempotency.

mod common;

use chrono::{Duration as ChronoDuration, Utc};
use common::*;
use complaint_core::models::{ComplaintType, DraftComplaint, DraftPayload, SyncState};
use complaint_core::services::ComplaintStore;
use complaint_core::state_machine::ComplaintState;
use complaint_core::sync::DraftSyncOutcome;
use std::time::Duration;

fn draft(local_id: &str, offset_secs: i64, complaint_type: ComplaintType) -> DraftComplaint {
    draft_with_location(local_id, offset_secs, complaint_type, in_bounds_location())
}

fn draft_with_location(
    local_id: &str,
    offset_secs: i64,
    complaint_type: ComplaintType,
    location: complaint_core::models::Location,
) -> DraftComplaint {
    DraftComplaint::new(
        local_id,
        Utc::now() + ChronoDuration::seconds(offset_secs),
        DraftPayload {
            classification: classification(complaint_type, 0.9),
            location,
            photo_ref: format!("photos/{local_id}.jpg"),
            contact: None,
        },
    )
}

#[tokio::test(start_paused = true)]
async fn drafts_replay_in_creation_order_despite_heterogeneous_latency() {
    // The oldest draft's work-order call is far slower than the others
    let endpoint = ScriptedEndpoint::succeeding().with_call_delays(vec![
        Duration::from_secs(30),
        Duration::from_secs(1),
        Duration::from_secs(1),
    ]);
    let harness = build_core(endpoint);
    register_roads_and_sanitation(&harness.core, ComplaintType::Pothole);

    // Queue handed over out of order; createdAtLocal decides
    let mut drafts = vec![
        draft("draft-c", 20, ComplaintType::Pothole),
        draft("draft-a", 0, ComplaintType::Pothole),
        draft("draft-b", 10, ComplaintType::Pothole),
    ];

    let outcomes = harness.core.reconciler.reconcile(&mut drafts).await;

    let processed: Vec<&str> = outcomes.iter().map(|o| o.local_id()).collect();
    assert_eq!(processed, vec!["draft-a", "draft-b", "draft-c"]);
    assert!(drafts.iter().all(|d| d.sync_state == SyncState::Synced));

    // Server-side ids were assigned in an order consistent with
    // createdAtLocal ordering, even though draft-a was slowest
    let mut created_at = Vec::new();
    for outcome in &outcomes {
        let complaint = harness
            .store
            .load(outcome.complaint_id().unwrap())
            .await
            .unwrap()
            .unwrap();
        created_at.push(complaint.created_at);
    }
    assert!(created_at.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[tokio::test]
async fn failed_draft_is_retained_and_does_not_block_newer_drafts() {
    let harness = build_core(ScriptedEndpoint::succeeding());
    register_roads_and_sanitation(&harness.core, ComplaintType::Pothole);

    let mut drafts = vec![
        draft("draft-1", 0, ComplaintType::Pothole),
        // Out-of-boundary submissions are rejected with no record created
        draft_with_location("draft-2", 10, ComplaintType::Pothole, out_of_bounds_location()),
        draft("draft-3", 20, ComplaintType::Pothole),
    ];

    let outcomes = harness.core.reconciler.reconcile(&mut drafts).await;

    assert_eq!(outcomes.len(), 3);
    assert!(matches!(&outcomes[0], DraftSyncOutcome::Synced { .. }));
    assert!(matches!(&outcomes[1], DraftSyncOutcome::Failed { .. }));
    assert!(matches!(&outcomes[2], DraftSyncOutcome::Synced { .. }));

    // The failed draft is retained unchanged for the next pass, in place
    assert_eq!(drafts[1].sync_state, SyncState::Failed);
    assert_eq!(drafts[0].sync_state, SyncState::Synced);
    assert_eq!(drafts[2].sync_state, SyncState::Synced);
}

#[tokio::test]
async fn next_pass_retries_only_unsynced_drafts() {
    let harness = build_core(ScriptedEndpoint::succeeding());
    register_roads_and_sanitation(&harness.core, ComplaintType::Pothole);

    let mut drafts = vec![
        draft("draft-1", 0, ComplaintType::Pothole),
        draft_with_location("draft-2", 10, ComplaintType::Pothole, out_of_bounds_location()),
    ];

    let first_pass = harness.core.reconciler.reconcile(&mut drafts).await;
    assert_eq!(first_pass.len(), 2);

    // Connectivity restored again: only the failed draft is replayed
    let second_pass = harness.core.reconciler.reconcile(&mut drafts).await;
    assert_eq!(second_pass.len(), 1);
    assert_eq!(second_pass[0].local_id(), "draft-2");
    assert!(matches!(&second_pass[0], DraftSyncOutcome::Failed { .. }));
}

#[tokio::test]
async fn lost_acknowledgment_resolves_to_original_complaint() {
    let harness = build_core(ScriptedEndpoint::succeeding());
    register_roads_and_sanitation(&harness.core, ComplaintType::Pothole);

    let mut drafts = vec![draft("draft-1", 0, ComplaintType::Pothole)];
    let first_pass = harness.core.reconciler.reconcile(&mut drafts).await;
    let original_id = first_pass[0].complaint_id().unwrap();

    // The acknowledgment never reached the client: the draft is still queued
    drafts[0].sync_state = SyncState::Pending;
    let second_pass = harness.core.reconciler.reconcile(&mut drafts).await;

    match &second_pass[0] {
        DraftSyncOutcome::Duplicate {
            complaint_id,
            local_id,
        } => {
            assert_eq!(*complaint_id, original_id);
            assert_eq!(local_id, "draft-1");
        }
        other => panic!("expected duplicate resolution, got {other:?}"),
    }

    // Exactly one complaint exists
    assert_eq!(harness.store.len(), 1);
    assert_eq!(drafts[0].sync_state, SyncState::Synced);
}

#[tokio::test]
async fn duplicate_local_id_creates_exactly_one_complaint() {
    let harness = build_core(ScriptedEndpoint::succeeding());
    register_roads_and_sanitation(&harness.core, ComplaintType::Pothole);

    let mut submission = new_complaint(ComplaintType::Pothole);
    submission.local_id = Some("device-7:42".to_string());

    let first = harness
        .core
        .orchestrator
        .submit(submission.clone())
        .await
        .unwrap();
    let second = harness.core.orchestrator.submit(submission).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(harness.store.len(), 1);
}

#[tokio::test]
async fn reconciled_complaints_flow_through_full_pipeline() {
    let harness = build_core(ScriptedEndpoint::succeeding());
    register_roads_and_sanitation(&harness.core, ComplaintType::Pothole);

    let mut drafts = vec![
        draft("draft-1", 0, ComplaintType::Pothole),
        // No mapping configured for garbage: lands in the manual queue but
        // still counts as a successful sync
        draft("draft-2", 10, ComplaintType::Garbage),
    ];

    let outcomes = harness.core.reconciler.reconcile(&mut drafts).await;
    assert!(matches!(&outcomes[0], DraftSyncOutcome::Synced { .. }));
    assert!(matches!(&outcomes[1], DraftSyncOutcome::Synced { .. }));

    let routed = harness
        .store
        .load(outcomes[0].complaint_id().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(routed.status, ComplaintState::Assigned);

    let queued = harness
        .store
        .load(outcomes[1].complaint_id().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(queued.status, ComplaintState::PendingManualRouting);
}
