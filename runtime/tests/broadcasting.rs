//! Integration tests for Store action broadcasting
//!
//! Request handlers send a command and wait for the outcome event carrying
//! their request id. These tests pin down that flow.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use crossoff_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use crossoff_runtime::{Store, StoreConfig, StoreError};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum SlotAction {
    /// Command: claim the next free slot
    Claim { request: u64 },
    /// Command: release a slot
    Release { request: u64, slot: u32 },
    /// Event: slot claimed
    Claimed { request: u64, slot: u32 },
    /// Event: slot released
    Released { request: u64, slot: u32 },
    /// Event: release refused
    Refused { request: u64 },
}

#[derive(Debug, Clone, Default)]
struct SlotState {
    next: u32,
    taken: Vec<u32>,
}

#[derive(Clone)]
struct SlotReducer;

impl Reducer for SlotReducer {
    type State = SlotState;
    type Action = SlotAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SlotAction::Claim { request } => {
                state.next += 1;
                smallvec![Effect::send(SlotAction::Claimed {
                    request,
                    slot: state.next,
                })]
            },
            SlotAction::Release { request, slot } => {
                if state.taken.contains(&slot) {
                    smallvec![Effect::send(SlotAction::Released { request, slot })]
                } else {
                    smallvec![Effect::send(SlotAction::Refused { request })]
                }
            },
            SlotAction::Claimed { slot, .. } => {
                state.taken.push(slot);
                smallvec![Effect::None]
            },
            SlotAction::Released { slot, .. } => {
                state.taken.retain(|taken| *taken != slot);
                smallvec![Effect::None]
            },
            SlotAction::Refused { .. } => smallvec![Effect::None],
        }
    }
}

fn store() -> Arc<Store<SlotState, SlotAction, (), SlotReducer>> {
    Arc::new(Store::new(SlotState::default(), SlotReducer, ()))
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn outcome_is_applied_before_it_is_observed() {
    let store = store();

    let outcome = store
        .send_and_wait_for(
            SlotAction::Claim { request: 1 },
            |a| matches!(a, SlotAction::Claimed { request: 1, .. }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(outcome, SlotAction::Claimed { request: 1, slot: 1 });
    assert_eq!(store.state(|s| s.taken.clone()).await, vec![1]);
}

#[tokio::test]
async fn refusal_is_an_outcome_too() {
    let store = store();

    let outcome = store
        .send_and_wait_for(
            SlotAction::Release { request: 7, slot: 3 },
            |a| {
                matches!(
                    a,
                    SlotAction::Released { request: 7, .. } | SlotAction::Refused { request: 7 }
                )
            },
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(outcome, SlotAction::Refused { request: 7 });
}

#[tokio::test]
async fn concurrent_requests_only_see_their_own_outcome() {
    let store = store();

    let handles: Vec<_> = (1..=8)
        .map(|request| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .send_and_wait_for(
                        SlotAction::Claim { request },
                        move |a| matches!(a, SlotAction::Claimed { request: r, .. } if *r == request),
                        Duration::from_secs(2),
                    )
                    .await
            })
        })
        .collect();

    let mut slots = Vec::new();
    for handle in handles {
        match handle.await.expect("task panicked").unwrap() {
            SlotAction::Claimed { slot, .. } => slots.push(slot),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    slots.sort_unstable();
    assert_eq!(slots, (1..=8).collect::<Vec<_>>());
    assert_eq!(store.state(|s| s.taken.len()).await, 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_request_gets_its_outcome_under_load() {
    // A one-slot broadcast and an observer that never reads: observers lag,
    // waiting requests must not.
    let store = Arc::new(Store::with_config(
        SlotState::default(),
        SlotReducer,
        (),
        StoreConfig::default().with_broadcast_capacity(1),
    ));
    let _idle_observer = store.subscribe_actions();

    let mut requests = tokio::task::JoinSet::new();
    for request in 1..=400 {
        let store = Arc::clone(&store);
        requests.spawn(async move {
            store
                .send_and_wait_for(
                    SlotAction::Claim { request },
                    move |a| matches!(a, SlotAction::Claimed { request: r, .. } if *r == request),
                    Duration::from_secs(5),
                )
                .await
        });
    }

    let mut answered = 0;
    while let Some(result) = requests.join_next().await {
        let outcome = result.expect("task panicked").unwrap();
        assert!(matches!(outcome, SlotAction::Claimed { .. }));
        answered += 1;
    }

    assert_eq!(answered, 400);
    assert_eq!(store.state(|s| s.taken.len()).await, 400);
}

#[tokio::test]
async fn abandoned_waiters_do_not_block_later_requests() {
    let store = store();

    // Nothing ever answers request 9 with `Released`, so this one times out
    let result = store
        .send_and_wait_for(
            SlotAction::Claim { request: 9 },
            |a| matches!(a, SlotAction::Released { request: 9, .. }),
            Duration::from_millis(30),
        )
        .await;
    assert!(matches!(result, Err(StoreError::Timeout)));

    let outcome = store
        .send_and_wait_for(
            SlotAction::Claim { request: 10 },
            |a| matches!(a, SlotAction::Claimed { request: 10, .. }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();
    assert_eq!(outcome, SlotAction::Claimed { request: 10, slot: 2 });
}

#[tokio::test]
async fn subscribers_receive_fed_back_actions_in_order() {
    let store = store();
    let mut rx = store.subscribe_actions();

    store.send(SlotAction::Claim { request: 1 }).await.unwrap();
    let claimed = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(claimed, SlotAction::Claimed { request: 1, slot: 1 });

    store
        .send(SlotAction::Release { request: 2, slot: 1 })
        .await
        .unwrap();
    let released = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(released, SlotAction::Released { request: 2, slot: 1 });
}

#[tokio::test]
async fn waiting_fails_fast_after_shutdown() {
    let store = store();
    store.shutdown(Duration::from_secs(1)).await.unwrap();

    let result = store
        .send_and_wait_for(
            SlotAction::Claim { request: 1 },
            |_| true,
            Duration::from_secs(1),
        )
        .await;

    assert!(matches!(result, Err(StoreError::ShutdownInProgress)));
}
