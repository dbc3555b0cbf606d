//! Session Concurrency Tests
//!
//! - Concurrent submissions never lose an update
//! - Broadcasts follow mutation order
//! - Readers always see a consistent dataset/model pair
//! - Reset is atomic
//! - Simultaneous joins announce counts in registration order

use std::sync::{Arc, Barrier};
use std::thread;

use serde_json::json;

use teachmachine::session::{MemoryBroadcast, SessionEvent, SessionState};
use teachmachine::training::{ExampleSubmission, FeaturesSubmission, TrainingError};

// =============================================================================
// Helper Functions
// =============================================================================

fn session() -> (Arc<SessionState>, Arc<MemoryBroadcast>) {
    let broadcast = Arc::new(MemoryBroadcast::new());
    (Arc::new(SessionState::new(broadcast.clone())), broadcast)
}

fn submission(i: usize) -> ExampleSubmission {
    serde_json::from_value(json!({
        "age": 20 + (i % 50),
        "income": 1000 * (i % 90),
        "has_protected_attribute": i % 3 == 0,
        "label": i % 2 == 0,
    }))
    .unwrap()
}

fn features() -> FeaturesSubmission {
    serde_json::from_value(json!({
        "age": 35,
        "income": 30000,
        "has_protected_attribute": false,
    }))
    .unwrap()
}

fn update_sizes(broadcast: &MemoryBroadcast) -> Vec<usize> {
    broadcast
        .events()
        .into_iter()
        .filter_map(|event| match event {
            SessionEvent::DatasetUpdate { size, .. } => Some(size),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Serialization of Submissions
// =============================================================================

/// Two simultaneous submissions on N examples end with N+2 and a model
/// trained on all N+2.
#[test]
fn test_two_concurrent_submissions() {
    const N: usize = 10;
    let (state, _) = session();
    for i in 0..N {
        state.submit_example("seed", &submission(i)).unwrap();
    }

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|t| {
            let state = Arc::clone(&state);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                state
                    .submit_example(&format!("conn-{}", t), &submission(N + t))
                    .unwrap()
            })
        })
        .collect();

    let mut sizes: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap().size).collect();
    sizes.sort();
    assert_eq!(sizes, vec![N + 1, N + 2]);

    let (size, model) = state.model().unwrap();
    assert_eq!(size, N + 2);
    assert_eq!(model.unwrap().trained_on, N + 2);
}

/// Every accepted example produces exactly one broadcast, in size order.
#[test]
fn test_broadcast_order_matches_mutations() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 25;
    let (state, broadcast) = session();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    state
                        .submit_example(&format!("conn-{}", t), &submission(t * PER_THREAD + i))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let total = THREADS * PER_THREAD;
    assert_eq!(state.dataset_size().unwrap(), total);
    assert_eq!(update_sizes(&broadcast), (1..=total).collect::<Vec<_>>());
    assert_eq!(state.metrics().snapshot().retrains, total as u64);
}

// =============================================================================
// Consistent Reads
// =============================================================================

/// Readers racing writers and resets never see a model that does not match
/// the dataset it was read with.
#[test]
fn test_reads_are_never_torn() {
    let (state, _) = session();

    let writer = {
        let state = Arc::clone(&state);
        thread::spawn(move || {
            for i in 0..300 {
                state.submit_example("writer", &submission(i)).unwrap();
                if i % 50 == 49 {
                    state.reset("writer").unwrap();
                }
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                for _ in 0..500 {
                    let (size, model) = state.model().unwrap();
                    match model {
                        Some(model) => assert_eq!(model.trained_on, size),
                        None => assert_eq!(size, 0),
                    }
                    match state.predict(&features()) {
                        Ok(_) | Err(TrainingError::ModelNotTrained) => {}
                        Err(e) => panic!("unexpected prediction error: {}", e),
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}

// =============================================================================
// Reset
// =============================================================================

#[test]
fn test_reset_after_training() {
    let (state, broadcast) = session();
    state.submit_example("a", &submission(0)).unwrap();
    assert!(state.predict(&features()).is_ok());

    state.reset("a").unwrap();

    assert_eq!(state.dataset_size().unwrap(), 0);
    assert_eq!(state.predict(&features()), Err(TrainingError::ModelNotTrained));
    assert!(matches!(
        broadcast.events().last(),
        Some(SessionEvent::ResetDone { .. })
    ));

    // Training starts over from an empty dataset.
    let update = state.submit_example("a", &submission(2)).unwrap();
    assert_eq!(update.size, 1);
}

// =============================================================================
// Presence
// =============================================================================

/// Joins racing each other announce counts 1..=N in order, so the last
/// `user_joined` everyone sees carries the live count.
#[test]
fn test_concurrent_joins_announce_counts_in_order() {
    const PLAYERS: usize = 8;

    for _ in 0..50 {
        let (state, broadcast) = session();
        let barrier = Arc::new(Barrier::new(PLAYERS));

        let handles: Vec<_> = (0..PLAYERS)
            .map(|i| {
                let state = Arc::clone(&state);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    state.join(&format!("conn-{}", i), &format!("player-{}", i)).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let counts: Vec<usize> = broadcast
            .events()
            .into_iter()
            .filter_map(|event| match event {
                SessionEvent::UserJoined { total_players, .. } => Some(total_players),
                _ => None,
            })
            .collect();

        assert_eq!(counts, (1..=PLAYERS).collect::<Vec<_>>());
        assert_eq!(state.participants().count(), PLAYERS);
    }
}
