//! Integration tests for StateManager with state change events
//!
//! These tests verify that the StateManager correctly:
//! - Emits run lifecycle events in order
//! - Supports multiple subscribers
//! - Handles concurrent access from multiple tasks
//! - Lets a listener follow a batch run driven from another thread

use area_selector::models::TaskStatus;
use area_selector::{StateChange, StateManager};
use std::sync::Arc;
use tokio::time::{Duration, timeout};

async fn next_event(rx: &mut tokio::sync::broadcast::Receiver<StateChange>) -> StateChange {
    timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed")
}

#[tokio::test]
async fn test_run_started_event_emitted() {
    let state = Arc::new(StateManager::new());
    let mut rx = state.subscribe();

    state.start_run(vec!["/a/x_C2.tif".to_string(), "/a/y_C2.tif".to_string()]);

    let event = next_event(&mut rx).await;
    assert!(
        matches!(event, StateChange::RunStarted { total_tasks: 2 }),
        "Expected RunStarted event, got: {:?}",
        event
    );
}

#[tokio::test]
async fn test_multiple_subscribers_receive_events() {
    let state = Arc::new(StateManager::new());
    let mut rx1 = state.subscribe();
    let mut rx2 = state.subscribe();

    state.request_stop();

    assert_eq!(next_event(&mut rx1).await, StateChange::StopRequested);
    assert_eq!(next_event(&mut rx2).await, StateChange::StopRequested);
}

#[tokio::test]
async fn test_full_run_event_sequence() {
    let state = Arc::new(StateManager::new());
    let mut rx = state.subscribe();

    state.start_run(vec!["/a/x_C2.tif".to_string()]);
    state.update_progress("/a/x_C2.tif".to_string(), "Processing 1/1".to_string());
    state.add_task_result(
        "/a/x_C2.tif".to_string(),
        TaskStatus::Completed,
        "saved 1 region(s)".to_string(),
    );
    state.finish_run();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert!(matches!(events.first(), Some(StateChange::RunStarted { .. })));
    assert!(events.iter().any(|e| matches!(
        e,
        StateChange::TaskProcessed {
            status: TaskStatus::Completed,
            ..
        }
    )));
    assert!(events.contains(&StateChange::RunFinished {
        completed: 1,
        skipped: 0,
        failed: 0,
    }));

    let started = events
        .iter()
        .position(|e| matches!(e, StateChange::RunStarted { .. }))
        .unwrap();
    let finished = events
        .iter()
        .position(|e| matches!(e, StateChange::RunFinished { .. }))
        .unwrap();
    assert!(started < finished);
}

#[tokio::test]
async fn test_listener_follows_run_on_another_thread() {
    let state = Arc::new(StateManager::new());
    let mut rx = state.subscribe();

    let worker_state = state.clone();
    let worker = std::thread::spawn(move || {
        worker_state.start_run(vec!["/a/1_C2.tif".to_string(), "/a/2_C2.tif".to_string()]);
        worker_state.add_task_result("/a/1_C2.tif".into(), TaskStatus::Skipped, "no region drawn".into());
        worker_state.add_task_result("/a/2_C2.tif".into(), TaskStatus::Failed, "disk full".into());
        worker_state.finish_run();
    });

    let mut processed = 0;
    loop {
        match next_event(&mut rx).await {
            StateChange::TaskProcessed { .. } => processed += 1,
            StateChange::RunFinished {
                completed,
                skipped,
                failed,
            } => {
                assert_eq!((completed, skipped, failed), (0, 1, 1));
                break;
            }
            _ => {}
        }
    }

    worker.join().unwrap();
    assert_eq!(processed, 2);
}

#[tokio::test]
async fn test_concurrent_state_access() {
    let state = Arc::new(StateManager::new());

    let mut handles = vec![];
    for i in 0..10 {
        let state_clone = state.clone();
        handles.push(tokio::spawn(async move {
            state_clone.add_task_result(format!("/a/{i}_C2.tif"), TaskStatus::Completed, String::new());
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    let snapshot = state.snapshot();
    assert_eq!(snapshot.progress, 10);
    assert_eq!(snapshot.completed_tasks.len(), 10);
}

#[tokio::test]
async fn test_reset_after_run() {
    let state = Arc::new(StateManager::new());
    state.start_run(vec!["/a/x_C2.tif".to_string()]);
    state.add_task_result("/a/x_C2.tif".into(), TaskStatus::Completed, "ok".into());
    state.finish_run();

    let mut rx = state.subscribe();
    state.reset_run_state();

    let mut saw_reset = false;
    while let Ok(event) = rx.try_recv() {
        saw_reset |= event == StateChange::StateReset;
    }
    assert!(saw_reset);
    assert_eq!(state.snapshot().run_stats(), (0, 0, 0, 0));
}
