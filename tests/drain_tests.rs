//! Queue lifecycle tests: drain cleanup, key reuse, and introspection.
//!
//! The registry entry for a key must disappear as soon as its last task
//! settles and the runner's bookkeeping completes. These tests assert the
//! *eventual* drained state, allowing pending continuations to run, as the
//! cleanup races the submitter's own wake-up.

use synq::{KeyedSerializer, SerializationKey};
use tokio::sync::oneshot;
use tokio::task::yield_now;

/// Yields until the registry drains; bounded so a stuck queue fails the
/// test instead of hanging it.
async fn wait_idle<K: SerializationKey>(serializer: &KeyedSerializer<K>) {
    for _ in 0..1000 {
        if serializer.is_idle() {
            return;
        }
        yield_now().await;
    }
    panic!("serializer did not drain");
}

/// Yields until `condition` holds, bounded like [`wait_idle`].
async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        yield_now().await;
    }
    panic!("condition never held");
}

#[tokio::test]
async fn registry_entry_removed_after_drain() {
    let serializer = KeyedSerializer::new();

    let first = serializer.submit("key", || async { 1 });
    let second = serializer.submit("key", || async { 2 });
    assert!(serializer.is_active(&"key"));

    first.await.unwrap();
    second.await.unwrap();

    wait_idle(&serializer).await;
    assert!(!serializer.is_active(&"key"));
    assert_eq!(serializer.queue_depth(&"key"), 0);
}

#[tokio::test]
async fn drained_key_reuse_behaves_like_first_use() {
    let serializer = KeyedSerializer::new();

    serializer.submit("key", || async {}).await.unwrap();
    wait_idle(&serializer).await;

    // Fresh queue, immediate start, exactly as if the key had never been
    // submitted under.
    let again = serializer.submit("key", || async { "second round" });
    assert_eq!(again.position(), 0);
    assert_eq!(serializer.queue_depth(&"key"), 1);
    assert_eq!(again.await.unwrap(), "second round");
    wait_idle(&serializer).await;
}

#[tokio::test]
async fn depth_counts_the_running_task_and_the_backlog() {
    let serializer = KeyedSerializer::new();
    let (release, gate) = oneshot::channel::<()>();

    let first = serializer.submit("key", move || async move {
        let _ = gate.await;
    });
    let second = serializer.submit("key", || async {});
    let third = serializer.submit("key", || async {});

    assert_eq!(first.position(), 0);
    assert_eq!(second.position(), 1);
    assert_eq!(third.position(), 2);

    // Once the runner picks up the first task it is running but still
    // counted; the other two are queued behind it.
    eventually(|| serializer.is_running(&"key")).await;
    assert_eq!(serializer.queue_depth(&"key"), 3);

    release.send(()).unwrap();
    first.await.unwrap();
    second.await.unwrap();
    third.await.unwrap();

    wait_idle(&serializer).await;
    assert!(!serializer.is_running(&"key"));
}

#[tokio::test]
async fn dropping_a_submission_does_not_cancel_the_task() {
    let serializer = KeyedSerializer::new();
    let (ran_tx, ran_rx) = oneshot::channel();

    let submission = serializer.submit("key", move || async move {
        let _ = ran_tx.send(());
    });
    drop(submission);

    // The task keeps its queue slot and runs regardless of observers.
    ran_rx.await.expect("operation still ran");
    wait_idle(&serializer).await;
}

#[tokio::test]
async fn queues_for_different_keys_drain_independently() {
    let serializer = KeyedSerializer::new();
    let (release, gate) = oneshot::channel::<()>();

    let held = serializer.submit("held", move || async move {
        let _ = gate.await;
    });
    let free = serializer.submit("free", || async {});

    free.await.unwrap();
    eventually(|| !serializer.is_active(&"free")).await;

    // Draining one key leaves the other's queue untouched.
    assert!(serializer.is_active(&"held"));
    assert_eq!(serializer.queue_depth(&"held"), 1);

    release.send(()).unwrap();
    held.await.unwrap();
    wait_idle(&serializer).await;
}
