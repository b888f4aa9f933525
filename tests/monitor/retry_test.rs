//! Tests for `src/notifier.rs` — delivery retry and backoff behaviour.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use interview_notify::notifier::{Notification, Notifier, NotifyError};

use crate::support::{spawn_stalling_stub, spawn_stub};

fn notification() -> Notification {
    Notification {
        title: "Your turn to interview".to_owned(),
        message: "<Gatekeeper> myNick: you're up".to_owned(),
        priority: 5,
        tags: "rotating_light".to_owned(),
    }
}

fn notifier(url: &str, max_attempts: u32, shutdown: Arc<AtomicBool>) -> Notifier {
    Notifier::new(url, "test-topic", max_attempts, Duration::from_millis(10), shutdown)
}

#[tokio::test]
async fn succeeds_on_third_attempt_after_two_failures() {
    let stub = spawn_stub(2).await;
    let n = notifier(&stub.url, 3, Arc::new(AtomicBool::new(false)));

    let result = n.send(&notification()).await;
    assert!(result.is_ok());
    assert_eq!(stub.hits(), 3, "exactly three HTTP attempts expected");
}

#[tokio::test]
async fn first_attempt_success_makes_one_request() {
    let stub = spawn_stub(0).await;
    let n = notifier(&stub.url, 3, Arc::new(AtomicBool::new(false)));

    n.send(&notification()).await.expect("delivery");
    assert_eq!(stub.hits(), 1);
}

#[tokio::test]
async fn exhausted_retries_report_failure_and_stop() {
    let stub = spawn_stub(usize::MAX).await;
    let n = notifier(&stub.url, 3, Arc::new(AtomicBool::new(false)));

    let err = n.send(&notification()).await.expect_err("should exhaust");
    assert!(matches!(err, NotifyError::Exhausted { attempts: 3, .. }));
    assert_eq!(stub.hits(), 3);
}

#[tokio::test]
async fn shutdown_aborts_backoff_between_attempts() {
    let stub = spawn_stub(usize::MAX).await;
    let shutdown = Arc::new(AtomicBool::new(false));
    shutdown.store(true, Ordering::Relaxed);
    let n = notifier(&stub.url, 3, Arc::clone(&shutdown));

    let err = n.send(&notification()).await.expect_err("should abort");
    assert!(matches!(err, NotifyError::Interrupted));
    assert_eq!(stub.hits(), 1, "no retry after shutdown was requested");
}

#[tokio::test]
async fn shutdown_during_backoff_prevents_next_attempt() {
    let failing = spawn_stub(usize::MAX).await;
    let shutdown = Arc::new(AtomicBool::new(false));
    let n = Notifier::new(
        &failing.url,
        "test-topic",
        3,
        Duration::from_millis(200),
        Arc::clone(&shutdown),
    );

    // The flag flips while the first backoff sleep is in progress.
    let setter = Arc::clone(&shutdown);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        setter.store(true, Ordering::Relaxed);
    });

    let err = n.send(&notification()).await.expect_err("should abort");
    assert!(matches!(err, NotifyError::Interrupted));
    assert_eq!(failing.hits(), 1, "no further attempt after the backoff");
}

#[tokio::test]
async fn stalled_endpoint_times_out_instead_of_hanging() {
    let stub = spawn_stalling_stub().await;
    let n = notifier(&stub.url, 1, Arc::new(AtomicBool::new(false)));

    // Bounded by the client's request timeout, well under this ceiling.
    let result = tokio::time::timeout(Duration::from_secs(20), n.send(&notification()))
        .await
        .expect("a wedged endpoint must time out, not hang the loop");
    let err = result.expect_err("should fail");
    assert!(matches!(err, NotifyError::Exhausted { attempts: 1, .. }));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    // Nothing listens here; connection is refused immediately.
    let n = notifier(
        "http://127.0.0.1:1",
        1,
        Arc::new(AtomicBool::new(false)),
    );
    let err = n.send(&notification()).await.expect_err("should fail");
    assert!(matches!(err, NotifyError::Exhausted { attempts: 1, .. }));
}
