use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use comp_engine::spawn_periodic;
use tokio::sync::Notify;

#[tokio::test]
async fn periodic_job_runs_immediately_and_stops_on_shutdown() {
    let runs = Arc::new(AtomicUsize::new(0));
    let shutdown = Arc::new(Notify::new());

    let counter = runs.clone();
    let handle = spawn_periodic(Duration::from_millis(20), shutdown.clone(), move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    tokio::time::sleep(Duration::from_millis(90)).await;
    shutdown.notify_one();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("scheduler stopped")
        .expect("scheduler task");

    let total = runs.load(Ordering::SeqCst);
    assert!(total >= 2, "expected repeated runs, got {total}");

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(runs.load(Ordering::SeqCst), total);
}

#[tokio::test]
async fn shutdown_requested_during_a_run_is_honoured() {
    let shutdown = Arc::new(Notify::new());
    let signal = shutdown.clone();
    let handle = spawn_periodic(Duration::from_secs(3600), shutdown.clone(), move || {
        let signal = signal.clone();
        async move {
            signal.notify_one();
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    });

    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("scheduler stopped")
        .expect("scheduler task");
}
