use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Runs `job` right away and then once per `period` until `shutdown` is
/// notified. Signal with `notify_one` so a request made while a job is running
/// is still seen once it finishes. Runs never overlap.
pub fn spawn_periodic<F, Fut>(period: Duration, shutdown: Arc<Notify>, mut job: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period.max(MIN_PERIOD));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut runs: u64 = 0;
        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    engine_info!("Periodic task stopped after {} runs", runs);
                    break;
                }
                _ = ticker.tick() => {
                    runs += 1;
                    engine_debug!("Periodic task run {}", runs);
                    job().await;
                }
            }
        }
    })
}
