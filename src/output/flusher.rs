//! Periodic flush task
//!
//! One background task drives the drain-and-write action on a fixed
//! period, decoupled from the host's timeline. The contract that matters:
//! `stop` does not return before an in-flight tick completes, and no tick
//! starts after it returns.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle to a recurring flush task.
///
/// Stopping consumes the handle, so a second stop is unrepresentable here;
/// the output's lifecycle state reports it to callers instead.
#[derive(Debug)]
pub struct PeriodicFlusher {
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

impl PeriodicFlusher {
    /// Spawn the recurring task. The first tick fires one period after
    /// start, then every period.
    pub fn start<F>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();

        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => tick(),
                    _ = token.cancelled() => {
                        debug!("Flush task shutting down");
                        break;
                    }
                }
            }
        });

        Self { shutdown, handle }
    }

    /// Stop the recurring task.
    ///
    /// The task only observes cancellation between ticks, so awaiting the
    /// join handle is the completion barrier for any tick in flight.
    pub async fn stop(self) {
        self.shutdown.cancel();
        if let Err(e) = self.handle.await {
            if e.is_panic() {
                std::panic::resume_unwind(e.into_panic());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stop_waits_for_in_flight_tick() {
        let entered = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));

        let flusher = {
            let entered = Arc::clone(&entered);
            let finished = Arc::clone(&finished);
            PeriodicFlusher::start(Duration::from_millis(10), move || {
                entered.store(true, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(100));
                finished.store(true, Ordering::SeqCst);
            })
        };

        // Wait until a tick is definitely executing.
        while !entered.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        flusher.stop().await;
        assert!(
            finished.load(Ordering::SeqCst),
            "stop returned while a tick was still executing"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_no_ticks_after_stop() {
        let count = Arc::new(AtomicUsize::new(0));

        let flusher = {
            let count = Arc::clone(&count);
            PeriodicFlusher::start(Duration::from_millis(10), move || {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };

        tokio::time::sleep(Duration::from_millis(35)).await;
        flusher.stop().await;

        let at_stop = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), at_stop);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_ticks_fire_on_schedule() {
        let count = Arc::new(AtomicUsize::new(0));

        let flusher = {
            let count = Arc::clone(&count);
            PeriodicFlusher::start(Duration::from_millis(10), move || {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        flusher.stop().await;

        assert!(count.load(Ordering::SeqCst) >= 3);
    }
}
