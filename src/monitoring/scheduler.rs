//! Cancellable repeating tasks for the monitoring loops.
//!
//! Each loop sleeps, runs its tick, and checks a shutdown signal. A tick
//! in flight when shutdown arrives is never cancelled mid-way; `stop`
//! waits for it to finish before returning, so no writes dangle past
//! shutdown.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

pub struct TaskHandle {
    name: &'static str,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl TaskHandle {
    /// Signals the loop to stop and waits for any in-flight tick.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            debug!(task = self.name, error = %e, "repeating task join failed");
        }
    }
}

/// Spawns a loop that waits `interval()` then runs `tick()`, forever.
///
/// The interval is re-evaluated every iteration, which is how the health
/// loop adapts its cadence to memory pressure.
pub fn spawn_repeating<I, F, Fut>(name: &'static str, mut interval: I, mut tick: F) -> TaskHandle
where
    I: FnMut() -> Duration + Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let (shutdown, mut stopped) = watch::channel(false);
    let handle = tokio::spawn(async move {
        loop {
            let delay = interval();
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    tick().await;
                }
                _ = stopped.changed() => {
                    break;
                }
            }
            if *stopped.borrow() {
                break;
            }
        }
        debug!(task = name, "repeating task stopped");
    });
    TaskHandle {
        name,
        shutdown,
        handle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn ticks_fire_repeatedly_until_stopped() {
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();
        let task = spawn_repeating(
            "test",
            || Duration::from_millis(5),
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            },
        );
        tokio::time::sleep(Duration::from_millis(60)).await;
        task.stop().await;
        let seen = count.load(Ordering::SeqCst);
        assert!(seen >= 2, "expected several ticks, got {seen}");
    }

    #[tokio::test]
    async fn stop_waits_for_inflight_tick() {
        let finished = Arc::new(AtomicU32::new(0));
        let flag = finished.clone();
        let task = spawn_repeating(
            "slow-tick",
            || Duration::from_millis(1),
            move || {
                let flag = flag.clone();
                async move {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    flag.fetch_add(1, Ordering::SeqCst);
                }
            },
        );
        // Let the first tick start, then stop while it is running.
        tokio::time::sleep(Duration::from_millis(10)).await;
        task.stop().await;
        assert!(
            finished.load(Ordering::SeqCst) >= 1,
            "in-flight tick must complete before stop returns"
        );
    }

    #[tokio::test]
    async fn no_tick_after_stop() {
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();
        let task = spawn_repeating(
            "stoppable",
            || Duration::from_millis(5),
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            },
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
        task.stop().await;
        let at_stop = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), at_stop);
    }
}
