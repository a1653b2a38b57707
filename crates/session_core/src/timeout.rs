//! Single-shot session timeout with an explicit handle-returning API.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Handle for a running countdown. Dropping the handle detaches the
/// timer; only `cancel` prevents it from firing.
pub struct TimeoutHandle {
    task: JoinHandle<()>,
}

impl TimeoutHandle {
    /// Aborting the sleep task means firing and cancellation are
    /// mutually exclusive: a cancel before the deadline suppresses the
    /// fire entirely, a cancel after the fire is a no-op.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

pub struct TimeoutSupervisor;

impl TimeoutSupervisor {
    pub fn start<F>(duration: Duration, on_fire: F) -> TimeoutHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            on_fire.await;
        });
        TimeoutHandle { task }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn fires_once_after_duration() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let handle = TimeoutSupervisor::start(Duration::from_millis(20), async move {
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(fired.load(Ordering::SeqCst));
        assert!(handle.is_finished());
    }

    #[tokio::test]
    async fn cancel_before_deadline_suppresses_fire() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let handle = TimeoutSupervisor::start(Duration::from_millis(50), async move {
            flag.store(true, Ordering::SeqCst);
        });

        handle.cancel();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn cancel_after_fire_is_noop() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let handle = TimeoutSupervisor::start(Duration::from_millis(10), async move {
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(fired.load(Ordering::SeqCst));

        handle.cancel();
        assert!(fired.load(Ordering::SeqCst));
    }
}
