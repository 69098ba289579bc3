//! Expiry Sweeper Task
//!
//! Background task that periodically removes idle cache entries.

use std::sync::Weak;
use std::thread;
use std::time::Duration;

use tokio::runtime::{Builder, Handle};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{CacheError, Result};

// == Sweepable ==
/// A store that supports a periodic maintenance pass.
pub trait Sweepable: Send + Sync + 'static {
    /// Runs one pass, returning the number of entries removed.
    ///
    /// May block; the sweeper runs it on Tokio's blocking pool.
    fn sweep(&self) -> Result<usize>;
}

#[derive(Debug)]
enum Worker {
    /// Task on a caller-supplied runtime.
    Task(JoinHandle<()>),
    /// Thread owning a private single-threaded runtime.
    Thread(thread::JoinHandle<()>),
}

// == Sweeper Handle ==
/// Owns a running sweeper.
///
/// The sweeper holds only a weak reference to its target and exits on the
/// first tick after the target is dropped. Dropping the handle cancels it
/// immediately.
#[derive(Debug)]
pub struct SweeperHandle {
    cancel: CancellationToken,
    worker: Option<Worker>,
}

impl SweeperHandle {
    /// Spawns a sweeper task on `runtime` that calls `target.sweep()` every
    /// `period`.
    ///
    /// The task dies with `runtime`. Use [`SweeperHandle::spawn_dedicated`]
    /// when the sweeper must outlive whichever runtime is current.
    ///
    /// # Example
    /// ```ignore
    /// let store = Arc::new(ExpiryStore::new(window));
    /// let sweeper = SweeperHandle::spawn(&Handle::current(), Arc::downgrade(&store), window);
    /// // Later, during shutdown:
    /// sweeper.stop().await;
    /// ```
    pub fn spawn<S: Sweepable>(runtime: &Handle, target: Weak<S>, period: Duration) -> Self {
        let cancel = CancellationToken::new();
        let task = runtime.spawn(run_sweeper(target, period, cancel.clone()));

        Self {
            cancel,
            worker: Some(Worker::Task(task)),
        }
    }

    /// Spawns a sweeper on its own thread with a private current-thread
    /// runtime. Works with or without an ambient Tokio runtime.
    pub fn spawn_dedicated<S: Sweepable>(target: Weak<S>, period: Duration) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|err| {
                CacheError::Configuration(format!("Failed to build sweeper runtime: {}", err))
            })?;

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let thread = thread::Builder::new()
            .name("cache-expiry-sweeper".to_string())
            .spawn(move || runtime.block_on(run_sweeper(target, period, token)))
            .map_err(|err| {
                CacheError::Configuration(format!("Failed to start sweeper thread: {}", err))
            })?;

        Ok(Self {
            cancel,
            worker: Some(Worker::Thread(thread)),
        })
    }

    /// Signals the sweeper to exit without waiting for it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once the sweeper has exited, whether cancelled, orphaned or
    /// torn down with its runtime.
    pub fn is_finished(&self) -> bool {
        match &self.worker {
            Some(Worker::Task(task)) => task.is_finished(),
            Some(Worker::Thread(thread)) => thread.is_finished(),
            None => true,
        }
    }

    /// Cancels the sweeper and waits for it to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        match self.worker.take() {
            Some(Worker::Task(task)) => {
                if let Err(err) = task.await {
                    warn!(error = %err, "Expiry sweeper ended abnormally");
                }
            }
            Some(Worker::Thread(thread)) => {
                match tokio::task::spawn_blocking(move || thread.join()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(_)) => warn!("Expiry sweeper thread panicked"),
                    Err(err) => warn!(error = %err, "Failed to join expiry sweeper thread"),
                }
            }
            None => {}
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Warns when the sweeper future is dropped without being asked to stop,
/// which happens when its runtime shuts down underneath it.
struct ExitWatch {
    cancel: CancellationToken,
    exited: bool,
}

impl Drop for ExitWatch {
    fn drop(&mut self) {
        if !self.exited && !self.cancel.is_cancelled() {
            warn!("Expiry sweeper torn down with its runtime, idle entries will no longer expire");
        }
    }
}

async fn run_sweeper<S: Sweepable>(target: Weak<S>, period: Duration, cancel: CancellationToken) {
    let mut watch = ExitWatch {
        cancel: cancel.clone(),
        exited: false,
    };
    info!(
        period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
        "Starting expiry sweeper"
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Expiry sweeper cancelled");
                break;
            }
            _ = tokio::time::sleep(period) => {}
        }

        let Some(target) = target.upgrade() else {
            debug!("Cache dropped, stopping expiry sweeper");
            break;
        };

        // The sweep may wait on a blocking lock; keep it off the async workers
        match tokio::task::spawn_blocking(move || target.sweep()).await {
            Ok(Ok(removed)) if removed > 0 => {
                info!(removed, "Expiry sweep removed idle entries");
            }
            Ok(Ok(_)) => debug!("Expiry sweep: no idle entries found"),
            Ok(Err(err)) => warn!(error = %err, "Expiry sweep failed, retrying on next tick"),
            Err(err) => warn!(error = %err, "Expiry sweep task failed, retrying on next tick"),
        }
    }

    watch.exited = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const PERIOD: Duration = Duration::from_millis(100);

    #[derive(Default)]
    struct CountingSweep {
        runs: AtomicUsize,
        failures_left: AtomicUsize,
    }

    impl CountingSweep {
        fn failing(times: usize) -> Self {
            Self {
                runs: AtomicUsize::new(0),
                failures_left: AtomicUsize::new(times),
            }
        }

        fn runs(&self) -> usize {
            self.runs.load(Ordering::SeqCst)
        }
    }

    impl Sweepable for CountingSweep {
        fn sweep(&self) -> Result<usize> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            let failing = self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(CacheError::LockTimeout("test".to_string()));
            }
            Ok(0)
        }
    }

    fn current_thread_runtime() -> tokio::runtime::Runtime {
        Builder::new_current_thread().enable_all().build().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_every_period() {
        let target = Arc::new(CountingSweep::default());
        let handle = SweeperHandle::spawn(&Handle::current(), Arc::downgrade(&target), PERIOD);

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(target.runs(), 3);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_continues_after_failure() {
        let target = Arc::new(CountingSweep::failing(2));
        let handle = SweeperHandle::spawn(&Handle::current(), Arc::downgrade(&target), PERIOD);

        tokio::time::sleep(Duration::from_millis(450)).await;
        assert_eq!(target.runs(), 4, "Failed sweeps must not stop the loop");
        assert!(!handle.is_finished());

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_stop_joins_task() {
        let target = Arc::new(CountingSweep::default());
        let handle = SweeperHandle::spawn(&Handle::current(), Arc::downgrade(&target), PERIOD);

        handle.stop().await;

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(target.runs(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_cancels_task() {
        let target = Arc::new(CountingSweep::default());
        let handle = SweeperHandle::spawn(&Handle::current(), Arc::downgrade(&target), PERIOD);

        drop(handle);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(target.runs(), 0, "Cancelled sweeper should never run");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_exits_when_target_dropped() {
        let target = Arc::new(CountingSweep::default());
        let handle = SweeperHandle::spawn(&Handle::current(), Arc::downgrade(&target), PERIOD);

        drop(target);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(handle.is_finished(), "Sweeper should exit once its cache is gone");
    }

    #[test]
    fn test_task_sweeper_finished_after_runtime_shutdown() {
        let target = Arc::new(CountingSweep::default());
        let runtime = current_thread_runtime();
        let handle = SweeperHandle::spawn(runtime.handle(), Arc::downgrade(&target), PERIOD);
        assert!(!handle.is_finished());

        drop(runtime);

        assert!(handle.is_finished(), "Runtime shutdown must be observable");
    }

    #[test]
    fn test_dedicated_sweeper_outlives_creating_runtime() {
        let target = Arc::new(CountingSweep::default());
        let runtime = current_thread_runtime();
        let handle = runtime
            .block_on(async {
                SweeperHandle::spawn_dedicated(Arc::downgrade(&target), Duration::from_millis(10))
            })
            .unwrap();

        drop(runtime);
        thread::sleep(Duration::from_millis(200));

        assert!(target.runs() >= 2, "Sweeper ran {} times", target.runs());
        assert!(!handle.is_finished());
    }

    #[test]
    fn test_dedicated_sweeper_cancel_ends_thread() {
        let target = Arc::new(CountingSweep::default());
        let handle =
            SweeperHandle::spawn_dedicated(Arc::downgrade(&target), Duration::from_millis(10))
                .unwrap();

        handle.cancel();
        thread::sleep(Duration::from_millis(100));

        assert!(handle.is_finished());
    }

    #[tokio::test]
    async fn test_dedicated_sweeper_stop_joins_thread() {
        let target = Arc::new(CountingSweep::default());
        let handle =
            SweeperHandle::spawn_dedicated(Arc::downgrade(&target), Duration::from_millis(10))
                .unwrap();

        handle.stop().await;
        let runs = target.runs();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(target.runs(), runs, "No sweep may run after stop returns");
    }
}
