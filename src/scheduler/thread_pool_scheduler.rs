use super::{Duration, OnceTask, RepeatTask, Scheduler, TaskHandle};
use crate::error::RxError;
use futures::{
  executor::{ThreadPool, ThreadPoolBuilder},
  future::{AbortHandle, Abortable},
  Future, FutureExt,
};
use futures_time::task::sleep;
use once_cell::sync::Lazy;

const THREAD_NAME_PREFIX: &str = "rxlite-worker-";

/// The process-wide pool behind `ThreadPoolScheduler::shared()`, created on
/// first use and shared by every subscription that asks for it.
static SHARED_POOL: Lazy<Result<ThreadPool, String>> = Lazy::new(|| {
  ThreadPoolBuilder::new()
    .name_prefix(THREAD_NAME_PREFIX)
    .create()
    .map_err(|err| err.to_string())
});

/// Runs tasks on a futures `ThreadPool`; delays and periods are timed with
/// `futures-time`.
///
/// Admission policy: the pool queue is unbounded. Scheduling never fails or
/// blocks; when every worker is busy, new tasks wait in the queue, so one
/// subscription can only delay another through worker contention.
#[derive(Clone)]
pub struct ThreadPoolScheduler {
  pool: ThreadPool,
}

impl ThreadPoolScheduler {
  /// A scheduler on the process-wide pool (one worker per CPU).
  ///
  /// # Panics
  ///
  /// Panics if the process-wide pool could not be started. Use
  /// [`ThreadPoolScheduler::try_shared`] to handle that case.
  pub fn shared() -> Self {
    match Self::try_shared() {
      Ok(scheduler) => scheduler,
      Err(err) => panic!("{err}"),
    }
  }

  /// Like [`ThreadPoolScheduler::shared`], but reports a pool that failed to
  /// start as `RxError::Scheduler`.
  pub fn try_shared() -> Result<Self, RxError> {
    match &*SHARED_POOL {
      Ok(pool) => Ok(ThreadPoolScheduler { pool: pool.clone() }),
      Err(cause) => Err(RxError::Scheduler {
        message: format!("cannot start the shared worker pool: {cause}"),
        cause: None,
      }),
    }
  }

  /// A scheduler on a dedicated pool with `size` workers.
  pub fn with_pool_size(size: usize) -> Result<Self, RxError> {
    let pool = ThreadPoolBuilder::new()
      .pool_size(size)
      .name_prefix(THREAD_NAME_PREFIX)
      .create()
      .map_err(|err| {
        RxError::Scheduler { message: format!("cannot start {size} workers"), cause: None }
          .with_cause(err)
      })?;
    tracing::debug!(size, "started dedicated worker pool");
    Ok(ThreadPoolScheduler { pool })
  }

  fn spawn(&self, handle: &TaskHandle, future: impl Future<Output = ()> + Send + 'static) {
    let (abort, registration) = AbortHandle::new_pair();
    handle.set_canceller(move || abort.abort());
    self
      .pool
      .spawn_ok(Abortable::new(future, registration).map(|_| ()));
  }
}

impl Default for ThreadPoolScheduler {
  fn default() -> Self { Self::shared() }
}

impl Scheduler for ThreadPoolScheduler {
  fn schedule(&self, task: OnceTask, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::default();
    let guard = handle.clone();
    self.spawn(&handle, async move {
      if let Some(delay) = delay {
        sleep(delay.into()).await;
      }
      if !guard.is_cancelled() {
        task.run();
      }
      guard.mark_finished();
    });
    handle
  }

  fn schedule_repeating(&self, mut task: RepeatTask, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::default();
    let guard = handle.clone();
    self.spawn(&handle, async move {
      let mut wait = delay.unwrap_or_else(|| task.period());
      loop {
        sleep(wait.into()).await;
        if guard.is_cancelled() || !task.tick() {
          break;
        }
        wait = task.period();
      }
      guard.mark_finished();
    });
    handle
  }
}
