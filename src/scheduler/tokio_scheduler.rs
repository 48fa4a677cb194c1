use super::{Duration, OnceTask, RepeatTask, Scheduler, TaskHandle};
use tokio::runtime::Handle;

/// Spawns tasks onto a tokio runtime; timers use `tokio::time`.
#[derive(Clone, Debug)]
pub struct TokioScheduler(Handle);

impl TokioScheduler {
  pub fn new(handle: Handle) -> Self { TokioScheduler(handle) }

  /// The runtime the caller is running on.
  ///
  /// # Panics
  ///
  /// Panics when called outside a tokio runtime.
  pub fn current() -> Self { TokioScheduler(Handle::current()) }
}

impl Scheduler for TokioScheduler {
  fn schedule(&self, task: OnceTask, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::default();
    let guard = handle.clone();
    let join = self.0.spawn(async move {
      if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
      }
      if !guard.is_cancelled() {
        task.run();
      }
      guard.mark_finished();
    });
    handle.set_canceller(move || join.abort());
    handle
  }

  fn schedule_repeating(&self, mut task: RepeatTask, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::default();
    let guard = handle.clone();
    let join = self.0.spawn(async move {
      let mut wait = delay.unwrap_or_else(|| task.period());
      loop {
        tokio::time::sleep(wait).await;
        if guard.is_cancelled() || !task.tick() {
          break;
        }
        wait = task.period();
      }
      guard.mark_finished();
    });
    handle.set_canceller(move || join.abort());
    handle
  }
}
