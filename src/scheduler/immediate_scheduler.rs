use super::{Duration, OnceTask, RepeatTask, Scheduler, TaskHandle};
use std::thread;

/// Runs every task inline on the calling thread.
///
/// Delays block the caller with `thread::sleep`. A repeating task keeps the
/// caller busy until the task itself reports it is done (for example because
/// a downstream `take` finished), so the returned handle is always finished.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  fn schedule(&self, task: OnceTask, delay: Option<Duration>) -> TaskHandle {
    if let Some(delay) = delay {
      thread::sleep(delay);
    }
    task.run();
    TaskHandle::finished()
  }

  fn schedule_repeating(&self, mut task: RepeatTask, delay: Option<Duration>) -> TaskHandle {
    let mut wait = delay.unwrap_or_else(|| task.period());
    loop {
      thread::sleep(wait);
      if !task.tick() {
        break;
      }
      wait = task.period();
    }
    TaskHandle::finished()
  }
}
