//! Virtual-time scheduler for deterministic tests of timed operators.
//!
//! Time only moves when the test says so. Tasks run synchronously on the
//! thread that advances the clock, in order of due time and, for equal due
//! times, in the order they were scheduled.
//!
//! # Usage
//!
//! ```rust
//! use rxlite::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! let scheduler = TestScheduler::default();
//! let seen = Arc::new(Mutex::new(vec![]));
//! let c_seen = seen.clone();
//! observable::of(42)
//!   .delay(Duration::from_millis(100), scheduler.clone())
//!   .subscribe_err(move |v| c_seen.lock().unwrap().push(v), |err| panic!("{err}"));
//!
//! scheduler.advance_by(Duration::from_millis(99));
//! assert!(seen.lock().unwrap().is_empty());
//! scheduler.advance_by(Duration::from_millis(1));
//! assert_eq!(*seen.lock().unwrap(), vec![42]);
//! ```
//!
//! Every clone shares one clock and one queue; separate `TestScheduler`
//! values are independent, so tests running in parallel never interfere.

use std::{cmp::Ordering, collections::BinaryHeap};

use super::{Duration, OnceTask, RepeatTask, Scheduler, TaskHandle};
use crate::{
  rc::{MutArc, RcDeref, RcDerefMut},
  subscription::Subscription,
};

enum Work {
  Once(OnceTask),
  Repeat(RepeatTask),
}

struct Pending {
  due: Duration,
  id: usize,
  work: Work,
  handle: TaskHandle,
}

impl PartialEq for Pending {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.id == other.id }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Pending {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by id
    other
      .due
      .cmp(&self.due)
      .then_with(|| other.id.cmp(&self.id))
  }
}

#[derive(Default)]
struct VirtualClock {
  now: Duration,
  queue: BinaryHeap<Pending>,
  next_id: usize,
}

impl VirtualClock {
  fn push(&mut self, due: Duration, work: Work, handle: TaskHandle) {
    let id = self.next_id;
    self.next_id += 1;
    self.queue.push(Pending { due, id, work, handle });
  }
}

/// A scheduler whose clock is driven by the test.
#[derive(Clone, Default)]
pub struct TestScheduler(MutArc<VirtualClock>);

impl TestScheduler {
  /// Virtual time elapsed since the scheduler was created.
  pub fn now(&self) -> Duration { self.0.rc_deref().now }

  /// Number of queued tasks that have not been cancelled.
  pub fn pending_count(&self) -> usize {
    self
      .0
      .rc_deref()
      .queue
      .iter()
      .filter(|p| !p.handle.is_closed())
      .count()
  }

  pub fn is_empty(&self) -> bool { self.pending_count() == 0 }

  /// Moves the clock forward by `duration`, running every task that falls
  /// due on the way.
  pub fn advance_by(&self, duration: Duration) {
    let target = self.now() + duration;
    self.advance_to(target);
  }

  /// Moves the clock to `target`, running every task due at or before it.
  /// A target in the past leaves the clock untouched.
  pub fn advance_to(&self, target: Duration) {
    self.run_until(Some(target));
    let mut clock = self.0.rc_deref_mut();
    if clock.now < target {
      clock.now = target;
    }
  }

  /// Runs queued tasks, jumping the clock to each due time, until the queue
  /// is empty.
  ///
  /// A repeating task that never stops keeps the queue non-empty; drive such
  /// streams with `advance_by` instead.
  pub fn flush(&self) { self.run_until(None); }

  fn run_until(&self, target: Option<Duration>) {
    loop {
      let next = {
        let mut clock = self.0.rc_deref_mut();
        let due = match clock.queue.peek() {
          Some(p) => p.due,
          None => break,
        };
        if target.map_or(false, |limit| due > limit) {
          break;
        }
        let pending = clock.queue.pop();
        if due > clock.now {
          clock.now = due;
        }
        pending
      };

      let Some(Pending { work, handle, .. }) = next else {
        break;
      };
      if handle.is_closed() {
        continue;
      }

      // Tasks run without the clock lock so they can schedule more work.
      match work {
        Work::Once(task) => {
          task.run();
          handle.mark_finished();
        }
        Work::Repeat(mut task) => {
          if task.tick() && !handle.is_cancelled() {
            let mut clock = self.0.rc_deref_mut();
            let due = clock.now + task.period();
            clock.push(due, Work::Repeat(task), handle);
          } else {
            handle.mark_finished();
          }
        }
      }
    }
  }
}

impl Scheduler for TestScheduler {
  fn schedule(&self, task: OnceTask, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::default();
    let mut clock = self.0.rc_deref_mut();
    let due = clock.now + delay.unwrap_or(Duration::ZERO);
    clock.push(due, Work::Once(task), handle.clone());
    handle
  }

  fn schedule_repeating(&self, task: RepeatTask, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::default();
    let mut clock = self.0.rc_deref_mut();
    let due = clock.now + delay.unwrap_or_else(|| task.period());
    clock.push(due, Work::Repeat(task), handle.clone());
    handle
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::{Arc, Mutex};

  fn recorder() -> (Arc<Mutex<Vec<(u64, &'static str)>>>, TestScheduler) {
    (Arc::new(Mutex::new(vec![])), TestScheduler::default())
  }

  fn log_at(
    scheduler: &TestScheduler, log: &Arc<Mutex<Vec<(u64, &'static str)>>>, tag: &'static str,
    delay: u64,
  ) -> TaskHandle {
    let log = log.clone();
    let clock = scheduler.clone();
    scheduler.schedule(
      OnceTask::new(move || {
        log
          .lock()
          .unwrap()
          .push((clock.now().as_millis() as u64, tag))
      }),
      Some(Duration::from_millis(delay)),
    )
  }

  #[test]
  fn runs_in_due_order_then_fifo() {
    let (log, scheduler) = recorder();
    log_at(&scheduler, &log, "late", 20);
    log_at(&scheduler, &log, "first", 10);
    log_at(&scheduler, &log, "second", 10);

    scheduler.advance_by(Duration::from_millis(15));
    assert_eq!(*log.lock().unwrap(), vec![(10, "first"), (10, "second")]);
    assert_eq!(scheduler.now(), Duration::from_millis(15));

    scheduler.flush();
    assert_eq!(log.lock().unwrap().last(), Some(&(20, "late")));
    assert!(scheduler.is_empty());
  }

  #[test]
  fn cancelled_tasks_are_skipped() {
    let (log, scheduler) = recorder();
    let handle = log_at(&scheduler, &log, "never", 10);
    assert_eq!(scheduler.pending_count(), 1);
    handle.unsubscribe();
    assert_eq!(scheduler.pending_count(), 0);
    scheduler.advance_by(Duration::from_millis(10));
    assert!(log.lock().unwrap().is_empty());
  }

  #[test]
  fn repeating_task_reschedules_itself() {
    let scheduler = TestScheduler::default();
    let ticks = Arc::new(Mutex::new(vec![]));
    let c_ticks = ticks.clone();
    let clock = scheduler.clone();
    let handle = scheduler.schedule_repeating(
      RepeatTask::new(Duration::from_millis(10), move |seq| {
        c_ticks
          .lock()
          .unwrap()
          .push((seq, clock.now().as_millis()));
        true
      }),
      None,
    );

    scheduler.advance_by(Duration::from_millis(35));
    assert_eq!(*ticks.lock().unwrap(), vec![(0, 10), (1, 20), (2, 30)]);

    handle.unsubscribe();
    scheduler.advance_by(Duration::from_millis(100));
    assert_eq!(ticks.lock().unwrap().len(), 3);
    assert!(scheduler.is_empty());
  }

  #[test]
  fn tasks_may_schedule_more_work() {
    let (log, scheduler) = recorder();
    let c_log = log.clone();
    let c_scheduler = scheduler.clone();
    scheduler.schedule(
      OnceTask::new(move || {
        log_at(&c_scheduler, &c_log, "nested", 5);
      }),
      Some(Duration::from_millis(5)),
    );
    scheduler.advance_by(Duration::from_millis(10));
    assert_eq!(*log.lock().unwrap(), vec![(10, "nested")]);
  }

  #[test]
  fn advance_to_past_keeps_clock() {
    let scheduler = TestScheduler::default();
    scheduler.advance_by(Duration::from_millis(50));
    scheduler.advance_to(Duration::from_millis(10));
    assert_eq!(scheduler.now(), Duration::from_millis(50));
  }
}
