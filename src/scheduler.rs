//! Scheduling substrate for timed and concurrent work.
//!
//! Operators never spawn threads or timers themselves; they hand work to the
//! [`Scheduler`] they were given. Four implementations ship with the crate:
//!
//! - [`ImmediateScheduler`]: runs work inline on the calling thread, blocking
//!   for any requested delay.
//! - [`ThreadPoolScheduler`]: a futures thread pool with `futures-time`
//!   timers (feature `futures-scheduler`, on by default).
//! - [`TokioScheduler`]: spawns onto a tokio runtime (feature
//!   `tokio-scheduler`).
//! - [`TestScheduler`]: virtual time that only moves when a test advances it.
//!
//! Every scheduled unit returns a [`TaskHandle`]. Unsubscribing the handle
//! guarantees that a queued task never starts and releases its timer; a task
//! that is already running is allowed to finish.

use crate::subscription::Subscription;
use parking_lot::Mutex;
use std::{
  fmt::{Debug, Formatter},
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

pub use std::time::{Duration, Instant};

mod immediate_scheduler;
pub mod test_scheduler;
#[cfg(feature = "futures-scheduler")]
mod thread_pool_scheduler;
#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;

pub use immediate_scheduler::ImmediateScheduler;
pub use test_scheduler::TestScheduler;
#[cfg(feature = "futures-scheduler")]
pub use thread_pool_scheduler::ThreadPoolScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_scheduler::TokioScheduler;

/// A Scheduler orders tasks and decides where and when they execute.
///
/// Schedulers are cheap handles: cloning one refers to the same pool, runtime
/// or virtual clock.
pub trait Scheduler: Clone + Send + Sync + 'static {
  /// Runs `task` once, after `delay` when given.
  fn schedule(&self, task: OnceTask, delay: Option<Duration>) -> TaskHandle;

  /// Runs `task` every `task.period()`, first after `delay` (or one period
  /// when `None`), until the task returns `false` or the handle is
  /// unsubscribed.
  fn schedule_repeating(&self, task: RepeatTask, delay: Option<Duration>) -> TaskHandle;
}

// ============================================================================
// Tasks
// ============================================================================

/// A unit of work that runs once.
pub struct OnceTask(Box<dyn FnOnce() + Send>);

impl OnceTask {
  pub fn new(f: impl FnOnce() + Send + 'static) -> Self { OnceTask(Box::new(f)) }

  #[inline]
  pub fn run(self) { (self.0)() }
}

/// A unit of work that runs once per period. The closure receives the tick
/// sequence number and returns whether it wants to keep running.
pub struct RepeatTask {
  period: Duration,
  seq: usize,
  tick: Box<dyn FnMut(usize) -> bool + Send>,
}

impl RepeatTask {
  pub fn new(period: Duration, tick: impl FnMut(usize) -> bool + Send + 'static) -> Self {
    RepeatTask { period, seq: 0, tick: Box::new(tick) }
  }

  #[inline]
  pub fn period(&self) -> Duration { self.period }

  /// Runs one tick, returning `false` once the task is done.
  pub fn tick(&mut self) -> bool {
    let keep_going = (self.tick)(self.seq);
    self.seq += 1;
    keep_going
  }
}

// ============================================================================
// TaskHandle
// ============================================================================

type Canceller = Box<dyn FnOnce() + Send>;

/// Cancellation handle for one scheduled task.
#[derive(Clone, Default)]
pub struct TaskHandle(Arc<HandleInner>);

#[derive(Default)]
struct HandleInner {
  cancelled: AtomicBool,
  finished: AtomicBool,
  canceller: Mutex<Option<Canceller>>,
}

impl TaskHandle {
  /// A handle for work that already ran to completion.
  pub fn finished() -> Self {
    let handle = TaskHandle::default();
    handle.mark_finished();
    handle
  }

  #[inline]
  pub fn is_cancelled(&self) -> bool { self.0.cancelled.load(Ordering::SeqCst) }

  #[inline]
  pub fn is_finished(&self) -> bool { self.0.finished.load(Ordering::SeqCst) }

  /// Records that the task ran to its end and releases the canceller.
  pub fn mark_finished(&self) {
    self.0.finished.store(true, Ordering::SeqCst);
    self.0.canceller.lock().take();
  }

  /// Registers the hook that aborts the underlying timer or future. When the
  /// handle was already cancelled the hook runs immediately.
  pub fn set_canceller(&self, canceller: impl FnOnce() + Send + 'static) {
    let mut slot = self.0.canceller.lock();
    if self.is_cancelled() {
      drop(slot);
      canceller();
    } else {
      *slot = Some(Box::new(canceller));
    }
  }
}

impl Subscription for TaskHandle {
  fn unsubscribe(self) {
    self.0.cancelled.store(true, Ordering::SeqCst);
    let canceller = self.0.canceller.lock().take();
    if let Some(canceller) = canceller {
      canceller();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.is_cancelled() || self.is_finished() }
}

impl Debug for TaskHandle {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TaskHandle")
      .field("cancelled", &self.is_cancelled())
      .field("finished", &self.is_finished())
      .finish()
  }
}
