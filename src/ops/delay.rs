use std::collections::VecDeque;

use crate::{
  prelude::*,
  rc::{MutArc, RcDeref, RcDerefMut},
  subscription::{MultiSubscription, ZipSubscription},
};

#[derive(Clone)]
pub struct DelayOp<S, SD> {
  source: S,
  delay: Duration,
  scheduler: SD,
}

impl<S, SD> DelayOp<S, SD> {
  pub(crate) fn new(source: S, delay: Duration, scheduler: SD) -> Self { DelayOp { source, delay, scheduler } }
}

impl<Item, S, SD> Observable<Item> for DelayOp<S, SD>
where
  S: Observable<Item>,
  SD: Scheduler,
  Item: Send + 'static,
{
  type Unsub = ZipSubscription<S::Unsub, MultiSubscription>;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item> + Send + 'static,
  {
    let Self { source, delay, scheduler } = self;
    let timers = MultiSubscription::default();
    let state = MutArc::own(DelayState { observer: Some(observer), pending: VecDeque::new(), completed: false });
    let unsub = source.actual_subscribe(DelayObserver { state, timers: timers.clone(), delay, scheduler });
    ZipSubscription::new(unsub, timers)
  }
}

struct DelayState<O, Item> {
  observer: Option<O>,
  pending: VecDeque<Item>,
  completed: bool,
}

pub struct DelayObserver<O, Item, SD> {
  state: MutArc<DelayState<O, Item>>,
  timers: MultiSubscription,
  delay: Duration,
  scheduler: SD,
}

/// Every timer emits the oldest pending value, so values leave in the order
/// they arrived even if timers fire out of order on a thread pool.
fn emit_front<Item, O: Observer<Item>>(state: &MutArc<DelayState<O, Item>>) {
  let done = {
    let mut guard = state.rc_deref_mut();
    let state = &mut *guard;
    let Some(value) = state.pending.pop_front() else {
      return;
    };
    if let Some(observer) = state.observer.as_mut() {
      observer.next(value);
    }
    if state.completed && state.pending.is_empty() {
      state.observer.take()
    } else {
      None
    }
  };
  if let Some(observer) = done {
    observer.complete();
  }
}

impl<Item, O, SD> Observer<Item> for DelayObserver<O, Item, SD>
where
  O: Observer<Item> + Send + 'static,
  Item: Send + 'static,
  SD: Scheduler,
{
  fn next(&mut self, value: Item) {
    {
      let mut state = self.state.rc_deref_mut();
      if state.observer.is_none() {
        return;
      }
      state.pending.push_back(value);
    }
    let state = self.state.clone();
    let handle = self
      .scheduler
      .schedule(OnceTask::new(move || emit_front(&state)), Some(self.delay));
    self.timers.append(handle);
  }

  fn error(self, err: RxError) {
    let observer = {
      let mut state = self.state.rc_deref_mut();
      state.pending.clear();
      state.observer.take()
    };
    self.timers.unsubscribe();
    if let Some(observer) = observer {
      observer.error(err);
    }
  }

  fn complete(self) {
    let observer = {
      let mut state = self.state.rc_deref_mut();
      state.completed = true;
      if state.pending.is_empty() {
        state.observer.take()
      } else {
        None
      }
    };
    if let Some(observer) = observer {
      observer.complete();
    }
  }

  fn is_finished(&self) -> bool {
    self
      .state
      .rc_deref()
      .observer
      .as_ref()
      .map_or(true, |o| o.is_finished())
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  type Log = Arc<Mutex<Vec<(u128, String)>>>;

  fn timed_log<Item: std::fmt::Display>(
    log: &Log, scheduler: &TestScheduler,
  ) -> FnObserver<impl FnMut(Item) + Send, impl FnOnce(RxError) + Send, impl FnOnce() + Send> {
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    let (s1, s2, s3) = (scheduler.clone(), scheduler.clone(), scheduler.clone());
    FnObserver {
      next: move |v: Item| l1.lock().unwrap().push((s1.now().as_millis(), v.to_string())),
      error: move |err: RxError| l2.lock().unwrap().push((s2.now().as_millis(), err.to_string())),
      complete: move || l3.lock().unwrap().push((s3.now().as_millis(), "complete".to_owned())),
    }
  }

  #[test]
  fn shifts_every_value_and_completion() {
    let scheduler = TestScheduler::default();
    let log = Log::default();
    observable::interval(Duration::from_millis(10), scheduler.clone())
      .take(3)
      .delay(Duration::from_millis(100), scheduler.clone())
      .subscribe(timed_log::<usize>(&log, &scheduler));

    scheduler.advance_by(Duration::from_millis(1_000));
    let expected: Vec<(u128, String)> = vec![
      (110, "0".into()),
      (120, "1".into()),
      (130, "2".into()),
      (130, "complete".into()),
    ];
    assert_eq!(*log.lock().unwrap(), expected);
  }

  #[test]
  fn error_is_not_delayed_and_cancels_pending() {
    let scheduler = TestScheduler::default();
    let log = Log::default();
    observable::create(|emitter: &mut dyn Emitter<i32>| {
      emitter.next(1);
      emitter.error(RxError::source_failure("boom"));
      Ok(())
    })
    .delay(Duration::from_millis(50), scheduler.clone())
    .subscribe(timed_log::<i32>(&log, &scheduler));

    assert_eq!(scheduler.pending_count(), 0);
    scheduler.advance_by(Duration::from_millis(100));
    assert_eq!(*log.lock().unwrap(), vec![(0, "source failed: boom".to_owned())]);
  }

  #[test]
  fn dispose_cancels_pending_values() {
    let scheduler = TestScheduler::default();
    let log = Log::default();
    let disposable = observable::just([1, 2])
      .delay(Duration::from_millis(50), scheduler.clone())
      .subscribe(timed_log::<i32>(&log, &scheduler));
    assert_eq!(scheduler.pending_count(), 2);
    disposable.dispose();
    assert_eq!(scheduler.pending_count(), 0);
    scheduler.advance_by(Duration::from_millis(100));
    assert!(log.lock().unwrap().is_empty());
  }

  #[test]
  fn immediate_scheduler_delays_inline() {
    let stamp = std::time::Instant::now();
    let last = observable::of(5)
      .delay(Duration::from_millis(5), ImmediateScheduler)
      .blocking_last();
    assert_eq!(last.unwrap(), Some(5));
    assert!(stamp.elapsed() >= Duration::from_millis(5));
  }
}
