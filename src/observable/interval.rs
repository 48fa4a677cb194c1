use crate::prelude::*;

/// Creates an observable which emits `0, 1, 2, ...`, one value every
/// `period`, starting one period after subscription.
///
/// The stream never completes on its own; dispose the subscription or limit
/// it with `take`.
pub fn interval<SD>(period: Duration, scheduler: SD) -> IntervalObservable<SD> {
  IntervalObservable { period, delay: None, scheduler }
}

/// Like [`interval`], but the first value fires after `delay` instead of
/// after one period.
pub fn interval_after<SD>(delay: Duration, period: Duration, scheduler: SD) -> IntervalObservable<SD> {
  IntervalObservable { period, delay: Some(delay), scheduler }
}

#[derive(Clone)]
pub struct IntervalObservable<SD> {
  scheduler: SD,
  period: Duration,
  delay: Option<Duration>,
}

impl<SD: Scheduler> Observable<usize> for IntervalObservable<SD> {
  type Unsub = TaskHandle;

  fn actual_subscribe<O>(self, mut observer: O) -> Self::Unsub
  where
    O: Observer<usize> + Send + 'static,
  {
    let Self { scheduler, period, delay } = self;
    let task = RepeatTask::new(period, move |seq| {
      if observer.is_finished() {
        return false;
      }
      observer.next(seq);
      !observer.is_finished()
    });
    scheduler.schedule_repeating(task, delay)
  }
}
