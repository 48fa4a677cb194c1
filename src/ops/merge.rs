use crate::{
  prelude::*,
  rc::{MutArc, RcDeref, RcDerefMut},
  subscription::MultiSubscription,
};

/// Combines two streams of the same item type by interleaving their
/// emissions.
///
/// ```
/// use rxlite::prelude::*;
///
/// let even = observable::from_iter(0..10).filter(|v| v % 2 == 0);
/// let odd = observable::from_iter(0..10).filter(|v| v % 2 != 0);
///
/// even.merge(odd).subscribe_err(|v| println!("{v} "), |err| eprintln!("{err}"));
/// ```
#[derive(Clone)]
pub struct MergeOp<S1, S2> {
  source1: S1,
  source2: S2,
}

impl<S1, S2> MergeOp<S1, S2> {
  pub(crate) fn new(source1: S1, source2: S2) -> Self { MergeOp { source1, source2 } }
}

impl<Item, S1, S2> Observable<Item> for MergeOp<S1, S2>
where
  S1: Observable<Item>,
  S2: Observable<Item>,
{
  type Unsub = MultiSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item> + Send + 'static,
  {
    let subscription = MultiSubscription::default();
    let merge = MergeObserver {
      state: MutArc::own(MergeState { observer: Some(observer), completed: 0 }),
      subscription: subscription.clone(),
    };
    subscription.append(self.source1.actual_subscribe(merge.clone()));
    if !subscription.is_closed() {
      subscription.append(self.source2.actual_subscribe(merge));
    }
    subscription
  }
}

struct MergeState<O> {
  observer: Option<O>,
  completed: usize,
}

pub struct MergeObserver<O> {
  state: MutArc<MergeState<O>>,
  subscription: MultiSubscription,
}

impl<O> Clone for MergeObserver<O> {
  fn clone(&self) -> Self {
    MergeObserver { state: self.state.clone(), subscription: self.subscription.clone() }
  }
}

impl<Item, O> Observer<Item> for MergeObserver<O>
where
  O: Observer<Item>,
{
  fn next(&mut self, value: Item) {
    if let Some(observer) = self.state.rc_deref_mut().observer.as_mut() {
      observer.next(value);
    }
  }

  fn error(self, err: RxError) {
    let observer = self.state.rc_deref_mut().observer.take();
    if let Some(observer) = observer {
      observer.error(err);
      self.subscription.unsubscribe();
    }
  }

  fn complete(self) {
    let observer = {
      let mut state = self.state.rc_deref_mut();
      state.completed += 1;
      if state.completed == 2 {
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
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  };

  #[test]
  fn odd_even_merge() {
    let numbers = Arc::new(Mutex::new(vec![]));
    let completed = Arc::new(AtomicUsize::new(0));
    let (c_numbers, c_completed) = (numbers.clone(), completed.clone());

    let even = observable::from_iter(0..10).filter(|v| v % 2 == 0);
    let odd = observable::from_iter(0..10).filter(|v| v % 2 != 0);
    even.merge(odd).subscribe_all(
      move |v| c_numbers.lock().unwrap().push(v),
      |_| unreachable!(),
      move || {
        c_completed.fetch_add(1, Ordering::SeqCst);
      },
    );

    assert_eq!(*numbers.lock().unwrap(), vec![0, 2, 4, 6, 8, 1, 3, 5, 7, 9]);
    assert_eq!(completed.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn completes_only_after_both_sides() {
    let completed = Arc::new(AtomicUsize::new(0));
    let c_completed = completed.clone();
    let disposable = observable::of(1).merge(observable::never::<i32>()).subscribe_all(
      |_| {},
      |_| unreachable!(),
      move || {
        c_completed.fetch_add(1, Ordering::SeqCst);
      },
    );
    assert_eq!(completed.load(Ordering::SeqCst), 0);
    assert_eq!(disposable.state(), LifecycleState::Active);
  }

  #[test]
  fn error_tears_down_other_side() {
    let scheduler = TestScheduler::default();
    let errors = Arc::new(AtomicUsize::new(0));
    let c_errors = errors.clone();
    let ticks = Arc::new(AtomicUsize::new(0));
    let c_ticks = ticks.clone();

    observable::interval(Duration::from_millis(10), scheduler.clone())
      .merge(
        observable::throw_err::<usize>(RxError::source_failure("boom"))
          .delay(Duration::from_millis(25), scheduler.clone()),
      )
      .subscribe_err(
        move |_| {
          c_ticks.fetch_add(1, Ordering::SeqCst);
        },
        move |_| {
          c_errors.fetch_add(1, Ordering::SeqCst);
        },
      );

    scheduler.advance_by(Duration::from_millis(100));
    // The error passes `delay` immediately, so the interval never ticks.
    assert_eq!(ticks.load(Ordering::SeqCst), 0);
    assert_eq!(errors.load(Ordering::SeqCst), 1);
    assert!(scheduler.is_empty());
  }
}
