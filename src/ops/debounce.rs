use crate::{
  prelude::*,
  rc::{MutArc, RcDeref, RcDerefMut},
  subscription::ZipSubscription,
};

#[derive(Clone)]
pub struct DebounceOp<S, SD> {
  source: S,
  scheduler: SD,
  duration: Duration,
}

impl<S, SD> DebounceOp<S, SD> {
  pub(crate) fn new(source: S, duration: Duration, scheduler: SD) -> Self {
    DebounceOp { source, scheduler, duration }
  }
}

impl<Item, S, SD> Observable<Item> for DebounceOp<S, SD>
where
  S: Observable<Item>,
  SD: Scheduler,
  Item: Send + 'static,
{
  type Unsub = ZipSubscription<S::Unsub, DebounceTimer>;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item> + Send + 'static,
  {
    let Self { source, scheduler, duration } = self;
    let timer = DebounceTimer::default();
    let observer = DebounceObserver {
      state: MutArc::own(DebounceState { observer: Some(observer), trailing: None, generation: 0 }),
      timer: timer.clone(),
      delay: duration,
      scheduler,
    };
    let unsub = source.actual_subscribe(observer);
    ZipSubscription::new(unsub, timer)
  }
}

struct DebounceState<O, Item> {
  observer: Option<O>,
  trailing: Option<Item>,
  /// Bumped on every value; a timer only fires for the value that armed it.
  generation: u64,
}

#[derive(Default)]
struct TimerSlot {
  closed: bool,
  handle: Option<TaskHandle>,
}

/// The single pending debounce timer of one subscription.
#[derive(Clone, Default)]
pub struct DebounceTimer(MutArc<TimerSlot>);

impl DebounceTimer {
  /// Arms `handle`, cancelling the timer it replaces.
  fn rearm(&self, handle: TaskHandle) {
    let stale = {
      let mut slot = self.0.rc_deref_mut();
      if slot.closed {
        Some(handle)
      } else {
        slot.handle.replace(handle)
      }
    };
    if let Some(stale) = stale {
      stale.unsubscribe();
    }
  }
}

impl Subscription for DebounceTimer {
  fn unsubscribe(self) {
    let handle = {
      let mut slot = self.0.rc_deref_mut();
      slot.closed = true;
      slot.handle.take()
    };
    if let Some(handle) = handle {
      handle.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.0.rc_deref().closed }
}

pub struct DebounceObserver<O, Item, SD> {
  state: MutArc<DebounceState<O, Item>>,
  timer: DebounceTimer,
  delay: Duration,
  scheduler: SD,
}

fn fire<Item, O: Observer<Item>>(state: &MutArc<DebounceState<O, Item>>, generation: u64) {
  let mut guard = state.rc_deref_mut();
  let state = &mut *guard;
  if state.generation != generation {
    return;
  }
  if let (Some(value), Some(observer)) = (state.trailing.take(), state.observer.as_mut()) {
    observer.next(value);
  }
}

impl<Item, O, SD> Observer<Item> for DebounceObserver<O, Item, SD>
where
  O: Observer<Item> + Send + 'static,
  Item: Send + 'static,
  SD: Scheduler,
{
  fn next(&mut self, value: Item) {
    let generation = {
      let mut state = self.state.rc_deref_mut();
      if state.observer.is_none() {
        return;
      }
      state.trailing = Some(value);
      state.generation += 1;
      state.generation
    };
    let state = self.state.clone();
    let handle = self
      .scheduler
      .schedule(OnceTask::new(move || fire(&state, generation)), Some(self.delay));
    self.timer.rearm(handle);
  }

  fn error(self, err: RxError) {
    let observer = {
      let mut state = self.state.rc_deref_mut();
      state.trailing = None;
      state.observer.take()
    };
    self.timer.unsubscribe();
    if let Some(observer) = observer {
      observer.error(err);
    }
  }

  fn complete(self) {
    let (trailing, observer) = {
      let mut state = self.state.rc_deref_mut();
      (state.trailing.take(), state.observer.take())
    };
    self.timer.unsubscribe();
    if let Some(mut observer) = observer {
      if let Some(value) = trailing {
        observer.next(value);
      }
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
