use crate::{
  prelude::*,
  rc::{MutArc, RcDeref, RcDerefMut},
  subscription::MultiSubscription,
  type_hint::TypeHint,
};

/// Flattens a stream of streams, subscribing to every inner stream as it
/// arrives. Backs both `merge_all` and `flat_map`.
///
/// The output completes once the outer stream and every inner stream have
/// completed. The first error, from the outer stream or any inner stream,
/// is delivered once and unsubscribes everything else.
#[derive(Clone)]
pub struct MergeAllOp<S, Inner> {
  source: S,
  _hint: TypeHint<Inner>,
}

impl<S, Inner> MergeAllOp<S, Inner> {
  pub(crate) fn new(source: S) -> Self { MergeAllOp { source, _hint: TypeHint::new() } }
}

impl<Item, S, Inner> Observable<Item> for MergeAllOp<S, Inner>
where
  S: Observable<Inner>,
  Inner: Observable<Item>,
  Item: 'static,
{
  type Unsub = MultiSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item> + Send + 'static,
  {
    let all = MultiSubscription::default();
    let state = MutArc::own(MergeAllState { observer: Some(observer), active: 0, outer_completed: false });
    let outer = OuterObserver { state, all: all.clone(), _hint: TypeHint::new() };
    all.append(self.source.actual_subscribe(outer));
    all
  }
}

struct MergeAllState<O> {
  observer: Option<O>,
  active: usize,
  outer_completed: bool,
}

/// Closes the downstream with `err` unless something already did.
fn fail<Item, O: Observer<Item>>(state: &MutArc<MergeAllState<O>>, all: &MultiSubscription, err: RxError) {
  let observer = state.rc_deref_mut().observer.take();
  if let Some(observer) = observer {
    observer.error(err);
    all.clone().unsubscribe();
  }
}

fn finished<Item, O: Observer<Item>>(state: &MutArc<MergeAllState<O>>) -> bool {
  state
    .rc_deref()
    .observer
    .as_ref()
    .map_or(true, |o| o.is_finished())
}

pub struct OuterObserver<O, Item> {
  state: MutArc<MergeAllState<O>>,
  all: MultiSubscription,
  _hint: TypeHint<Item>,
}

impl<Item, O, Inner> Observer<Inner> for OuterObserver<O, Item>
where
  O: Observer<Item> + Send + 'static,
  Inner: Observable<Item>,
{
  fn next(&mut self, inner: Inner) {
    {
      let mut state = self.state.rc_deref_mut();
      if state.observer.is_none() {
        return;
      }
      state.active += 1;
    }
    // Each inner stream owns a slot in `all`, so one failure can reach every
    // sibling while a completed inner stream releases only itself.
    let own = MultiSubscription::default();
    self.all.append(own.clone());
    let unsub =
      inner.actual_subscribe(InnerObserver { state: self.state.clone(), all: self.all.clone(), own: own.clone() });
    own.append(unsub);
  }

  fn error(self, err: RxError) { fail::<Item, O>(&self.state, &self.all, err) }

  fn complete(self) {
    let observer = {
      let mut state = self.state.rc_deref_mut();
      state.outer_completed = true;
      if state.active == 0 {
        state.observer.take()
      } else {
        None
      }
    };
    if let Some(observer) = observer {
      observer.complete();
    }
  }

  fn is_finished(&self) -> bool { finished::<Item, O>(&self.state) }
}

pub struct InnerObserver<O> {
  state: MutArc<MergeAllState<O>>,
  all: MultiSubscription,
  own: MultiSubscription,
}

impl<Item, O> Observer<Item> for InnerObserver<O>
where
  O: Observer<Item>,
{
  fn next(&mut self, value: Item) {
    if let Some(observer) = self.state.rc_deref_mut().observer.as_mut() {
      observer.next(value);
    }
  }

  fn error(self, err: RxError) { fail::<Item, O>(&self.state, &self.all, err) }

  fn complete(self) {
    let observer = {
      let mut state = self.state.rc_deref_mut();
      state.active -= 1;
      if state.active == 0 && state.outer_completed {
        state.observer.take()
      } else {
        None
      }
    };
    self.own.unsubscribe();
    if let Some(observer) = observer {
      observer.complete();
    }
  }

  fn is_finished(&self) -> bool { finished::<Item, O>(&self.state) }
}
