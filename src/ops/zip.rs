//! Zip operator implementation
//!
//! Zip combines items from two observables pairwise: the n-th item of one
//! side meets the n-th item of the other. Items that arrive early wait in a
//! per-side buffer.

use std::collections::VecDeque;

use crate::{
  prelude::*,
  rc::{MutArc, RcDeref, RcDerefMut},
  subscription::MultiSubscription,
  type_hint::TypeHint,
};

/// The combiner `zip` uses.
pub(crate) fn pair<A, B>(a: A, b: B) -> (A, B) { (a, b) }

/// Zip operator. `Items` records the item types of both sides as `(A, B)`.
#[derive(Clone)]
pub struct ZipOp<SA, SB, F, Items> {
  source_a: SA,
  source_b: SB,
  combine: F,
  _hint: TypeHint<Items>,
}

impl<SA, SB, F, Items> ZipOp<SA, SB, F, Items> {
  pub(crate) fn new(source_a: SA, source_b: SB, combine: F) -> Self {
    ZipOp { source_a, source_b, combine, _hint: TypeHint::new() }
  }
}

impl<SA, SB, F, A, B, C> Observable<C> for ZipOp<SA, SB, F, (A, B)>
where
  SA: Observable<A>,
  SB: Observable<B>,
  F: FnMut(A, B) -> C + Send + 'static,
  A: Send + 'static,
  B: Send + 'static,
{
  type Unsub = MultiSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<C> + Send + 'static,
  {
    let subscription = MultiSubscription::default();
    let state = MutArc::own(ZipState {
      observer: Some(observer),
      combine: self.combine,
      buffer_a: VecDeque::new(),
      buffer_b: VecDeque::new(),
      completed_a: false,
      completed_b: false,
    });

    let a_observer = ZipAObserver { state: state.clone(), subscription: subscription.clone() };
    subscription.append(self.source_a.actual_subscribe(a_observer));
    if !subscription.is_closed() {
      let b_observer = ZipBObserver { state, subscription: subscription.clone() };
      subscription.append(self.source_b.actual_subscribe(b_observer));
    }
    subscription
  }
}

// ==================== Shared State ====================

struct ZipState<O, F, A, B> {
  observer: Option<O>,
  combine: F,
  buffer_a: VecDeque<A>,
  buffer_b: VecDeque<B>,
  completed_a: bool,
  completed_b: bool,
}

impl<O, F, A, B> ZipState<O, F, A, B> {
  /// No more pairs can form once a completed side has nothing buffered.
  fn take_if_done(&mut self) -> Option<O> {
    let done = (self.completed_a && self.buffer_a.is_empty())
      || (self.completed_b && self.buffer_b.is_empty());
    if done {
      self.observer.take()
    } else {
      None
    }
  }
}

fn finish<C, O: Observer<C>>(observer: Option<O>, subscription: &MultiSubscription) {
  if let Some(observer) = observer {
    observer.complete();
    subscription.clone().unsubscribe();
  }
}

fn fail<C, O, F, A, B>(state: &MutArc<ZipState<O, F, A, B>>, subscription: &MultiSubscription, err: RxError)
where
  O: Observer<C>,
{
  let observer = state.rc_deref_mut().observer.take();
  if let Some(observer) = observer {
    observer.error(err);
    subscription.clone().unsubscribe();
  }
}

fn finished<C, O, F, A, B>(state: &MutArc<ZipState<O, F, A, B>>) -> bool
where
  O: Observer<C>,
{
  state
    .rc_deref()
    .observer
    .as_ref()
    .map_or(true, |o| o.is_finished())
}

// ==================== Observers ====================

pub struct ZipAObserver<O, F, A, B> {
  state: MutArc<ZipState<O, F, A, B>>,
  subscription: MultiSubscription,
}

pub struct ZipBObserver<O, F, A, B> {
  state: MutArc<ZipState<O, F, A, B>>,
  subscription: MultiSubscription,
}

impl<O, F, A, B, C> Observer<A> for ZipAObserver<O, F, A, B>
where
  O: Observer<C>,
  F: FnMut(A, B) -> C,
{
  fn next(&mut self, value: A) {
    let done = {
      let mut guard = self.state.rc_deref_mut();
      let state = &mut *guard;
      let Some(observer) = state.observer.as_mut() else {
        return;
      };
      match state.buffer_b.pop_front() {
        Some(b) => observer.next((state.combine)(value, b)),
        None => state.buffer_a.push_back(value),
      }
      state.take_if_done()
    };
    finish::<C, _>(done, &self.subscription);
  }

  fn error(self, err: RxError) { fail::<C, _, _, _, _>(&self.state, &self.subscription, err) }

  fn complete(self) {
    let done = {
      let mut state = self.state.rc_deref_mut();
      state.completed_a = true;
      state.take_if_done()
    };
    finish::<C, _>(done, &self.subscription);
  }

  fn is_finished(&self) -> bool { finished::<C, _, _, _, _>(&self.state) }
}

impl<O, F, A, B, C> Observer<B> for ZipBObserver<O, F, A, B>
where
  O: Observer<C>,
  F: FnMut(A, B) -> C,
{
  fn next(&mut self, value: B) {
    let done = {
      let mut guard = self.state.rc_deref_mut();
      let state = &mut *guard;
      let Some(observer) = state.observer.as_mut() else {
        return;
      };
      match state.buffer_a.pop_front() {
        Some(a) => observer.next((state.combine)(a, value)),
        None => state.buffer_b.push_back(value),
      }
      state.take_if_done()
    };
    finish::<C, _>(done, &self.subscription);
  }

  fn error(self, err: RxError) { fail::<C, _, _, _, _>(&self.state, &self.subscription, err) }

  fn complete(self) {
    let done = {
      let mut state = self.state.rc_deref_mut();
      state.completed_b = true;
      state.take_if_done()
    };
    finish::<C, _>(done, &self.subscription);
  }

  fn is_finished(&self) -> bool { finished::<C, _, _, _, _>(&self.state) }
}
