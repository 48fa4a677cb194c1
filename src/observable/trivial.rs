use crate::{prelude::*, type_hint::TypeHint};

/// Creates an observable that emits no items, just terminates with an error.
///
/// Useful for injecting failures into a pipeline, for example as the inner
/// stream a `flat_map` returns for a bad input.
pub fn throw_err<Item>(err: RxError) -> ThrowObservable<Item> {
  ThrowObservable { err, _hint: TypeHint::new() }
}

#[derive(Clone)]
pub struct ThrowObservable<Item> {
  err: RxError,
  _hint: TypeHint<Item>,
}

impl<Item> Observable<Item> for ThrowObservable<Item> {
  type Unsub = ();

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item> + Send + 'static,
  {
    observer.error(self.err);
  }
}

/// Creates an observable that produces no values and completes immediately.
pub fn empty<Item>() -> EmptyObservable<Item> { EmptyObservable(TypeHint::new()) }

#[derive(Clone)]
pub struct EmptyObservable<Item>(TypeHint<Item>);

impl<Item> Observable<Item> for EmptyObservable<Item> {
  type Unsub = ();

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item> + Send + 'static,
  {
    observer.complete();
  }
}

/// Creates an observable that never emits and never terminates.
pub fn never<Item>() -> NeverObservable<Item> { NeverObservable(TypeHint::new()) }

#[derive(Clone)]
pub struct NeverObservable<Item>(TypeHint<Item>);

impl<Item> Observable<Item> for NeverObservable<Item> {
  type Unsub = ();

  fn actual_subscribe<O>(self, _observer: O) -> Self::Unsub
  where
    O: Observer<Item> + Send + 'static,
  {
  }
}
