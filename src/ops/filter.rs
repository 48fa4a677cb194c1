use crate::prelude::*;

/// Emit only those items from an Observable that pass a predicate test.
///
/// ```
/// use rxlite::prelude::*;
/// use std::sync::{Arc, Mutex};
///
/// let coll = Arc::new(Mutex::new(vec![]));
/// let coll_clone = coll.clone();
///
/// observable::from_iter(0..10)
///   .filter(|v| *v % 2 == 0)
///   .subscribe_err(move |v| coll_clone.lock().unwrap().push(v), |_| {});
///
/// // only even numbers received.
/// assert_eq!(*coll.lock().unwrap(), vec![0, 2, 4, 6, 8]);
/// ```
#[derive(Clone)]
pub struct FilterOp<S, F> {
  source: S,
  filter: F,
}

impl<S, F> FilterOp<S, F> {
  pub(crate) fn new(source: S, filter: F) -> Self { FilterOp { source, filter } }
}

impl<Item, S, F> Observable<Item> for FilterOp<S, F>
where
  S: Observable<Item>,
  F: FnMut(&Item) -> bool + Send + 'static,
{
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item> + Send + 'static,
  {
    self
      .source
      .actual_subscribe(FilterObserver { observer, filter: self.filter })
  }
}

pub struct FilterObserver<O, F> {
  observer: O,
  filter: F,
}

impl<Item, O, F> Observer<Item> for FilterObserver<O, F>
where
  O: Observer<Item>,
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if (self.filter)(&value) {
      self.observer.next(value)
    }
  }

  #[inline]
  fn error(self, err: RxError) { self.observer.error(err) }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}

#[derive(Clone)]
pub struct TryFilterOp<S, F> {
  source: S,
  filter: F,
}

impl<S, F> TryFilterOp<S, F> {
  pub(crate) fn new(source: S, filter: F) -> Self { TryFilterOp { source, filter } }
}

impl<Item, S, F> Observable<Item> for TryFilterOp<S, F>
where
  S: Observable<Item>,
  F: FnMut(&Item) -> Result<bool, RxError> + Send + 'static,
{
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item> + Send + 'static,
  {
    self
      .source
      .actual_subscribe(TryFilterObserver { observer: Some(observer), filter: self.filter })
  }
}

pub struct TryFilterObserver<O, F> {
  observer: Option<O>,
  filter: F,
}

impl<Item, O, F> Observer<Item> for TryFilterObserver<O, F>
where
  O: Observer<Item>,
  F: FnMut(&Item) -> Result<bool, RxError>,
{
  fn next(&mut self, value: Item) {
    let Some(observer) = self.observer.as_mut() else {
      return;
    };
    match (self.filter)(&value) {
      Ok(true) => observer.next(value),
      Ok(false) => {}
      Err(err) => {
        tracing::debug!(error = %err, "try_filter failed");
        if let Some(observer) = self.observer.take() {
          observer.error(err);
        }
      }
    }
  }

  fn error(self, err: RxError) {
    if let Some(observer) = self.observer {
      observer.error(err)
    }
  }

  fn complete(self) {
    if let Some(observer) = self.observer {
      observer.complete()
    }
  }

  fn is_finished(&self) -> bool { self.observer.as_ref().map_or(true, |o| o.is_finished()) }
}
