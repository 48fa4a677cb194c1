use crate::{prelude::*, type_hint::TypeHint};

#[derive(Clone)]
pub struct MapOp<S, F, Item> {
  source: S,
  func: F,
  _hint: TypeHint<Item>,
}

impl<S, F, Item> MapOp<S, F, Item> {
  pub(crate) fn new(source: S, func: F) -> Self { MapOp { source, func, _hint: TypeHint::new() } }
}

impl<Item, B, S, F> Observable<B> for MapOp<S, F, Item>
where
  S: Observable<Item>,
  F: FnMut(Item) -> B + Send + 'static,
{
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<B> + Send + 'static,
  {
    self
      .source
      .actual_subscribe(MapObserver { observer, map: self.func })
  }
}

pub struct MapObserver<O, F> {
  observer: O,
  map: F,
}

impl<Item, B, O, F> Observer<Item> for MapObserver<O, F>
where
  O: Observer<B>,
  F: FnMut(Item) -> B,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next((self.map)(value)) }

  #[inline]
  fn error(self, err: RxError) { self.observer.error(err) }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}

#[derive(Clone)]
pub struct TryMapOp<S, F, Item> {
  source: S,
  func: F,
  _hint: TypeHint<Item>,
}

impl<S, F, Item> TryMapOp<S, F, Item> {
  pub(crate) fn new(source: S, func: F) -> Self { TryMapOp { source, func, _hint: TypeHint::new() } }
}

impl<Item, B, S, F> Observable<B> for TryMapOp<S, F, Item>
where
  S: Observable<Item>,
  F: FnMut(Item) -> Result<B, RxError> + Send + 'static,
{
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<B> + Send + 'static,
  {
    self
      .source
      .actual_subscribe(TryMapObserver { observer: Some(observer), map: self.func })
  }
}

/// Holds the downstream until the first failure; afterwards it reports
/// itself finished so synchronous sources stop producing.
pub struct TryMapObserver<O, F> {
  observer: Option<O>,
  map: F,
}

impl<Item, B, O, F> Observer<Item> for TryMapObserver<O, F>
where
  O: Observer<B>,
  F: FnMut(Item) -> Result<B, RxError>,
{
  fn next(&mut self, value: Item) {
    let Some(observer) = self.observer.as_mut() else {
      return;
    };
    match (self.map)(value) {
      Ok(v) => observer.next(v),
      Err(err) => {
        tracing::debug!(error = %err, "try_map failed");
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

#[cfg(test)]
mod tests {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn primitive_type() {
    let sum = Arc::new(Mutex::new(0));
    let c_sum = sum.clone();
    observable::from_iter(100..101)
      .map(|v| v * 2)
      .subscribe_err(move |v| *c_sum.lock().unwrap() += v, |_| {});
    assert_eq!(*sum.lock().unwrap(), 200);
  }

  #[test]
  fn changes_item_type() {
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    observable::just(["Alpha", "Beta", "Gamma"])
      .map(str::len)
      .subscribe_err(move |v| c_seen.lock().unwrap().push(v), |_| {});
    assert_eq!(*seen.lock().unwrap(), vec![5, 4, 5]);
  }

  #[test]
  fn try_map_stops_at_first_failure() {
    let seen = Arc::new(Mutex::new(vec![]));
    let errors = Arc::new(Mutex::new(vec![]));
    let (c_seen, c_errors) = (seen.clone(), errors.clone());
    let pulled = Arc::new(Mutex::new(0));
    let c_pulled = pulled.clone();

    observable::range(1, 10_000)
      .tap(move |_| *c_pulled.lock().unwrap() += 1)
      .try_map(|v| {
        if v == 5_000 {
          Err(RxError::operator_failure(format!("rejected {v}")))
        } else {
          Ok(v)
        }
      })
      .subscribe_all(
        move |v| c_seen.lock().unwrap().push(v),
        move |err| c_errors.lock().unwrap().push(err.message().to_owned()),
        || unreachable!(),
      );

    assert_eq!(seen.lock().unwrap().len(), 4_999);
    assert_eq!(*errors.lock().unwrap(), vec!["rejected 5000"]);
    // The source notices the failure and stops producing.
    assert_eq!(*pulled.lock().unwrap(), 5_000);
  }
}
