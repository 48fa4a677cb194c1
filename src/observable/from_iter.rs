use crate::prelude::*;

/// Creates an observable that produces values from an iterator.
///
/// Values are emitted synchronously on the subscribing thread, then the
/// stream completes. Emission stops early once the downstream reports it is
/// finished (for example after a `take`).
///
/// ```
/// use rxlite::prelude::*;
///
/// observable::from_iter(vec![0, 1, 2, 3])
///   .subscribe_err(|v| println!("{v},"), |err| eprintln!("{err}"));
/// ```
pub fn from_iter<Iter>(iter: Iter) -> ObservableIter<Iter>
where
  Iter: IntoIterator,
{
  ObservableIter(iter)
}

/// Emits the given values in order, then completes.
///
/// ```
/// use rxlite::prelude::*;
///
/// observable::just(["Alpha", "Beta", "Gamma"])
///   .subscribe_err(|v| println!("{v}"), |err| eprintln!("{err}"));
/// ```
pub fn just<Item, const N: usize>(values: [Item; N]) -> ObservableIter<[Item; N]> {
  ObservableIter(values)
}

/// Emits a single value, then completes.
pub fn of<Item>(value: Item) -> ObservableIter<[Item; 1]> { ObservableIter([value]) }

/// Emits `count` consecutive integers starting at `start`, then completes.
///
/// A range whose last value would overflow `i64` emits nothing and fails
/// with `RxError::Source` instead of being shortened.
pub fn range(start: i64, count: usize) -> ObservableRange { ObservableRange { start, count } }

#[derive(Clone)]
pub struct ObservableRange {
  start: i64,
  count: usize,
}

impl Observable<i64> for ObservableRange {
  type Unsub = ();

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<i64> + Send + 'static,
  {
    let Self { start, count } = self;
    if count == 0 {
      return observer.complete();
    }
    let last = i64::try_from(count - 1)
      .ok()
      .and_then(|offset| start.checked_add(offset));
    match last {
      Some(last) => ObservableIter(start..=last).actual_subscribe(observer),
      None => observer.error(RxError::source_failure(format!(
        "range({start}, {count}) overflows i64"
      ))),
    }
  }
}

#[derive(Clone)]
pub struct ObservableIter<Iter>(Iter);

impl<Iter> Observable<Iter::Item> for ObservableIter<Iter>
where
  Iter: IntoIterator,
{
  type Unsub = ();

  fn actual_subscribe<O>(self, mut observer: O) -> Self::Unsub
  where
    O: Observer<Iter::Item> + Send + 'static,
  {
    for v in self.0 {
      if observer.is_finished() {
        return;
      }
      observer.next(v);
    }
    if !observer.is_finished() {
      observer.complete();
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  fn collect<S, Item>(source: S) -> (Vec<Item>, bool)
  where
    S: Observable<Item>,
    Item: Send + 'static,
  {
    let values = Arc::new(Mutex::new(vec![]));
    let completed = Arc::new(Mutex::new(false));
    let (c_values, c_completed) = (values.clone(), completed.clone());
    source.subscribe_all(
      move |v| c_values.lock().unwrap().push(v),
      |err| panic!("unexpected error {err}"),
      move || *c_completed.lock().unwrap() = true,
    );
    let values = std::mem::take(&mut *values.lock().unwrap());
    let completed = *completed.lock().unwrap();
    (values, completed)
  }

  #[test]
  fn from_range() {
    assert_eq!(collect(observable::from_iter(0..5)), (vec![0, 1, 2, 3, 4], true));
  }

  #[test]
  fn just_and_of() {
    assert_eq!(collect(observable::just(["a", "b"])), (vec!["a", "b"], true));
    assert_eq!(collect(observable::of(7)), (vec![7], true));
  }

  #[test]
  fn empty_iter_only_completes() {
    assert_eq!(collect(observable::from_iter(Vec::<u8>::new())), (vec![], true));
  }

  #[test]
  fn range_counts_from_start() {
    assert_eq!(collect(observable::range(-2, 4)), (vec![-2, -1, 0, 1], true));
    assert_eq!(collect(observable::range(10, 0)), (vec![], true));
  }

  #[test]
  fn range_reaches_max() {
    let (values, completed) = collect(observable::range(i64::MAX - 2, 3));
    assert_eq!(values, vec![i64::MAX - 2, i64::MAX - 1, i64::MAX]);
    assert!(completed);
  }

  #[test]
  fn range_overflow_is_an_error() {
    let events = Arc::new(Mutex::new(vec![]));
    let (c_next, c_err) = (events.clone(), events.clone());
    observable::range(i64::MAX - 2, 5).subscribe_all(
      move |v| c_next.lock().unwrap().push(format!("next {v}")),
      move |err| {
        assert!(matches!(err, RxError::Source { .. }));
        c_err.lock().unwrap().push(err.message().to_owned());
      },
      || unreachable!(),
    );
    assert_eq!(
      *events.lock().unwrap(),
      vec![format!("range({}, 5) overflows i64", i64::MAX - 2)]
    );
  }

  #[test]
  fn stops_when_downstream_finishes() {
    let pulled = Arc::new(Mutex::new(0));
    let c_pulled = pulled.clone();
    let (values, completed) = collect(
      observable::from_iter((0..).inspect(move |_| *c_pulled.lock().unwrap() += 1)).take(3),
    );
    assert_eq!(values, vec![0, 1, 2]);
    assert!(completed);
    assert_eq!(*pulled.lock().unwrap(), 4);
  }
}
