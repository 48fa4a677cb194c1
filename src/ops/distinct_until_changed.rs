use crate::prelude::*;

#[derive(Clone)]
pub struct DistinctUntilChangedOp<S> {
  source: S,
}

impl<S> DistinctUntilChangedOp<S> {
  pub(crate) fn new(source: S) -> Self { DistinctUntilChangedOp { source } }
}

impl<Item, S> Observable<Item> for DistinctUntilChangedOp<S>
where
  S: Observable<Item>,
  Item: PartialEq + Clone + Send + 'static,
{
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item> + Send + 'static,
  {
    self
      .source
      .actual_subscribe(DistinctUntilChangedObserver { observer, last: None })
  }
}

pub struct DistinctUntilChangedObserver<O, Item> {
  observer: O,
  last: Option<Item>,
}

impl<Item, O> Observer<Item> for DistinctUntilChangedObserver<O, Item>
where
  O: Observer<Item>,
  Item: PartialEq + Clone,
{
  fn next(&mut self, value: Item) {
    if self.last.as_ref() != Some(&value) {
      self.last = Some(value.clone());
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

#[cfg(test)]
mod tests {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn smoke() {
    let x = Arc::new(Mutex::new(vec![]));
    let x_c = x.clone();
    observable::from_iter(vec![1, 1, 2, 2, 2, 3, 1, 1])
      .distinct_until_changed()
      .subscribe_err(move |v| x_c.lock().unwrap().push(v), |_| {});
    assert_eq!(*x.lock().unwrap(), vec![1, 2, 3, 1]);
  }

  #[test]
  fn compares_with_previous_not_all_seen() {
    let x = Arc::new(Mutex::new(vec![]));
    let x_c = x.clone();
    observable::just(["he", "hel", "hel", "he"])
      .distinct_until_changed()
      .subscribe_err(move |v| x_c.lock().unwrap().push(v), |_| {});
    assert_eq!(*x.lock().unwrap(), vec!["he", "hel", "he"]);
  }
}
