use crate::prelude::*;

#[derive(Clone)]
pub struct TapOp<S, F> {
  source: S,
  func: F,
}

impl<S, F> TapOp<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { TapOp { source, func } }
}

impl<Item, S, F> Observable<Item> for TapOp<S, F>
where
  S: Observable<Item>,
  F: FnMut(&Item) + Send + 'static,
{
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item> + Send + 'static,
  {
    self
      .source
      .actual_subscribe(TapObserver { observer, func: self.func })
  }
}

pub struct TapObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, O, F> Observer<Item> for TapObserver<O, F>
where
  O: Observer<Item>,
  F: FnMut(&Item),
{
  fn next(&mut self, value: Item) {
    (self.func)(&value);
    self.observer.next(value)
  }

  fn error(self, err: RxError) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_finished(&self) -> bool { self.observer.is_finished() }
}
