use crate::prelude::*;

/// Emits only the first `count` values, then completes.
#[derive(Clone)]
pub struct TakeOp<S> {
  source: S,
  count: usize,
}

impl<S> TakeOp<S> {
  pub(crate) fn new(source: S, count: usize) -> Self { TakeOp { source, count } }
}

impl<Item, S> Observable<Item> for TakeOp<S>
where
  S: Observable<Item>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item> + Send + 'static,
  {
    let observer = if self.count == 0 {
      observer.complete();
      None
    } else {
      Some(observer)
    };
    self
      .source
      .actual_subscribe(TakeObserver { observer, remaining: self.count })
  }
}

pub struct TakeObserver<O> {
  observer: Option<O>,
  remaining: usize,
}

impl<Item, O> Observer<Item> for TakeObserver<O>
where
  O: Observer<Item>,
{
  fn next(&mut self, value: Item) {
    let Some(observer) = self.observer.as_mut() else {
      return;
    };
    self.remaining -= 1;
    observer.next(value);
    if self.remaining == 0 {
      if let Some(observer) = self.observer.take() {
        observer.complete();
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
