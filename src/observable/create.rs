use crate::{prelude::*, type_hint::TypeHint};

/// Creates a stream from a function that drives an [`Emitter`].
///
/// The function runs once per subscription. It may emit any number of
/// values and at most one terminal signal; anything emitted after `error` or
/// `complete` is ignored. Its `Ok` value is a teardown that runs when the
/// subscription is disposed. Returning `Err` delivers that error, unless the
/// emitter had already terminated.
///
/// ```
/// use rxlite::prelude::*;
///
/// observable::create(|emitter: &mut dyn Emitter<&str>| {
///   emitter.next("reading 1");
///   emitter.complete();
///   Ok(ClosureSubscription(|| println!("sensor released")))
/// })
/// .subscribe_err(|v| println!("{v}"), |err| eprintln!("{err}"));
/// ```
pub fn create<F, Item, U>(func: F) -> ObservableCreate<F, Item>
where
  F: FnOnce(&mut dyn Emitter<Item>) -> Result<U, RxError>,
  U: Subscription,
{
  ObservableCreate { func, _hint: TypeHint::new() }
}

#[derive(Clone)]
pub struct ObservableCreate<F, Item> {
  func: F,
  _hint: TypeHint<Item>,
}

struct CreateEmitter<O>(Option<O>);

impl<Item, O: Observer<Item>> Emitter<Item> for CreateEmitter<O> {
  fn next(&mut self, value: Item) {
    match self.0.as_mut() {
      Some(observer) => observer.next(value),
      None => tracing::debug!("create: value emitted after terminal signal ignored"),
    }
  }

  fn error(&mut self, err: RxError) {
    match self.0.take() {
      Some(observer) => observer.error(err),
      None => tracing::debug!(error = %err, "create: error emitted after terminal signal ignored"),
    }
  }

  fn complete(&mut self) {
    match self.0.take() {
      Some(observer) => observer.complete(),
      None => tracing::debug!("create: completion emitted after terminal signal ignored"),
    }
  }

  fn is_finished(&self) -> bool { self.0.as_ref().map_or(true, |o| o.is_finished()) }
}

impl<F, Item, U> Observable<Item> for ObservableCreate<F, Item>
where
  F: FnOnce(&mut dyn Emitter<Item>) -> Result<U, RxError>,
  U: Subscription + Send + 'static,
{
  type Unsub = Option<U>;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item> + Send + 'static,
  {
    let mut emitter = CreateEmitter(Some(observer));
    match (self.func)(&mut emitter) {
      Ok(teardown) => Some(teardown),
      Err(err) => {
        if let Some(observer) = emitter.0.take() {
          observer.error(err);
        } else {
          tracing::debug!(error = %err, "create: failure after terminal signal ignored");
        }
        None
      }
    }
  }
}
