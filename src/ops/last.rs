use futures::channel::oneshot;

use crate::{prelude::*, subscriber::subscribe_observer};

type LastResult<Item> = Result<Option<Item>, RxError>;

pub struct LastObserver<Item> {
  last: Option<Item>,
  tx: oneshot::Sender<LastResult<Item>>,
}

impl<Item> Observer<Item> for LastObserver<Item> {
  #[inline]
  fn next(&mut self, value: Item) { self.last = Some(value); }

  fn error(self, err: RxError) { let _ = self.tx.send(Err(err)); }

  fn complete(self) { let _ = self.tx.send(Ok(self.last)); }

  #[inline]
  fn is_finished(&self) -> bool { self.tx.is_canceled() }
}

/// Subscribes to `source` and parks the current thread until it terminates.
///
/// A source that drops its observer without a terminal signal yields
/// [`RxError::Interrupted`].
pub(crate) fn last_value<Item, S>(source: S) -> LastResult<Item>
where
  S: Observable<Item>,
  Item: Send + 'static,
{
  let (tx, rx) = oneshot::channel();
  let _subscription = subscribe_observer(source, LastObserver { last: None, tx });
  futures::executor::block_on(rx).unwrap_or(Err(RxError::Interrupted))
}
