//! Streams and the operators that compose them.
//!
//! An [`Observable`] is a lazy description of a stream. Nothing runs until it
//! is subscribed; each subscription consumes the description and builds its
//! own execution state, so subscribing to two clones of a stream gives two
//! independent executions.

use crate::{
  error::RxError,
  observer::{FnObserver, Observer},
  ops::{
    debounce::DebounceOp,
    delay::DelayOp,
    distinct_until_changed::DistinctUntilChangedOp,
    filter::{FilterOp, TryFilterOp},
    last::last_value,
    map::{MapOp, TryMapOp},
    merge::MergeOp,
    merge_all::MergeAllOp,
    take::TakeOp,
    tap::TapOp,
    zip::{pair, ZipOp},
  },
  scheduler::{Duration, Scheduler},
  subscriber::{subscribe_observer, Disposable, Subscriber},
  subscription::Subscription,
};

mod boxed;
mod create;
mod from_iter;
mod interval;
mod trivial;

pub use boxed::*;
pub use create::*;
pub use from_iter::*;
pub use interval::*;
pub use trivial::*;

/// A stream of `Item`s.
///
/// `actual_subscribe` is the hook operators and sources implement; callers go
/// through the `subscribe*` methods of [`ObservableExt`], which add the
/// subscription engine around the observer.
pub trait Observable<Item> {
  /// What `actual_subscribe` hands back to cancel the running stream.
  type Unsub: Subscription + Send + 'static;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item> + Send + 'static;
}

/// `flat_map` is `map` into inner streams, merged.
pub type FlatMapOp<S, F, Item, Inner> = MergeAllOp<MapOp<S, F, Item>, Inner>;
/// `try_flat_map` is `try_map` into inner streams, merged.
pub type TryFlatMapOp<S, F, Item, Inner> = MergeAllOp<TryMapOp<S, F, Item>, Inner>;

pub trait ObservableExt<Item>: Observable<Item> + Sized {
  /// Creates a new stream which calls a closure on each element and uses
  /// its return as the value.
  #[inline]
  fn map<B, F>(self, f: F) -> MapOp<Self, F, Item>
  where
    F: FnMut(Item) -> B,
  {
    MapOp::new(self, f)
  }

  /// Like `map`, but the closure may fail. The first `Err` is delivered as
  /// the stream's error and the upstream is cancelled.
  #[inline]
  fn try_map<B, F>(self, f: F) -> TryMapOp<Self, F, Item>
  where
    F: FnMut(Item) -> Result<B, RxError>,
  {
    TryMapOp::new(self, f)
  }

  /// Emit only those items for which the predicate returns `true`.
  #[inline]
  fn filter<F>(self, filter: F) -> FilterOp<Self, F>
  where
    F: FnMut(&Item) -> bool,
  {
    FilterOp::new(self, filter)
  }

  /// A fallible `filter`; an `Err` ends the stream with that error.
  #[inline]
  fn try_filter<F>(self, filter: F) -> TryFilterOp<Self, F>
  where
    F: FnMut(&Item) -> Result<bool, RxError>,
  {
    TryFilterOp::new(self, filter)
  }

  /// Calls `f` with a reference to every item before passing it on.
  #[inline]
  fn tap<F>(self, f: F) -> TapOp<Self, F>
  where
    F: FnMut(&Item),
  {
    TapOp::new(self, f)
  }

  /// Maps each item to an inner stream and merges every inner stream into
  /// the output.
  ///
  /// Inner streams run concurrently; values of one inner stream keep their
  /// order, values of different inner streams interleave. The output
  /// completes once the source and every inner stream have completed. The
  /// first error from any of them is delivered once and cancels all the
  /// others.
  #[inline]
  fn flat_map<Inner, F>(self, f: F) -> FlatMapOp<Self, F, Item, Inner>
  where
    F: FnMut(Item) -> Inner,
  {
    MergeAllOp::new(self.map(f))
  }

  /// `flat_map` with a factory that may fail to produce an inner stream.
  #[inline]
  fn try_flat_map<Inner, F>(self, f: F) -> TryFlatMapOp<Self, F, Item, Inner>
  where
    F: FnMut(Item) -> Result<Inner, RxError>,
  {
    MergeAllOp::new(self.try_map(f))
  }

  /// Flattens a stream of streams by merging the inner streams.
  #[inline]
  fn merge_all(self) -> MergeAllOp<Self, Item> { MergeAllOp::new(self) }

  /// Interleaves the items of two streams. Completes when both complete.
  #[inline]
  fn merge<S>(self, other: S) -> MergeOp<Self, S>
  where
    S: Observable<Item>,
  {
    MergeOp::new(self, other)
  }

  /// Pairs the n-th item of this stream with the n-th item of `other`.
  ///
  /// Emits `min(len_a, len_b)` pairs, and completes as soon as one side has
  /// completed with nothing left in its buffer.
  #[inline]
  fn zip<S, B>(self, other: S) -> ZipOp<Self, S, fn(Item, B) -> (Item, B), (Item, B)>
  where
    S: Observable<B>,
  {
    ZipOp::new(self, other, pair as fn(Item, B) -> (Item, B))
  }

  /// `zip`, combining each pair with `combine`.
  #[inline]
  fn zip_with<S, B, C, F>(self, other: S, combine: F) -> ZipOp<Self, S, F, (Item, B)>
  where
    S: Observable<B>,
    F: FnMut(Item, B) -> C,
  {
    ZipOp::new(self, other, combine)
  }

  /// Emits only the first `count` items, then completes.
  #[inline]
  fn take(self, count: usize) -> TakeOp<Self> { TakeOp::new(self, count) }

  /// Drops items equal to the item emitted just before them.
  #[inline]
  fn distinct_until_changed(self) -> DistinctUntilChangedOp<Self>
  where
    Item: PartialEq + Clone,
  {
    DistinctUntilChangedOp::new(self)
  }

  /// Emits each item `dur` after it was received, in the original order.
  /// Completion waits for the last delayed item; errors are not delayed.
  #[inline]
  fn delay<SD>(self, dur: Duration, scheduler: SD) -> DelayOp<Self, SD>
  where
    SD: Scheduler,
  {
    DelayOp::new(self, dur, scheduler)
  }

  /// Emits an item only after `dur` has passed without another item. A
  /// pending item is flushed when the source completes.
  #[inline]
  fn debounce<SD>(self, dur: Duration, scheduler: SD) -> DebounceOp<Self, SD>
  where
    SD: Scheduler,
  {
    DebounceOp::new(self, dur, scheduler)
  }

  /// Erases the concrete stream type.
  #[inline]
  fn box_it(self) -> BoxOp<Item>
  where
    Self: Send + 'static,
    Item: 'static,
  {
    BoxOp::new(self)
  }

  /// Subscribes an observer.
  fn subscribe<O>(self, observer: O) -> Disposable
  where
    O: Observer<Item> + Send + 'static,
  {
    subscribe_observer(self, observer)
  }

  /// Subscribes with a handler for every channel.
  fn subscribe_all<N, E, C>(self, next: N, error: E, complete: C) -> Disposable
  where
    N: FnMut(Item) + Send + 'static,
    E: FnOnce(RxError) + Send + 'static,
    C: FnOnce() + Send + 'static,
  {
    subscribe_observer(self, FnObserver { next, error, complete })
  }

  /// Subscribes with `next` and `error` handlers; completion is ignored.
  fn subscribe_err<N, E>(self, next: N, error: E) -> Disposable
  where
    N: FnMut(Item) + Send + 'static,
    E: FnOnce(RxError) + Send + 'static,
  {
    self.subscribe_all(next, error, || {})
  }

  /// Subscribes a [`Subscriber`] handler set. Fails with
  /// [`RxError::MissingErrorHandler`] when it has no error handler.
  fn subscribe_with(self, subscriber: Subscriber<Item>) -> Result<Disposable, RxError>
  where
    Item: 'static,
  {
    let observer = subscriber.into_observer()?;
    Ok(subscribe_observer(self, observer))
  }

  /// Blocks the calling thread until the stream terminates and returns its
  /// last item, or the error it failed with.
  ///
  /// Do not call this from a thread the stream itself needs to run on.
  fn blocking_last(self) -> Result<Option<Item>, RxError>
  where
    Item: Send + 'static,
  {
    last_value(self)
  }
}

impl<Item, T> ObservableExt<Item> for T where T: Observable<Item> {}
