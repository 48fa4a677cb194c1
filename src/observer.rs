//! Observer trait and implementations
//!
//! The Observer trait defines the consumer of data in the reactive pattern.
//! It provides three methods: next (for values), error (for failures), and
//! complete (for stream completion).

use crate::error::RxError;

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: The consumer of data in reactive programming
///
/// An Observer receives values, errors, and completion notifications from
/// an Observable.
pub trait Observer<Item> {
  /// Receive the next value from the observable
  fn next(&mut self, value: Item);

  /// Handle an error from the observable
  ///
  /// This consumes the observer, as no more values can be emitted after an
  /// error
  fn error(self, err: RxError);

  /// Handle completion of the observable
  ///
  /// This consumes the observer, as no more values can be emitted after
  /// completion
  fn complete(self);

  /// Checks if the observer will not accept more values.
  ///
  /// Synchronous sources (like `from_iter`) poll this between emissions so
  /// they stop producing once the downstream has terminated or been disposed.
  fn is_finished(&self) -> bool;
}

// ============================================================================
// Emitter Trait
// ============================================================================

/// A trait for emitting items to an Observer via mutable reference.
///
/// Unlike `Observer`, which consumes `self` for `error` and `complete`,
/// `Emitter` takes `&mut self` for all methods so `create` can hand a
/// `&mut dyn Emitter` to caller code without leaking the concrete observer
/// type of the chain. Terminal calls close the emitter; later calls are
/// ignored.
pub trait Emitter<Item> {
  fn next(&mut self, value: Item);
  fn error(&mut self, err: RxError);
  fn complete(&mut self);
  fn is_finished(&self) -> bool;
}

// ============================================================================
// DynObserver Trait - Object-safe Observer
// ============================================================================

/// Helper trait to enable object-safe Observers (`Box<dyn DynObserver>`).
///
/// `Observer` is not object-safe because terminal methods take `self` by
/// value. DynObserver mirrors the interface with boxed receivers.
pub trait DynObserver<Item> {
  fn box_next(&mut self, value: Item);
  fn box_error(self: Box<Self>, err: RxError);
  fn box_complete(self: Box<Self>);
  fn box_is_finished(&self) -> bool;
}

impl<T, Item> DynObserver<Item> for T
where
  T: Observer<Item>,
{
  fn box_next(&mut self, value: Item) { self.next(value); }
  fn box_error(self: Box<Self>, err: RxError) { (*self).error(err); }
  fn box_complete(self: Box<Self>) { (*self).complete(); }
  fn box_is_finished(&self) -> bool { self.is_finished() }
}

/// Boxed observer used where the observer type must be erased.
pub type BoxObserver<Item> = Box<dyn DynObserver<Item> + Send>;

impl<Item> Observer<Item> for BoxObserver<Item> {
  #[inline]
  fn next(&mut self, value: Item) { (**self).box_next(value) }

  #[inline]
  fn error(self, err: RxError) { self.box_error(err) }

  #[inline]
  fn complete(self) { self.box_complete() }

  #[inline]
  fn is_finished(&self) -> bool { (**self).box_is_finished() }
}

// ============================================================================
// FnObserver - Closure adapter
// ============================================================================

/// Adapts three closures into an `Observer`.
///
/// This is what `subscribe_all` and `subscribe_err` build from their
/// arguments.
#[derive(Clone)]
pub struct FnObserver<N, E, C> {
  pub next: N,
  pub error: E,
  pub complete: C,
}

impl<Item, N, E, C> Observer<Item> for FnObserver<N, E, C>
where
  N: FnMut(Item),
  E: FnOnce(RxError),
  C: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value); }

  #[inline]
  fn error(self, err: RxError) { (self.error)(err); }

  #[inline]
  fn complete(self) { (self.complete)(); }

  #[inline]
  fn is_finished(&self) -> bool { false }
}

// ============================================================================
// Tests
// ============================================================================
