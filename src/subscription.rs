//! Cancellation handles.
//!
//! Every `actual_subscribe` returns a [`Subscription`]. Operators combine the
//! handles of their upstreams, inner streams, and scheduled tasks so that
//! unsubscribing the outermost one releases everything beneath it.

use crate::rc::{MutArc, RcDeref, RcDerefMut};
use smallvec::SmallVec;
use std::fmt::{Debug, Formatter};

/// Handle returned from `Observable::actual_subscribe` to allow
/// unsubscribing.
pub trait Subscription {
  /// Deregisters a stream before it has finished delivering all events.
  fn unsubscribe(self);

  fn is_closed(&self) -> bool;
}

/// Synchronous sources have nothing left to cancel once they return.
impl Subscription for () {
  #[inline]
  fn unsubscribe(self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

impl<T: Subscription> Subscription for Option<T> {
  fn unsubscribe(self) {
    if let Some(inner) = self {
      inner.unsubscribe()
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().map_or(true, Subscription::is_closed) }
}

// ============================================================================
// BoxedSubscription
// ============================================================================

/// Helper trait for calling unsubscribe on boxed trait objects
///
/// Since `Subscription::unsubscribe(self)` requires `Sized`, we need this
/// workaround trait to enable `Box<dyn Subscription>` to call unsubscribe.
pub trait BoxedSubscriptionInner: Send {
  fn boxed_unsubscribe(self: Box<Self>);
  fn boxed_is_closed(&self) -> bool;
}

impl<T: Subscription + Send> BoxedSubscriptionInner for T {
  #[inline]
  fn boxed_unsubscribe(self: Box<Self>) { (*self).unsubscribe() }

  #[inline]
  fn boxed_is_closed(&self) -> bool { self.is_closed() }
}

/// A type-erased subscription, so heterogeneous handles can share one
/// teardown list.
pub struct BoxedSubscription(Box<dyn BoxedSubscriptionInner>);

impl BoxedSubscription {
  pub fn new(subscription: impl Subscription + Send + 'static) -> Self {
    BoxedSubscription(Box::new(subscription))
  }
}

impl Subscription for BoxedSubscription {
  #[inline]
  fn unsubscribe(self) { self.0.boxed_unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.boxed_is_closed() }
}

impl Debug for BoxedSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BoxedSubscription")
      .field("is_closed", &self.is_closed())
      .finish()
  }
}

// ============================================================================
// MultiSubscription
// ============================================================================

/// A clonable collection of teardowns. Unsubscribing any clone closes all of
/// them; a teardown appended after closing is unsubscribed immediately.
#[derive(Clone, Default)]
pub struct MultiSubscription(MutArc<Inner>);

#[derive(Default)]
struct Inner {
  closed: bool,
  teardown: SmallVec<[BoxedSubscription; 2]>,
}

impl MultiSubscription {
  pub fn append(&self, subscription: impl Subscription + Send + 'static) {
    let mut inner = self.0.rc_deref_mut();
    if inner.closed {
      drop(inner);
      subscription.unsubscribe();
    } else {
      inner.teardown.retain(|v| !v.is_closed());
      inner.teardown.push(BoxedSubscription::new(subscription));
    }
  }

  pub fn teardown_size(&self) -> usize { self.0.rc_deref().teardown.len() }
}

impl Subscription for MultiSubscription {
  fn unsubscribe(self) {
    let teardown = {
      let mut inner = self.0.rc_deref_mut();
      if inner.closed {
        return;
      }
      inner.closed = true;
      std::mem::take(&mut inner.teardown)
    };
    for v in teardown {
      v.unsubscribe();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.rc_deref().closed }
}

impl Debug for MultiSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let inner = self.0.rc_deref();
    f.debug_struct("MultiSubscription")
      .field("closed", &inner.closed)
      .field("teardown_count", &inner.teardown.len())
      .finish()
  }
}

// ============================================================================
// ZipSubscription / ClosureSubscription
// ============================================================================

/// Pairs the upstream handle of an operator with the handle of its own
/// scheduled work.
pub struct ZipSubscription<A, B> {
  a: A,
  b: B,
}

impl<A, B> ZipSubscription<A, B> {
  pub fn new(a: A, b: B) -> Self { Self { a, b } }
}

impl<A: Subscription, B: Subscription> Subscription for ZipSubscription<A, B> {
  fn unsubscribe(self) {
    self.a.unsubscribe();
    self.b.unsubscribe();
  }

  fn is_closed(&self) -> bool { self.a.is_closed() && self.b.is_closed() }
}

/// Runs a closure on unsubscribe. Useful as the teardown returned from
/// `observable::create`.
///
/// The closure runs only by consuming the subscription, so one that is still
/// held has not run. It is never reported closed and stays in a
/// `MultiSubscription` until that list is unsubscribed.
pub struct ClosureSubscription<F>(pub F);

impl<F: FnOnce()> Subscription for ClosureSubscription<F> {
  #[inline]
  fn unsubscribe(self) { (self.0)() }

  #[inline]
  fn is_closed(&self) -> bool { false }
}

// ============================================================================
// SubscriptionGuard
// ============================================================================

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard<T: Subscription>(Option<T>);

impl<T: Subscription> SubscriptionGuard<T> {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: T) -> SubscriptionGuard<T> { SubscriptionGuard(Some(subscription)) }
}

impl<T: Subscription> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) {
    if let Some(subscription) = self.0.take() {
      subscription.unsubscribe()
    }
  }
}
