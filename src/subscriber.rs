//! The subscription engine.
//!
//! Every `subscribe` call goes through [`subscribe_observer`], which wraps the
//! caller's observer in a [`SafeObserver`] and drives one subscription
//! through its lifecycle:
//!
//! ```text
//! Idle --subscribe--> Active --error/complete--> Terminated
//!                        \------dispose--------> Disposed
//! ```
//!
//! Once a subscription leaves `Active` no further event reaches the observer,
//! and the upstream subscription (with every timer and inner subscription it
//! owns) is released.

use std::{
  any::Any,
  fmt::{Debug, Formatter},
  panic::{catch_unwind, AssertUnwindSafe},
  sync::Arc,
};

use parking_lot::Mutex;

use crate::{
  error::RxError,
  observable::Observable,
  observer::Observer,
  subscription::{MultiSubscription, Subscription, SubscriptionGuard},
};

/// Where one subscription is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
  /// Created, not yet connected to its source.
  Idle,
  /// Events flow to the observer.
  Active,
  /// The observer received `error` or `complete`.
  Terminated,
  /// Cancelled through [`Disposable::dispose`].
  Disposed,
}

pub(crate) struct SubscriptionCore {
  state: Mutex<LifecycleState>,
  upstream: MultiSubscription,
}

impl SubscriptionCore {
  fn new() -> Self {
    SubscriptionCore {
      state: Mutex::new(LifecycleState::Idle),
      upstream: MultiSubscription::default(),
    }
  }

  fn activate(&self) {
    let mut state = self.state.lock();
    if *state == LifecycleState::Idle {
      *state = LifecycleState::Active;
    }
  }

  fn is_active(&self) -> bool { *self.state.lock() == LifecycleState::Active }

  /// `Active -> Terminated`. Returns false when the subscription had already
  /// left `Active`.
  fn terminate(&self) -> bool { self.transition(LifecycleState::Terminated) }

  fn dispose(&self) -> bool { self.transition(LifecycleState::Disposed) }

  fn transition(&self, to: LifecycleState) -> bool {
    let mut state = self.state.lock();
    match *state {
      LifecycleState::Idle | LifecycleState::Active => {
        *state = to;
        true
      }
      LifecycleState::Terminated | LifecycleState::Disposed => false,
    }
  }

  fn release_upstream(&self) { self.upstream.clone().unsubscribe(); }
}

// ============================================================================
// SafeObserver
// ============================================================================

/// Wraps the caller's observer and enforces the subscription contract.
///
/// - Calls arriving when the subscription is not `Active` are dropped.
/// - A panic in the observer's `next` becomes one `RxError::Downstream`
///   delivered to the observer's `error`, after which upstream is released.
/// - A panic in `error` or `complete` is logged; there is no channel left to
///   report it on.
pub struct SafeObserver<O> {
  observer: Option<O>,
  core: Arc<SubscriptionCore>,
}

impl<O> SafeObserver<O> {
  fn deliver_terminal(&self, signal: &'static str, f: impl FnOnce()) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(f)) {
      tracing::error!(signal, panic = %panic_message(&*payload), "subscriber handler panicked");
    }
    self.core.release_upstream();
  }
}

impl<Item, O: Observer<Item>> Observer<Item> for SafeObserver<O> {
  fn next(&mut self, value: Item) {
    if !self.core.is_active() {
      return;
    }
    let Some(observer) = self.observer.as_mut() else {
      return;
    };
    if let Err(payload) = catch_unwind(AssertUnwindSafe(|| observer.next(value))) {
      let message = panic_message(&*payload);
      tracing::error!(panic = %message, "subscriber panicked in next");
      if let Some(observer) = self.observer.take() {
        if self.core.terminate() {
          let err = RxError::downstream(message);
          self.deliver_terminal("error", move || observer.error(err));
        }
      }
    }
  }

  fn error(mut self, err: RxError) {
    if let Some(observer) = self.observer.take() {
      if self.core.terminate() {
        tracing::debug!(error = %err, "subscription terminated with error");
        self.deliver_terminal("error", move || observer.error(err));
      }
    }
  }

  fn complete(mut self) {
    if let Some(observer) = self.observer.take() {
      if self.core.terminate() {
        self.deliver_terminal("complete", move || observer.complete());
      }
    }
  }

  fn is_finished(&self) -> bool { self.observer.is_none() || !self.core.is_active() }
}

/// Renders a panic payload the way the standard panic hook does.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(s) = payload.downcast_ref::<&str>() {
    (*s).to_owned()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "unknown panic".to_owned()
  }
}

// ============================================================================
// Disposable
// ============================================================================

/// Handle to one active subscription.
///
/// Clones refer to the same subscription. `dispose` is idempotent and does
/// nothing once the stream has terminated on its own.
#[derive(Clone)]
pub struct Disposable(Arc<SubscriptionCore>);

impl Disposable {
  /// Stops event delivery and releases upstream, timers and inner
  /// subscriptions.
  ///
  /// Never blocks on the observer: a `next` already running on another
  /// thread may finish, but no new `next` starts once this returns. Calling
  /// `dispose` from inside the observer's own `next` is allowed.
  pub fn dispose(&self) {
    if self.0.dispose() {
      tracing::debug!("subscription disposed");
      self.0.release_upstream();
    }
  }

  /// True after `dispose` was called on this subscription.
  pub fn is_disposed(&self) -> bool { self.state() == LifecycleState::Disposed }

  pub fn state(&self) -> LifecycleState { *self.0.state.lock() }

  /// Disposes the subscription when the returned guard goes out of scope.
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard<Self> { SubscriptionGuard::new(self) }
}

impl Subscription for Disposable {
  fn unsubscribe(self) { self.dispose() }

  fn is_closed(&self) -> bool { self.state() != LifecycleState::Active }
}

impl Debug for Disposable {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Disposable")
      .field("state", &self.state())
      .finish()
  }
}

/// Connects `observer` to `source` through a fresh subscription core.
pub fn subscribe_observer<Item, S, O>(source: S, observer: O) -> Disposable
where
  S: Observable<Item>,
  O: Observer<Item> + Send + 'static,
{
  let core = Arc::new(SubscriptionCore::new());
  core.activate();
  tracing::trace!("subscription active");
  let unsub = source.actual_subscribe(SafeObserver { observer: Some(observer), core: core.clone() });
  // Appending to an already released list unsubscribes immediately, which
  // covers sources that terminated or were disposed during subscribe.
  core.upstream.append(unsub);
  Disposable(core)
}

// ============================================================================
// Subscriber
// ============================================================================

type NextHandler<Item> = Box<dyn FnMut(Item) + Send>;
type ErrorHandler = Box<dyn FnOnce(RxError) + Send>;
type CompleteHandler = Box<dyn FnOnce() + Send>;

/// A set of handlers assembled step by step and passed to
/// `ObservableExt::subscribe_with`.
///
/// ```rust
/// use rxlite::prelude::*;
///
/// let subscriber = Subscriber::new()
///   .on_next(|v: i32| println!("{v}"))
///   .on_error(|err| eprintln!("{err}"));
/// observable::range(1, 3).map(|v| v as i32).subscribe_with(subscriber).unwrap();
///
/// // Without an error handler the subscription is refused.
/// let refused = observable::of(1).subscribe_with(Subscriber::new().on_next(|_| {}));
/// assert!(matches!(refused, Err(RxError::MissingErrorHandler)));
/// ```
pub struct Subscriber<Item> {
  next: Option<NextHandler<Item>>,
  error: Option<ErrorHandler>,
  complete: Option<CompleteHandler>,
}

impl<Item> Default for Subscriber<Item> {
  fn default() -> Self { Subscriber { next: None, error: None, complete: None } }
}

impl<Item: 'static> Subscriber<Item> {
  pub fn new() -> Self { Self::default() }

  pub fn on_next(mut self, f: impl FnMut(Item) + Send + 'static) -> Self {
    self.next = Some(Box::new(f));
    self
  }

  pub fn on_error(mut self, f: impl FnOnce(RxError) + Send + 'static) -> Self {
    self.error = Some(Box::new(f));
    self
  }

  pub fn on_complete(mut self, f: impl FnOnce() + Send + 'static) -> Self {
    self.complete = Some(Box::new(f));
    self
  }

  /// Checks the handler set and turns it into an observer.
  pub(crate) fn into_observer(self) -> Result<HandlerObserver<Item>, RxError> {
    let error = self.error.ok_or(RxError::MissingErrorHandler)?;
    Ok(HandlerObserver { next: self.next, error, complete: self.complete })
  }
}

pub(crate) struct HandlerObserver<Item> {
  next: Option<NextHandler<Item>>,
  error: ErrorHandler,
  complete: Option<CompleteHandler>,
}

impl<Item> Observer<Item> for HandlerObserver<Item> {
  fn next(&mut self, value: Item) {
    if let Some(next) = self.next.as_mut() {
      next(value)
    }
  }

  fn error(self, err: RxError) { (self.error)(err) }

  fn complete(self) {
    if let Some(complete) = self.complete {
      complete()
    }
  }

  fn is_finished(&self) -> bool { false }
}
