//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Sources live under `observable::`, e.g. `observable::just([1, 2])`.
pub use crate::observable;
// Core traits
pub use crate::observable::{BoxOp, Observable, ObservableExt};
pub use crate::observer::{BoxObserver, Emitter, FnObserver, Observer};
// Errors
pub use crate::error::RxError;
// Subscription engine
pub use crate::subscriber::{Disposable, LifecycleState, Subscriber};
pub use crate::subscription::{
  BoxedSubscription, ClosureSubscription, MultiSubscription, Subscription, SubscriptionGuard,
  ZipSubscription,
};
// Scheduler Core types
pub use crate::scheduler::{
  Duration, ImmediateScheduler, Instant, OnceTask, RepeatTask, Scheduler, TaskHandle, TestScheduler,
};
// Default Schedulers
#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::ThreadPoolScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioScheduler;
