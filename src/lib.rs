//! # rxlite: a minimal reactive stream engine
//!
//! Cold, push-based streams of values over time, composed with operators and
//! consumed by a three-channel observer (`next`, `error`, `complete`).
//!
//! ## Quick Start
//!
//! ```rust
//! use rxlite::prelude::*;
//!
//! observable::just([1, 2, 3, 4, 5])
//!   .map(|v| v * 2)
//!   .filter(|v| *v > 5)
//!   .subscribe_all(
//!     |v| println!("Received: {}", v),
//!     |err| println!("Error: {}", err),
//!     || println!("Stream completed!"),
//!   );
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A lazy description of a stream, consumed on subscribe |
//! | [`ObservableExt`] | Operators and subscribe entry points |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Disposable`] | Handle to cancel an active subscription |
//! | [`Scheduler`] | Where timed and concurrent work runs |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): `ThreadPoolScheduler` on the futures
//!   thread pool, with `futures-time` timers.
//! - **`tokio-scheduler`**: `TokioScheduler` on a tokio runtime handle.
//!
//! [`Observable`]: observable::Observable
//! [`ObservableExt`]: observable::ObservableExt
//! [`Observer`]: observer::Observer
//! [`Disposable`]: subscriber::Disposable
//! [`Scheduler`]: scheduler::Scheduler

pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subscriber;
pub mod subscription;
mod type_hint;

pub use prelude::*;
