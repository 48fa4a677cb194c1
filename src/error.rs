//! The failure value carried by the `error` channel.
//!
//! Every failure a stream can report is an [`RxError`]. Sources and operators
//! return it from their closures, the subscription engine produces it when a
//! subscriber handler panics, and subscribers receive exactly one of it on
//! the `error` channel.

use std::{error::Error as StdError, sync::Arc};

/// The underlying cause attached to a failure, shared so errors stay `Clone`.
pub type Cause = Arc<dyn StdError + Send + Sync>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RxError {
  /// The production logic of a source failed.
  #[error("source failed: {message}")]
  Source {
    message: String,
    #[source]
    cause: Option<Cause>,
  },

  /// A transform closure (`try_map`, `try_filter`, `try_flat_map`) failed.
  #[error("operator failed: {message}")]
  Operator {
    message: String,
    #[source]
    cause: Option<Cause>,
  },

  /// A subscriber handler panicked while receiving a value.
  #[error("subscriber panicked: {message}")]
  Downstream { message: String },

  /// `subscribe_with` was given a subscriber without an error handler.
  #[error("subscribe requires an error handler")]
  MissingErrorHandler,

  /// A worker pool could not be created.
  #[error("scheduler unavailable: {message}")]
  Scheduler {
    message: String,
    #[source]
    cause: Option<Cause>,
  },

  /// A blocking wait saw the stream stop without a terminal signal.
  #[error("stream stopped without a terminal signal")]
  Interrupted,
}

impl RxError {
  pub fn source_failure(message: impl Into<String>) -> Self {
    RxError::Source { message: message.into(), cause: None }
  }

  pub fn operator_failure(message: impl Into<String>) -> Self {
    RxError::Operator { message: message.into(), cause: None }
  }

  pub fn downstream(message: impl Into<String>) -> Self {
    RxError::Downstream { message: message.into() }
  }

  /// Attaches the originating error. Variants without a cause slot are
  /// returned unchanged.
  pub fn with_cause<E>(self, cause: E) -> Self
  where
    E: StdError + Send + Sync + 'static,
  {
    let cause: Option<Cause> = Some(Arc::new(cause));
    match self {
      RxError::Source { message, .. } => RxError::Source { message, cause },
      RxError::Operator { message, .. } => RxError::Operator { message, cause },
      RxError::Scheduler { message, .. } => RxError::Scheduler { message, cause },
      other => other,
    }
  }

  /// The human-readable message, without the variant prefix.
  pub fn message(&self) -> &str {
    match self {
      RxError::Source { message, .. }
      | RxError::Operator { message, .. }
      | RxError::Scheduler { message, .. }
      | RxError::Downstream { message } => message,
      RxError::MissingErrorHandler => "missing error handler",
      RxError::Interrupted => "interrupted",
    }
  }
}
