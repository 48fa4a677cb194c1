use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

pub trait RcDeref {
  type Target<'a>
  where
    Self: 'a;
  fn rc_deref(&self) -> Self::Target<'_>;
}

pub trait RcDerefMut {
  type Target<'a>
  where
    Self: 'a;
  fn rc_deref_mut(&self) -> Self::Target<'_>;
}

/// Shared, lock-protected state handed to every half of a multi-source
/// operator and to the tasks it schedules.
pub struct MutArc<T>(Arc<Mutex<T>>);

impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(Mutex::new(t))) }
}

impl<T> Clone for MutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T: Default> Default for MutArc<T> {
  fn default() -> Self { Self::own(T::default()) }
}

impl<T> RcDeref for MutArc<T> {
  type Target<'a> = MutexGuard<'a, T> where Self: 'a;

  #[inline]
  fn rc_deref(&self) -> Self::Target<'_> { self.0.lock() }
}

impl<T> RcDerefMut for MutArc<T> {
  type Target<'a> = MutexGuard<'a, T> where Self: 'a;

  #[inline]
  fn rc_deref_mut(&self) -> Self::Target<'_> { self.0.lock() }
}
