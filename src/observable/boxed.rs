//! Type-erased streams.
//!
//! Every operator returns its own concrete type, so two pipelines built
//! differently cannot be stored in one variable or returned from one closure.
//! `box_it` erases the type behind [`BoxOp`].

use crate::{
  observer::BoxObserver,
  prelude::*,
  subscription::BoxedSubscription,
};

/// Object-safe mirror of [`Observable`].
pub trait DynObservable<Item>: Send {
  fn box_subscribe(self: Box<Self>, observer: BoxObserver<Item>) -> BoxedSubscription;
}

impl<Item, S> DynObservable<Item> for S
where
  S: Observable<Item> + Send,
  Item: 'static,
{
  fn box_subscribe(self: Box<Self>, observer: BoxObserver<Item>) -> BoxedSubscription {
    BoxedSubscription::new((*self).actual_subscribe(observer))
  }
}

/// A stream whose concrete type has been erased.
pub struct BoxOp<Item>(Box<dyn DynObservable<Item>>);

impl<Item: 'static> BoxOp<Item> {
  pub fn new(source: impl Observable<Item> + Send + 'static) -> Self { BoxOp(Box::new(source)) }
}

impl<Item: 'static> Observable<Item> for BoxOp<Item> {
  type Unsub = BoxedSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item> + Send + 'static,
  {
    self.0.box_subscribe(Box::new(observer))
  }
}
