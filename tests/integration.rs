//! Integration tests for rxlite
//!
//! Tests operator chains, the subscription lifecycle, and threading behavior
//! through the public API only.

use std::{
  sync::{
    atomic::{AtomicUsize, Ordering},
    mpsc, Arc, Mutex,
  },
  thread,
};

use rxlite::prelude::*;

type Events = Arc<Mutex<Vec<String>>>;

/// Subscribes and records every event as a string.
fn record<Item, S>(source: S) -> (Events, Disposable)
where
  S: Observable<Item>,
  Item: std::fmt::Debug + Send + 'static,
{
  let events = Events::default();
  let (e1, e2, e3) = (events.clone(), events.clone(), events.clone());
  let disposable = source.subscribe_all(
    move |v| e1.lock().unwrap().push(format!("{v:?}")),
    move |err| e2.lock().unwrap().push(format!("error: {}", err.message())),
    move || e3.lock().unwrap().push("complete".to_owned()),
  );
  (events, disposable)
}

fn snapshot(events: &Events) -> Vec<String> { events.lock().unwrap().clone() }

#[test]
fn test_basic_chain_integration() {
  let (events, disposable) = record(
    observable::from_iter(1..=10)
      .map(|x| x * 2)
      .filter(|&x| x > 10)
      .take(3),
  );

  assert_eq!(snapshot(&events), vec!["12", "14", "16", "complete"]);
  assert_eq!(disposable.state(), LifecycleState::Terminated);
}

#[test]
fn test_map_keeps_order_and_completion() {
  let (events, _) = record(observable::just(["a", "bb", "ccc"]).map(str::len));
  assert_eq!(snapshot(&events), vec!["1", "2", "3", "complete"]);

  let (events, _) = record(
    observable::just([1, 2]).merge(observable::throw_err::<i32>(RxError::source_failure("cut"))).map(|v| v + 1),
  );
  assert_eq!(snapshot(&events), vec!["2", "3", "error: cut"]);
}

#[test]
fn test_zip_is_bounded_by_shorter_source() {
  let (events, _) = record(
    observable::just([1, 2, 3]).zip_with(observable::just(["x", "y"]), |n, s| format!("{s}{n}")),
  );
  assert_eq!(snapshot(&events), vec!["\"x1\"", "\"y2\"", "complete"]);
}

#[test]
fn test_create_enforces_terminal_once() {
  let (events, disposable) = record(observable::create(|emitter: &mut dyn Emitter<i32>| {
    emitter.next(1);
    emitter.next(2);
    emitter.error(RxError::source_failure("E"));
    emitter.next(3);
    emitter.complete();
    Ok(())
  }));

  assert_eq!(snapshot(&events), vec!["1", "2", "error: E"]);
  assert_eq!(disposable.state(), LifecycleState::Terminated);
}

#[test]
fn test_debounce_on_virtual_clock() {
  let scheduler = TestScheduler::default();
  let times = Arc::new(Mutex::new(vec![]));
  let (c_times, c_scheduler) = (times.clone(), scheduler.clone());
  let delayed = scheduler.clone();

  observable::from_iter([(1, 0_u64), (2, 50), (3, 300)])
    .flat_map(move |(v, at)| observable::of(v).delay(Duration::from_millis(at), delayed.clone()))
    .merge(observable::never::<i32>())
    .debounce(Duration::from_millis(100), scheduler.clone())
    .subscribe_err(
      move |v| c_times.lock().unwrap().push((v, c_scheduler.now().as_millis())),
      |_| unreachable!(),
    );

  scheduler.advance_by(Duration::from_secs(1));
  assert_eq!(*times.lock().unwrap(), vec![(2, 150), (3, 400)]);
}

#[test]
fn test_flat_map_failure_tears_down_siblings() {
  let scheduler = TestScheduler::default();
  let cleanups = Arc::new(AtomicUsize::new(0));
  let c_cleanups = cleanups.clone();
  let c_scheduler = scheduler.clone();

  let (events, disposable) = record(observable::range(0, 5).flat_map(move |i| {
    let cleanups = c_cleanups.clone();
    let inner = observable::interval(Duration::from_millis(10), c_scheduler.clone())
      .try_map(move |tick| {
        if i == 3 && tick == 1 {
          Err(RxError::source_failure(format!("inner {i} failed")))
        } else {
          Ok(i)
        }
      })
      .box_it();
    observable::create(move |emitter: &mut dyn Emitter<i64>| {
      emitter.next(-1);
      Ok(ClosureSubscription(move || {
        cleanups.fetch_add(1, Ordering::SeqCst);
      }))
    })
    .merge(inner)
  }));

  scheduler.advance_by(Duration::from_millis(100));
  let events = snapshot(&events);
  assert_eq!(events.iter().filter(|e| e.starts_with("error")).count(), 1);
  assert_eq!(events.last().map(String::as_str), Some("error: inner 3 failed"));
  assert_eq!(cleanups.load(Ordering::SeqCst), 5);
  assert_eq!(disposable.state(), LifecycleState::Terminated);
  assert!(scheduler.is_empty());
}

#[test]
fn test_subscriber_requires_error_handler() {
  let rejected = observable::of(1).subscribe_with(Subscriber::<i32>::new().on_next(|_| {}));
  assert!(matches!(rejected, Err(RxError::MissingErrorHandler)));

  let seen = Arc::new(Mutex::new(vec![]));
  let c_seen = seen.clone();
  let accepted = observable::just([1, 2]).subscribe_with(
    Subscriber::new()
      .on_next(move |v| c_seen.lock().unwrap().push(v))
      .on_error(|_| {}),
  );
  assert!(accepted.is_ok());
  assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
}

#[test]
fn test_panicking_handler_becomes_error() {
  let errors = Arc::new(Mutex::new(vec![]));
  let c_errors = errors.clone();
  let disposable = observable::range(1, 10).subscribe_err(
    |v| {
      if v == 3 {
        panic!("cannot handle 3");
      }
    },
    move |err| c_errors.lock().unwrap().push(err),
  );

  let errors = errors.lock().unwrap();
  assert_eq!(errors.len(), 1);
  assert!(matches!(&errors[0], RxError::Downstream { message } if message == "cannot handle 3"));
  assert_eq!(disposable.state(), LifecycleState::Terminated);
}

#[test]
fn test_dispose_from_inside_next() {
  let scheduler = TestScheduler::default();
  let seen = Arc::new(Mutex::new(vec![]));
  let slot: Arc<Mutex<Option<Disposable>>> = Arc::default();
  let (c_seen, c_slot) = (seen.clone(), slot.clone());

  let disposable = observable::range(0, 10)
    .delay(Duration::from_millis(10), scheduler.clone())
    .subscribe_err(
      move |v| {
        c_seen.lock().unwrap().push(v);
        if v == 3 {
          if let Some(d) = c_slot.lock().unwrap().as_ref() {
            d.dispose();
          }
        }
      },
      |_| unreachable!(),
    );
  *slot.lock().unwrap() = Some(disposable.clone());

  scheduler.advance_by(Duration::from_millis(10));
  assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3]);
  assert!(disposable.is_disposed());
  assert!(scheduler.is_empty());
}

#[cfg(feature = "futures-scheduler")]
#[test]
fn test_interval_dispose_stops_delivery_on_thread_pool() {
  let pool = ThreadPoolScheduler::shared();
  let ticks = Arc::new(AtomicUsize::new(0));
  let c_ticks = ticks.clone();
  let disposable = observable::interval(Duration::from_millis(1), pool).subscribe_err(
    move |_| {
      c_ticks.fetch_add(1, Ordering::SeqCst);
      thread::sleep(Duration::from_millis(2));
    },
    |_| unreachable!(),
  );

  while ticks.load(Ordering::SeqCst) < 3 {
    thread::sleep(Duration::from_millis(1));
  }
  disposable.dispose();
  let at_dispose = ticks.load(Ordering::SeqCst);
  thread::sleep(Duration::from_millis(30));
  assert_eq!(ticks.load(Ordering::SeqCst), at_dispose);
  assert!(disposable.is_disposed());
}

#[cfg(feature = "futures-scheduler")]
#[test]
fn test_dispose_does_not_wait_for_running_next() {
  let pool = ThreadPoolScheduler::shared();
  let handler_lock = Arc::new(Mutex::new(()));
  let started = Arc::new(AtomicUsize::new(0));
  let (started_tx, started_rx) = mpsc::channel();
  let (c_lock, c_started) = (handler_lock.clone(), started.clone());

  // The first tick blocks on a lock this thread holds while disposing.
  let held = handler_lock.lock().unwrap();
  let disposable = observable::interval(Duration::from_millis(1), pool).subscribe_err(
    move |_| {
      if c_started.fetch_add(1, Ordering::SeqCst) == 0 {
        let _ = started_tx.send(());
      }
      drop(c_lock.lock().unwrap());
    },
    |_| unreachable!(),
  );
  started_rx.recv().unwrap();

  let (done_tx, done_rx) = mpsc::channel();
  let c_disposable = disposable.clone();
  thread::spawn(move || {
    c_disposable.dispose();
    let _ = done_tx.send(());
  });
  assert!(done_rx.recv_timeout(Duration::from_secs(1)).is_ok());
  assert!(disposable.is_disposed());
  assert_eq!(started.load(Ordering::SeqCst), 1);

  drop(held);
  thread::sleep(Duration::from_millis(30));
  assert_eq!(started.load(Ordering::SeqCst), 1);
}

#[cfg(feature = "futures-scheduler")]
#[test]
fn test_flat_map_on_thread_pool() {
  let pool = ThreadPoolScheduler::shared();
  let seen = Arc::new(Mutex::new(vec![]));
  let c_seen = seen.clone();

  let last = observable::range(0, 50)
    .flat_map(move |v| observable::of(v).delay(Duration::from_millis((v % 5) as u64), pool.clone()))
    .tap(move |v| c_seen.lock().unwrap().push(*v))
    .blocking_last()
    .unwrap();

  assert!(last.is_some());
  let mut seen = seen.lock().unwrap().clone();
  seen.sort_unstable();
  assert_eq!(seen, (0..50).collect::<Vec<i64>>());
}

#[cfg(feature = "tokio-scheduler")]
#[tokio::test(flavor = "multi_thread")]
async fn test_debounce_on_tokio() {
  let scheduler = TokioScheduler::current();
  let (tx, rx) = tokio::sync::oneshot::channel();
  let seen = Arc::new(Mutex::new(vec![]));
  let c_seen = seen.clone();

  observable::just([1, 2, 3])
    .debounce(Duration::from_millis(20), scheduler)
    .subscribe_all(
      move |v| c_seen.lock().unwrap().push(v),
      |_| unreachable!(),
      move || {
        let _ = tx.send(());
      },
    );

  rx.await.unwrap();
  assert_eq!(*seen.lock().unwrap(), vec![3]);
}
