//! Worker results reaching the main context.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::bounded;
use parking_lot::Mutex;
use quadrant_core::{ContextError, MainContext, Recomputer, Signal, ThreadPool, ThreadPoolConfig};

fn pool(threads: usize) -> Arc<ThreadPool> {
    Arc::new(ThreadPool::new(ThreadPoolConfig::with_threads(threads)).unwrap())
}

#[test]
fn callbacks_run_on_owning_thread() {
    let context = MainContext::new();
    let owner = thread::current().id();
    let workers = pool(2);
    let seen = Arc::new(Mutex::new(Vec::new()));

    for i in 0..4 {
        let seen = seen.clone();
        workers.spawn_with_callback(
            move || i * 10,
            &context.handle(),
            move |value| seen.lock().push((value, thread::current().id())),
        );
    }

    assert!(context.process_until(Duration::from_secs(5), || seen.lock().len() == 4));
    let seen = seen.lock();
    assert!(seen.iter().all(|(_, thread)| *thread == owner));

    let mut values: Vec<_> = seen.iter().map(|(value, _)| *value).collect();
    values.sort_unstable();
    assert_eq!(values, [0, 10, 20, 30]);
}

#[test]
fn posting_to_dropped_context_fails() {
    let context = MainContext::new();
    let handle = context.handle();
    drop(context);

    assert!(matches!(handle.post(|| {}), Err(ContextError::Closed)));
}

#[test]
fn results_for_dropped_context_are_discarded() {
    let context = MainContext::new();
    let handle = context.handle();
    let workers = pool(1);
    let delivered = Arc::new(AtomicUsize::new(0));
    drop(context);

    let counter = delivered.clone();
    workers.spawn_with_callback(|| 1, &handle, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while workers.active_tasks() > 0 && std::time::Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(delivered.load(Ordering::SeqCst), 0);
}

#[test]
fn superseded_request_never_reaches_consumer() {
    let context = MainContext::new();
    let workers = pool(2);
    let recomputer = Recomputer::new("test", workers.clone(), context.handle());
    let applied = Arc::new(Signal::<&'static str>::new());
    let log = Arc::new(Mutex::new(Vec::new()));
    let first_completed = Arc::new(AtomicUsize::new(0));

    let sink = log.clone();
    applied.connect(move |label| sink.lock().push(*label));

    let (started, wait_started) = bounded::<()>(1);
    let (release, gate) = bounded::<()>(1);
    let signal = applied.clone();
    let completed = first_completed.clone();
    recomputer.submit(
        move |_token| {
            let _ = started.send(());
            let _ = gate.recv_timeout(Duration::from_secs(5));
            completed.fetch_add(1, Ordering::SeqCst);
            Some("first")
        },
        move |label| signal.emit(label),
    );
    wait_started.recv_timeout(Duration::from_secs(2)).unwrap();

    let signal = applied.clone();
    recomputer.submit(|_token| Some("second"), move |label| signal.emit(label));

    assert!(context.process_until(Duration::from_secs(5), || recomputer.is_idle()));
    release.send(()).unwrap();
    assert!(context.process_until(Duration::from_secs(5), || workers.active_tasks() == 0));
    context.process_pending();

    assert_eq!(first_completed.load(Ordering::SeqCst), 1);
    assert_eq!(*log.lock(), ["second"]);
}
