use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chainerr_core::{
    ChainableError, ObserverRegistry, add_labeled_observer, add_observer, log_observer,
    remove_labeled_observer, remove_observer,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serial_test::serial;

fn reset_global() {
    ObserverRegistry::global().clear();
}

#[test]
#[serial]
fn every_global_observer_runs_once_before_constructor_returns() {
    reset_global();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let hits = first.clone();
    let messages = seen.clone();
    add_observer(move |err: &ChainableError| {
        hits.fetch_add(1, Ordering::SeqCst);
        messages.lock().push(err.message().to_string());
    });
    let hits = second.clone();
    add_labeled_observer("audit", move |_: &ChainableError| {
        hits.fetch_add(1, Ordering::SeqCst);
    });

    let _err = ChainableError::new("observed");
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 1);
    assert_eq!(*seen.lock(), vec!["observed".to_string()]);

    assert!(remove_observer());
    let _err = ChainableError::new("again");
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 2);
    reset_global();
}

#[test]
#[serial]
fn relabeling_keeps_only_the_latest_observer() {
    reset_global();
    let old = Arc::new(AtomicUsize::new(0));
    let new = Arc::new(AtomicUsize::new(0));

    let hits = old.clone();
    add_labeled_observer("x", move |_: &ChainableError| {
        hits.fetch_add(1, Ordering::SeqCst);
    });
    let hits = new.clone();
    add_labeled_observer("x", move |_: &ChainableError| {
        hits.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(ObserverRegistry::global().labels(), vec!["x".to_string()]);
    let _err = ChainableError::new("once");
    assert_eq!(old.load(Ordering::SeqCst), 0);
    assert_eq!(new.load(Ordering::SeqCst), 1);
    reset_global();
}

#[test]
#[serial]
fn removing_unknown_label_is_noop() {
    reset_global();
    add_labeled_observer("kept", |_: &ChainableError| {});
    assert!(!remove_labeled_observer("never-registered"));
    assert!(ObserverRegistry::global().contains("kept"));
    reset_global();
}

#[test]
#[serial]
fn observer_panic_reaches_the_constructor_caller() {
    reset_global();
    add_labeled_observer("faulty", |err: &ChainableError| {
        panic!("observer rejected {}", err.message());
    });

    let outcome = catch_unwind(AssertUnwindSafe(|| ChainableError::new("boom")));
    assert!(outcome.is_err());
    reset_global();
}

#[test]
#[serial]
fn injected_registry_bypasses_global() {
    reset_global();
    let global_hits = Arc::new(AtomicUsize::new(0));
    let hits = global_hits.clone();
    add_observer(move |_: &ChainableError| {
        hits.fetch_add(1, Ordering::SeqCst);
    });

    let local = ObserverRegistry::new();
    let local_hits = Arc::new(AtomicUsize::new(0));
    let hits = local_hits.clone();
    local.add_observer(move |_: &ChainableError| {
        hits.fetch_add(1, Ordering::SeqCst);
    });

    let _err = ChainableError::builder("local only").registry(&local).build();
    assert_eq!(global_hits.load(Ordering::SeqCst), 0);
    assert_eq!(local_hits.load(Ordering::SeqCst), 1);
    reset_global();
}

#[test]
#[serial]
fn failed_validation_notifies_nobody() {
    reset_global();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    add_observer(move |_: &ChainableError| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let result = ChainableError::from_args(chainerr_core::ArgValue::Float(1.5), None, None);
    assert!(result.is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    reset_global();
}

#[test]
#[serial]
fn log_observer_can_be_registered() {
    reset_global();
    add_labeled_observer("log", log_observer());
    let err = ChainableError::builder("logged").code(7).build();
    assert_eq!(err.code(), Some(7));
    reset_global();
}

#[test]
#[serial]
fn observers_see_concurrent_constructions() {
    reset_global();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    add_observer(move |_: &ChainableError| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let handles: Vec<_> = (0..4)
        .map(|i| std::thread::spawn(move || ChainableError::new(format!("thread {i}")).code()))
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(hits.load(Ordering::SeqCst), 4);
    reset_global();
}
