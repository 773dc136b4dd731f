//! Integration tests for the poll loop against mock backends

use hydrajoy::device::{DeviceState, MockUinputBackend, UinputCall};
use hydrajoy::source::MockControllerLibrary;
use hydrajoy::{Bridge, Settings};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

fn fast_settings() -> Settings {
    Settings {
        poll_period_ms: 1,
        settle_delay_ms: 0,
        ..Settings::default()
    }
}

#[test]
fn test_run_until_interrupted() {
    let mut bridge = Bridge::new(MockControllerLibrary::new(), MockUinputBackend::new(), fast_settings());
    let running = bridge.running_flag();

    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        running.store(false, Ordering::SeqCst);
    });

    let summary = bridge.run().unwrap();
    stopper.join().unwrap();

    assert!(summary.ticks > 0);
    assert_eq!(summary.failed_writes, 0);

    // Every iteration completed its write before the loop exited
    let batches = bridge.device().backend().written_batches();
    assert_eq!(batches.len() as u64, summary.ticks);
    assert!(batches.iter().all(|b| b.len() == 45));

    let calls = bridge.device().backend().calls();
    assert_eq!(&calls[calls.len() - 2..], &[UinputCall::Destroy, UinputCall::Close]);
    assert_eq!(bridge.source().library().exit_calls(), 1);
}

#[test]
fn test_short_writes_do_not_stop_loop() {
    let mut backend = MockUinputBackend::new();
    backend.short_write_by(1);
    let mut bridge = Bridge::new(MockControllerLibrary::new(), backend, fast_settings());
    let running = bridge.running_flag();

    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        running.store(false, Ordering::SeqCst);
    });

    let summary = bridge.run().unwrap();
    stopper.join().unwrap();

    assert!(summary.ticks > 1);
    assert_eq!(summary.failed_writes, summary.ticks);

    // One write per tick, nothing re-sent
    let writes = bridge
        .device()
        .backend()
        .calls()
        .iter()
        .filter(|c| matches!(c, UinputCall::WriteEvents(_)))
        .count();
    assert_eq!(writes as u64, summary.ticks);
}

#[test]
fn test_failed_writes_do_not_stop_loop() {
    let mut backend = MockUinputBackend::new();
    backend.fail_writes(true);
    let mut bridge = Bridge::new(MockControllerLibrary::new(), backend, fast_settings());

    bridge.start().unwrap();
    assert!(bridge.tick().is_err());
    assert!(bridge.tick().is_err());
    assert_eq!(bridge.device().state(), DeviceState::Created);
    bridge.shutdown();
}

#[test]
fn test_secondary_path_fallback() {
    let backend = MockUinputBackend::with_accessible(&["/dev/uinput"]);
    let mut bridge = Bridge::new(MockControllerLibrary::new(), backend, fast_settings());

    bridge.start().unwrap();
    assert_eq!(bridge.device().opened_path(), Some(PathBuf::from("/dev/uinput").as_path()));
    bridge.shutdown();
}

#[test]
fn test_init_failure_touches_nothing() {
    let mut bridge = Bridge::new(
        MockControllerLibrary::failing_init(),
        MockUinputBackend::new(),
        fast_settings(),
    );

    assert!(bridge.run().is_err());
    assert_eq!(bridge.source().library().init_calls(), 1);
    assert_eq!(bridge.source().library().exit_calls(), 0);
    assert!(bridge.device().backend().calls().is_empty());
}

#[test]
fn test_selects_first_connected_base() {
    let library = MockControllerLibrary::with_bases(vec![false, false, true, true]);
    let mut bridge = Bridge::new(library, MockUinputBackend::new(), fast_settings());

    bridge.start().unwrap();
    assert_eq!(bridge.source().active_base(), Some(2));
    bridge.shutdown();
}
