//! Controller-to-joystick bridge
//!
//! This module drives the poll loop: bring up the controller source and the
//! virtual device, then fetch, translate and submit one batch per tick until
//! the running flag is cleared, then tear both down in reverse order.

use crate::config::Settings;
use crate::device::{DeviceError, DeviceManager, DeviceState, UinputBackend, VirtualDeviceCapabilities};
use crate::source::{ControllerLibrary, ControllerSource, DualSnapshot, SourceError};
use crate::translate::translate;
use log::{debug, error, info, trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("Bridge was already started")]
    AlreadyStarted,
}

/// Diagnostic lines for the controllers that are enabled and out of the dock
pub fn controller_diagnostics(snapshot: &DualSnapshot) -> Vec<String> {
    snapshot
        .iter()
        .filter(|c| c.is_active())
        .map(|c| format!("Controller {} buttons {:#x}", c.controller_index, c.buttons))
        .collect()
}

/// Counters for one run of the poll loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Completed fetch/translate/submit iterations
    pub ticks: u64,

    /// Iterations whose batch write was short or failed
    pub failed_writes: u64,
}

/// Owns the controller source and the virtual device for the process lifetime
pub struct Bridge<L: ControllerLibrary, B: UinputBackend> {
    source: ControllerSource<L>,
    device: DeviceManager<B>,
    settings: Settings,
    running: Arc<AtomicBool>,
}

impl<L: ControllerLibrary, B: UinputBackend> Bridge<L, B> {
    pub fn new(library: L, backend: B, settings: Settings) -> Self {
        Self {
            source: ControllerSource::new(library),
            device: DeviceManager::new(backend),
            settings,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Flag the loop checks once per iteration; store `false` to stop it
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn source(&self) -> &ControllerSource<L> {
        &self.source
    }

    pub fn device(&self) -> &DeviceManager<B> {
        &self.device
    }

    /// Bring up the controller source, then the virtual device.
    ///
    /// On failure everything this call started is torn down before returning.
    /// A second call is rejected without touching the running bridge.
    pub fn start(&mut self) -> Result<(), BridgeError> {
        if !self.source.is_uninitialized() || self.device.state() != DeviceState::Unopened {
            return Err(BridgeError::AlreadyStarted);
        }

        if let Err(e) = self.start_inner() {
            error!("{}", e);
            self.shutdown();
            return Err(e);
        }
        Ok(())
    }

    fn start_inner(&mut self) -> Result<(), BridgeError> {
        self.source.initialize()?;
        self.source.await_base_detection(self.settings.settle_delay());
        self.source.select_active_base()?;

        self.device.open(
            &self.settings.primary_uinput_path,
            &self.settings.secondary_uinput_path,
        )?;
        self.device
            .declare_capabilities(VirtualDeviceCapabilities::default())?;
        self.device.create(&self.settings.device_identity())?;
        Ok(())
    }

    /// One fetch/translate/submit iteration
    pub fn tick(&mut self) -> Result<(), DeviceError> {
        let Some(snapshot) = self.source.poll_latest() else {
            trace!("No active base, skipping tick");
            return Ok(());
        };

        for line in controller_diagnostics(&snapshot) {
            debug!("{}", line);
        }

        let batch = translate(&snapshot);
        self.device.submit(&batch)
    }

    /// Poll until the running flag is cleared.
    ///
    /// Write failures are logged and the loop moves on to the next tick.
    pub fn poll_loop(&mut self) -> RunSummary {
        let period = self.settings.poll_period();
        let mut summary = RunSummary::default();

        while self.running.load(Ordering::SeqCst) {
            if let Err(e) = self.tick() {
                warn!("{}", e);
                summary.failed_writes += 1;
            }
            summary.ticks += 1;

            thread::sleep(period);
        }

        info!(
            "Poll loop stopped after {} ticks ({} failed writes)",
            summary.ticks, summary.failed_writes
        );
        summary
    }

    /// Start, poll until stopped, then shut down
    pub fn run(&mut self) -> Result<RunSummary, BridgeError> {
        self.start()?;
        let summary = self.poll_loop();
        self.shutdown();
        Ok(summary)
    }

    /// Close the virtual device, then release the controller library
    pub fn shutdown(&mut self) {
        self.device.close();
        self.source.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{MockUinputBackend, UinputCall};
    use crate::source::{ControllerSnapshot, MockControllerLibrary};

    fn fast_settings() -> Settings {
        Settings {
            poll_period_ms: 1,
            settle_delay_ms: 0,
            ..Settings::default()
        }
    }

    #[test]
    fn test_start_brings_up_both_sides() {
        let mut bridge = Bridge::new(MockControllerLibrary::new(), MockUinputBackend::new(), fast_settings());
        bridge.start().unwrap();

        assert!(bridge.source().is_active());
        assert_eq!(bridge.device().state(), DeviceState::Created);
    }

    #[test]
    fn test_tick_submits_one_batch() {
        let mut bridge = Bridge::new(MockControllerLibrary::new(), MockUinputBackend::new(), fast_settings());
        bridge.start().unwrap();
        bridge.tick().unwrap();
        bridge.tick().unwrap();

        assert_eq!(bridge.device().backend().written_batches().len(), 2);
        assert_eq!(bridge.source().library().polls(), 2);
    }

    #[test]
    fn test_stopped_flag_runs_no_ticks() {
        let mut bridge = Bridge::new(MockControllerLibrary::new(), MockUinputBackend::new(), fast_settings());
        bridge.running_flag().store(false, Ordering::SeqCst);

        let summary = bridge.run().unwrap();
        assert_eq!(summary.ticks, 0);
        assert_eq!(bridge.device().state(), DeviceState::Closed);
        assert_eq!(bridge.source().library().exit_calls(), 1);
    }

    #[test]
    fn test_device_open_failure_tears_down_source() {
        let backend = MockUinputBackend::with_accessible(&[]);
        let mut bridge = Bridge::new(MockControllerLibrary::new(), backend, fast_settings());

        let err = bridge.start().unwrap_err();
        assert!(matches!(err, BridgeError::Device(DeviceError::Open { .. })));
        assert_eq!(bridge.source().library().exit_calls(), 1);
        assert!(bridge.device().backend().calls().is_empty());
    }

    #[test]
    fn test_no_base_skips_device() {
        let library = MockControllerLibrary::with_bases(vec![false, false]);
        let mut bridge = Bridge::new(library, MockUinputBackend::new(), fast_settings());

        let err = bridge.start().unwrap_err();
        assert!(matches!(err, BridgeError::Source(SourceError::NoBaseFound { .. })));
        assert_eq!(bridge.source().library().exit_calls(), 1);
        assert!(!bridge
            .device()
            .backend()
            .calls()
            .iter()
            .any(|c| matches!(c, UinputCall::Open(_))));
    }

    #[test]
    fn test_second_start_leaves_bridge_running() {
        let mut bridge = Bridge::new(MockControllerLibrary::new(), MockUinputBackend::new(), fast_settings());
        bridge.start().unwrap();

        assert!(matches!(bridge.start(), Err(BridgeError::AlreadyStarted)));
        assert_eq!(bridge.device().state(), DeviceState::Created);
        assert!(bridge.source().is_active());
        assert_eq!(bridge.source().library().init_calls(), 1);
        assert_eq!(bridge.source().library().exit_calls(), 0);
        assert!(!bridge.device().backend().calls().contains(&UinputCall::Destroy));

        bridge.tick().unwrap();
    }

    #[test]
    fn test_start_after_shutdown_rejected() {
        let mut bridge = Bridge::new(MockControllerLibrary::new(), MockUinputBackend::new(), fast_settings());
        bridge.start().unwrap();
        bridge.shutdown();

        assert!(matches!(bridge.start(), Err(BridgeError::AlreadyStarted)));
        assert_eq!(bridge.source().library().exit_calls(), 1);
    }

    #[test]
    fn test_diagnostics_report_only_active_controllers() {
        let docked = ControllerSnapshot {
            buttons: 0x4,
            is_enabled: true,
            is_docked: true,
            controller_index: 0,
            ..Default::default()
        };
        let in_hand = ControllerSnapshot {
            buttons: 0x21,
            is_enabled: true,
            is_docked: false,
            controller_index: 1,
            ..Default::default()
        };

        let lines = controller_diagnostics(&DualSnapshot::new(docked, in_hand));
        assert_eq!(lines, vec!["Controller 1 buttons 0x21".to_string()]);
    }

    #[test]
    fn test_diagnostics_skip_disabled_controllers() {
        let disabled = ControllerSnapshot {
            is_enabled: false,
            is_docked: false,
            ..Default::default()
        };
        assert!(controller_diagnostics(&DualSnapshot::new(disabled, disabled)).is_empty());
    }
}
