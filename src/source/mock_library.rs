//! Mock motion controller library for testing.
//!
//! This library serves a fixed set of base slots and a settable snapshot
//! instead of talking to hardware. Useful for exercising the controller
//! source and the bridge loop without the vendor SDK installed.

use super::{ControllerLibrary, DualSnapshot, SourceError};
use log::info;

/// Mock acquisition library that logs calls instead of touching hardware.
#[derive(Clone, Debug, Default)]
pub struct MockControllerLibrary {
    bases: Vec<bool>,
    snapshot: DualSnapshot,
    init_fails: bool,
    exit_fails: bool,
    active_base: Option<usize>,
    init_calls: usize,
    exit_calls: usize,
    polls: usize,
}

impl MockControllerLibrary {
    /// Create a mock with one connected base station.
    pub fn new() -> Self {
        Self::with_bases(vec![true])
    }

    /// Create a mock whose base slots report the given connection status.
    pub fn with_bases(bases: Vec<bool>) -> Self {
        Self {
            bases,
            ..Default::default()
        }
    }

    /// Create a mock whose startup always fails.
    pub fn failing_init() -> Self {
        Self {
            init_fails: true,
            ..Default::default()
        }
    }

    pub fn set_snapshot(&mut self, snapshot: DualSnapshot) {
        self.snapshot = snapshot;
    }

    pub fn fail_exit(&mut self, fails: bool) {
        self.exit_fails = fails;
    }

    pub fn active_base(&self) -> Option<usize> {
        self.active_base
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls
    }

    pub fn exit_calls(&self) -> usize {
        self.exit_calls
    }

    pub fn polls(&self) -> usize {
        self.polls
    }
}

impl ControllerLibrary for MockControllerLibrary {
    fn init(&mut self) -> Result<(), SourceError> {
        self.init_calls += 1;
        info!("[MOCK LIBRARY] init");
        if self.init_fails {
            return Err(SourceError::Init);
        }
        Ok(())
    }

    fn max_bases(&self) -> usize {
        self.bases.len()
    }

    fn is_base_connected(&self, index: usize) -> bool {
        self.bases.get(index).copied().unwrap_or(false)
    }

    fn set_active_base(&mut self, index: usize) -> Result<(), SourceError> {
        info!("[MOCK LIBRARY] set active base {}", index);
        self.active_base = Some(index);
        Ok(())
    }

    fn newest_data(&mut self) -> DualSnapshot {
        self.polls += 1;
        self.snapshot
    }

    fn exit(&mut self) -> Result<(), SourceError> {
        self.exit_calls += 1;
        info!("[MOCK LIBRARY] exit");
        if self.exit_fails {
            return Err(SourceError::Library("exit returned failure".into()));
        }
        Ok(())
    }
}
