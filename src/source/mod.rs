//! Controller source adapter
//!
//! This module owns the lifecycle of the motion-controller acquisition
//! library: startup, base station selection, snapshot polling and shutdown.
//! The library itself sits behind the [`ControllerLibrary`] trait so the
//! adapter can be driven by the vendor SDK or by a mock.

pub mod mock_library;
#[cfg(feature = "sixense")]
pub mod sixense;
pub mod types;

pub use mock_library::MockControllerLibrary;
#[cfg(feature = "sixense")]
pub use sixense::SixenseLibrary;
pub use types::{ControllerSnapshot, DualSnapshot, CONTROLLERS_PER_BASE};

use log::{debug, info, warn};
use std::thread;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Could not init the motion controller library")]
    Init,

    #[error("No connected base station among {max_bases} slots")]
    NoBaseFound { max_bases: usize },

    #[error("Controller source is {0}, operation not allowed")]
    InvalidState(&'static str),

    #[error("Controller library call failed: {0}")]
    Library(String),
}

/// Narrow polling interface of the acquisition library
pub trait ControllerLibrary {
    /// Start the library
    fn init(&mut self) -> Result<(), SourceError>;

    /// Number of base slots the library can enumerate
    fn max_bases(&self) -> usize;

    /// Whether the base at `index` reports connected
    fn is_base_connected(&self, index: usize) -> bool;

    /// Make the base at `index` the one snapshots are read from
    fn set_active_base(&mut self, index: usize) -> Result<(), SourceError>;

    /// Latest known state of both controllers, never blocks
    fn newest_data(&mut self) -> DualSnapshot;

    /// Release the library
    fn exit(&mut self) -> Result<(), SourceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceState {
    Uninitialized,
    Initialized,
    Active,
    Shutdown,
}

impl SourceState {
    fn name(self) -> &'static str {
        match self {
            SourceState::Uninitialized => "uninitialized",
            SourceState::Initialized => "initialized",
            SourceState::Active => "active",
            SourceState::Shutdown => "shut down",
        }
    }
}

/// Adapter that drives a [`ControllerLibrary`] through its lifecycle
pub struct ControllerSource<L: ControllerLibrary> {
    library: L,
    state: SourceState,
    active_base: Option<usize>,
}

impl<L: ControllerLibrary> ControllerSource<L> {
    pub fn new(library: L) -> Self {
        Self {
            library,
            state: SourceState::Uninitialized,
            active_base: None,
        }
    }

    /// Start the acquisition library
    pub fn initialize(&mut self) -> Result<(), SourceError> {
        if self.state != SourceState::Uninitialized {
            return Err(SourceError::InvalidState(self.state.name()));
        }

        self.library.init()?;
        self.state = SourceState::Initialized;
        info!("Motion controller library inited successfully");
        Ok(())
    }

    /// Wait for the hardware to settle so base stations become enumerable
    pub fn await_base_detection(&self, settle: Duration) {
        debug!("Waiting {:?} for base stations to settle", settle);
        thread::sleep(settle);
    }

    /// Activate the first connected base slot, scanning upward from zero
    pub fn select_active_base(&mut self) -> Result<usize, SourceError> {
        if self.state != SourceState::Initialized {
            return Err(SourceError::InvalidState(self.state.name()));
        }

        let max_bases = self.library.max_bases();
        info!("Max bases = {}", max_bases);

        let base = (0..max_bases)
            .find(|&index| self.library.is_base_connected(index))
            .ok_or(SourceError::NoBaseFound { max_bases })?;

        self.library.set_active_base(base)?;
        self.active_base = Some(base);
        self.state = SourceState::Active;
        info!("Connected to base number {}", base);
        Ok(base)
    }

    /// Fetch the newest snapshot for both controllers.
    ///
    /// Returns `None` unless a base is active.
    pub fn poll_latest(&mut self) -> Option<DualSnapshot> {
        match self.state {
            SourceState::Active => Some(self.library.newest_data()),
            _ => None,
        }
    }

    /// Release the acquisition library. Failures are logged, not returned.
    pub fn shutdown(&mut self) {
        match self.state {
            SourceState::Uninitialized | SourceState::Shutdown => return,
            SourceState::Initialized | SourceState::Active => {}
        }

        if let Err(e) = self.library.exit() {
            warn!("There was an error finishing the motion controller library: {}", e);
        }
        self.state = SourceState::Shutdown;
        self.active_base = None;
        debug!("Controller source shut down");
    }

    pub fn active_base(&self) -> Option<usize> {
        self.active_base
    }

    pub fn is_active(&self) -> bool {
        self.state == SourceState::Active
    }

    /// Whether `initialize` has not been called yet
    pub fn is_uninitialized(&self) -> bool {
        self.state == SourceState::Uninitialized
    }

    pub fn library(&self) -> &L {
        &self.library
    }
}
