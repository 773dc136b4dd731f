//! Virtual input device management
//!
//! This module owns the lifecycle of the emitted virtual joystick:
//! open the uinput device file, declare capabilities, create the device,
//! submit event batches, then destroy and close it.
//!
//! The kernel interface sits behind [`UinputBackend`] so the manager can be
//! exercised against [`MockUinputBackend`] in tests.

pub mod mock_uinput;
#[cfg(target_os = "linux")]
pub mod uinput;
pub mod uinput_ffi;

pub use mock_uinput::{MockUinputBackend, UinputCall};
#[cfg(target_os = "linux")]
pub use uinput::LinuxUinputBackend;

use crate::translate::{EventBatch, FIRST_BUTTON_ID, MAX_AXIS_VALUE, NUM_AXES_TOTAL, NUM_KEYS_TOTAL};
use log::{debug, info, warn};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uinput_ffi::{BUS_USB, EV_ABS, EV_KEY, EV_SYN, INPUT_EVENT_SIZE};

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Could not open uinput file. Tried with {} and {}", primary.display(), secondary.display())]
    Open { primary: PathBuf, secondary: PathBuf },

    #[error("uinput setup failed while {step}: {source}")]
    Setup {
        step: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Short write to uinput: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("Write to uinput failed: {0}")]
    Write(#[source] io::Error),

    #[error("Cannot {operation} while device is {state}")]
    InvalidState {
        operation: &'static str,
        state: DeviceState,
    },
}

fn setup_error(step: &'static str) -> impl FnOnce(io::Error) -> DeviceError {
    move |source| DeviceError::Setup { step, source }
}

/// Kernel-facing operations on a uinput device file
pub trait UinputBackend {
    /// Open the device file at `path` for writing
    fn open(&mut self, path: &Path) -> io::Result<()>;

    /// Register an event type (EV_KEY, EV_ABS, EV_SYN)
    fn set_event_bit(&mut self, event_type: u16) -> io::Result<()>;

    /// Register one key code
    fn set_key_bit(&mut self, code: u16) -> io::Result<()>;

    /// Register one absolute axis code
    fn set_abs_bit(&mut self, code: u16) -> io::Result<()>;

    /// Write the device descriptor record
    fn write_descriptor(&mut self, descriptor: &DeviceDescriptor) -> io::Result<()>;

    /// Issue the device-creation directive
    fn create(&mut self) -> io::Result<()>;

    /// Write events as one contiguous record array, returning bytes written
    fn write_events(&mut self, batch: &EventBatch) -> io::Result<usize>;

    /// Issue the device-destruction directive
    fn destroy(&mut self) -> io::Result<()>;

    /// Release the device file
    fn close(&mut self) -> io::Result<()>;
}

/// Event codes and axis ranges the virtual device advertises
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualDeviceCapabilities {
    pub key_codes: Vec<u16>,
    pub axis_codes: Vec<u16>,
    pub axis_min: i32,
    pub axis_max: i32,
}

impl Default for VirtualDeviceCapabilities {
    fn default() -> Self {
        Self {
            key_codes: (0..NUM_KEYS_TOTAL as u16).map(|k| FIRST_BUTTON_ID + k).collect(),
            axis_codes: (0..NUM_AXES_TOTAL as u16).collect(),
            axis_min: -MAX_AXIS_VALUE,
            axis_max: MAX_AXIS_VALUE,
        }
    }
}

/// Identity and per-axis ranges written before device creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub name: String,
    pub bus_type: u16,
    pub vendor_id: u16,
    pub product_id: u16,
    pub version: u16,
    /// (axis code, min, max)
    pub axis_ranges: Vec<(u16, i32, i32)>,
}

/// Identity of the virtual device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub name: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub version: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Unopened,
    Opened,
    CapabilitiesDeclared,
    Created,
    Destroyed,
    Closed,
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceState::Unopened => "unopened",
            DeviceState::Opened => "opened",
            DeviceState::CapabilitiesDeclared => "capabilities-declared",
            DeviceState::Created => "created",
            DeviceState::Destroyed => "destroyed",
            DeviceState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Drives a [`UinputBackend`] through the device state machine
pub struct DeviceManager<B: UinputBackend> {
    backend: B,
    state: DeviceState,
    capabilities: Option<VirtualDeviceCapabilities>,
    opened_path: Option<PathBuf>,
}

impl<B: UinputBackend> DeviceManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: DeviceState::Unopened,
            capabilities: None,
            opened_path: None,
        }
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Path the device file was opened from
    pub fn opened_path(&self) -> Option<&Path> {
        self.opened_path.as_deref()
    }

    fn expect_state(&self, expected: DeviceState, operation: &'static str) -> Result<(), DeviceError> {
        if self.state != expected {
            return Err(DeviceError::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Open the primary path, falling back to the secondary one
    pub fn open(&mut self, primary: &Path, secondary: &Path) -> Result<(), DeviceError> {
        self.expect_state(DeviceState::Unopened, "open")?;

        let opened = match self.backend.open(primary) {
            Ok(()) => primary,
            Err(e) => {
                debug!("Could not open {}: {}, trying {}", primary.display(), e, secondary.display());
                self.backend.open(secondary).map_err(|e| {
                    debug!("Could not open {}: {}", secondary.display(), e);
                    DeviceError::Open {
                        primary: primary.to_path_buf(),
                        secondary: secondary.to_path_buf(),
                    }
                })?;
                secondary
            }
        };

        info!("Opened uinput file {}", opened.display());
        self.opened_path = Some(opened.to_path_buf());
        self.state = DeviceState::Opened;
        Ok(())
    }

    /// Register event types, every key and axis code, and remember the axis ranges
    pub fn declare_capabilities(&mut self, caps: VirtualDeviceCapabilities) -> Result<(), DeviceError> {
        self.expect_state(DeviceState::Opened, "declare capabilities")?;

        for event_type in [EV_KEY, EV_ABS, EV_SYN] {
            self.backend
                .set_event_bit(event_type)
                .map_err(setup_error("registering event types"))?;
        }
        for &code in &caps.key_codes {
            self.backend
                .set_key_bit(code)
                .map_err(setup_error("registering key codes"))?;
        }
        for &code in &caps.axis_codes {
            self.backend
                .set_abs_bit(code)
                .map_err(setup_error("registering axis codes"))?;
        }

        debug!(
            "Declared {} keys and {} axes with range [{}, {}]",
            caps.key_codes.len(),
            caps.axis_codes.len(),
            caps.axis_min,
            caps.axis_max
        );
        self.capabilities = Some(caps);
        self.state = DeviceState::CapabilitiesDeclared;
        Ok(())
    }

    /// Write the descriptor and create the device
    pub fn create(&mut self, identity: &DeviceIdentity) -> Result<(), DeviceError> {
        self.expect_state(DeviceState::CapabilitiesDeclared, "create device")?;
        let caps = self.capabilities.as_ref().ok_or(DeviceError::InvalidState {
            operation: "create device",
            state: self.state,
        })?;

        let descriptor = DeviceDescriptor {
            name: identity.name.clone(),
            bus_type: BUS_USB,
            vendor_id: identity.vendor_id,
            product_id: identity.product_id,
            version: identity.version,
            axis_ranges: caps
                .axis_codes
                .iter()
                .map(|&code| (code, caps.axis_min, caps.axis_max))
                .collect(),
        };

        self.backend
            .write_descriptor(&descriptor)
            .map_err(setup_error("writing the device descriptor"))?;
        self.backend
            .create()
            .map_err(setup_error("creating the device"))?;

        info!(
            "Created virtual joystick '{}' ({:04x}:{:04x})",
            identity.name, identity.vendor_id, identity.product_id
        );
        self.state = DeviceState::Created;
        Ok(())
    }

    /// Write one batch as a single contiguous write.
    ///
    /// A short write is reported as [`DeviceError::ShortWrite`]; the batch is
    /// not retried.
    pub fn submit(&mut self, batch: &EventBatch) -> Result<(), DeviceError> {
        self.expect_state(DeviceState::Created, "submit events")?;

        let expected = batch.len() * INPUT_EVENT_SIZE;
        let written = self.backend.write_events(batch).map_err(DeviceError::Write)?;
        if written != expected {
            return Err(DeviceError::ShortWrite { written, expected });
        }
        Ok(())
    }

    /// Destroy the device and release the file. Failures are logged, not returned.
    pub fn close(&mut self) {
        match self.state {
            DeviceState::Unopened | DeviceState::Closed => return,
            DeviceState::Created => {
                if let Err(e) = self.backend.destroy() {
                    warn!("There was an error destroying the virtual joystick: {}", e);
                }
                self.state = DeviceState::Destroyed;
            }
            DeviceState::Opened | DeviceState::CapabilitiesDeclared | DeviceState::Destroyed => {}
        }

        if let Err(e) = self.backend.close() {
            warn!("There was an error closing the uinput file: {}", e);
        }
        self.state = DeviceState::Closed;
        debug!("Virtual device closed");
    }
}
