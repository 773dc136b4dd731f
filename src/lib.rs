//! Hydrajoy: dual motion controller to virtual joystick bridge
//!
//! This library polls a 6-DOF dual motion controller through its vendor SDK
//! and replays each snapshot as key, absolute-axis and sync events on a
//! Linux uinput virtual joystick.

pub mod bridge;
pub mod config;
pub mod device;
pub mod source;
pub mod translate;

// Re-export commonly used items
pub use bridge::{Bridge, BridgeError, RunSummary};
pub use config::{Config, ConfigError, Settings};
pub use device::{DeviceError, DeviceManager, UinputBackend, VirtualDeviceCapabilities};
pub use source::{ControllerLibrary, ControllerSnapshot, ControllerSource, DualSnapshot, SourceError};
pub use translate::{translate, EventBatch, OutputEvent};
