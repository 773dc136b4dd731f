//! Event layout constants
//!
//! This module fixes the shape of every event batch:
//! - Key and axis slot counts per controller
//! - The first key code advertised on the virtual device
//! - Axis range and physical position range

// ============================================================================
// Slot Layout
// ============================================================================

/// Key slots emitted per controller
pub const KEYS_PER_CONTROLLER: usize = 12;

/// Key slots emitted per batch
pub const NUM_KEYS_TOTAL: usize = 2 * KEYS_PER_CONTROLLER;

/// Position, orientation and trigger axes per controller
pub const MOTION_AXES_PER_CONTROLLER: usize = 8;

/// Joystick axes per controller, emitted as a trailing group
pub const JOYSTICK_AXES_PER_CONTROLLER: usize = 2;

/// Axis slots emitted per batch
pub const NUM_AXES_TOTAL: usize = 2 * (MOTION_AXES_PER_CONTROLLER + JOYSTICK_AXES_PER_CONTROLLER);

/// Events per batch. The +1 is the synchronization event
pub const NUM_EVENTS_TOTAL: usize = NUM_KEYS_TOTAL + NUM_AXES_TOTAL + 1;

/// Key code of slot 0 (BTN_JOYSTICK)
pub const FIRST_BUTTON_ID: u16 = 0x120;

/// Device-native button bits for key slots 0..7, in emission order
pub const BUTTON_BITS: [u32; 7] = [1, 32, 64, 8, 16, 256, 128];

/// Joystick deflection past which a virtual stick key is pressed
pub const STICK_KEY_THRESHOLD: f32 = 0.5;

// ============================================================================
// Numeric Ranges
// ============================================================================

/// Largest magnitude reported on any axis
pub const MAX_AXIS_VALUE: i32 = 32767;

/// Physical travel in meters mapped onto the full axis range
pub const POSITION_RANGE: f32 = 4.0;
