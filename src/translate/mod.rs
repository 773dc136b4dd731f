//! Event translator - converts controller snapshots to input events
//!
//! [`translate`] is a pure function from one [`DualSnapshot`] to a fixed
//! layout of 45 events: 24 keys, 20 axes and a closing sync marker.

pub mod constants;

pub use constants::*;

use crate::source::{ControllerSnapshot, DualSnapshot};

/// One low-level input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputEvent {
    /// Button state, value is 0 or 1
    Key { code: u16, value: i32 },

    /// Absolute axis position in [-MAX_AXIS_VALUE, MAX_AXIS_VALUE]
    Axis { code: u16, value: i32 },

    /// End of an atomic batch
    Sync,
}

impl OutputEvent {
    pub fn key(code: u16, pressed: bool) -> Self {
        OutputEvent::Key {
            code,
            value: i32::from(pressed),
        }
    }

    pub fn axis(code: u16, value: i32) -> Self {
        OutputEvent::Axis { code, value }
    }

    pub fn is_sync(&self) -> bool {
        matches!(self, OutputEvent::Sync)
    }
}

/// The events produced for one poll tick, in emission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBatch {
    events: Vec<OutputEvent>,
}

impl EventBatch {
    pub fn events(&self) -> &[OutputEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OutputEvent> {
        self.events.iter()
    }
}

impl<'a> IntoIterator for &'a EventBatch {
    type Item = &'a OutputEvent;
    type IntoIter = std::slice::Iter<'a, OutputEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Translate one snapshot into a complete event batch
pub fn translate(snapshot: &DualSnapshot) -> EventBatch {
    let mut events = Vec::with_capacity(NUM_EVENTS_TOTAL);

    // Buttons first
    let mut key_code = FIRST_BUTTON_ID;
    for controller in snapshot.iter() {
        for pressed in key_states(controller) {
            events.push(OutputEvent::key(key_code, pressed));
            key_code += 1;
        }
    }

    // Then position, orientation and trigger for each controller
    let mut axis_code: u16 = 0;
    let mut push_axis = |events: &mut Vec<OutputEvent>, value: i32| {
        events.push(OutputEvent::axis(axis_code, value));
        axis_code += 1;
    };

    for controller in snapshot.iter() {
        for mm in controller.position {
            push_axis(&mut events, positional_axis_value(mm));
        }
        for component in controller.orientation {
            push_axis(&mut events, raw_axis_value(component));
        }
        push_axis(&mut events, raw_axis_value(controller.trigger));
    }

    // Joysticks trail the motion axes of both controllers
    for controller in snapshot.iter() {
        push_axis(&mut events, raw_axis_value(controller.joystick_x));
        push_axis(&mut events, raw_axis_value(controller.joystick_y));
    }

    events.push(OutputEvent::Sync);

    debug_assert_eq!(events.len(), NUM_EVENTS_TOTAL);
    EventBatch { events }
}

/// Key slot states for one controller, in emission order
fn key_states(controller: &ControllerSnapshot) -> [bool; KEYS_PER_CONTROLLER] {
    let bit = |mask: u32| controller.buttons & mask != 0;
    [
        bit(BUTTON_BITS[0]),
        bit(BUTTON_BITS[1]),
        bit(BUTTON_BITS[2]),
        bit(BUTTON_BITS[3]),
        bit(BUTTON_BITS[4]),
        bit(BUTTON_BITS[5]),
        bit(BUTTON_BITS[6]),
        !controller.is_docked,
        controller.joystick_x < -STICK_KEY_THRESHOLD,
        controller.joystick_x > STICK_KEY_THRESHOLD,
        controller.joystick_y < -STICK_KEY_THRESHOLD,
        controller.joystick_y > STICK_KEY_THRESHOLD,
    ]
}

/// Millimeters to axis units, with +/-POSITION_RANGE meters spanning the full range.
///
/// Truncates toward zero.
pub fn positional_axis_value(mm: f32) -> i32 {
    let normalized = mm * (0.001 / POSITION_RANGE);
    (normalized * MAX_AXIS_VALUE as f32) as i32
}

/// Already-normalized value to axis units. Truncates toward zero.
pub fn raw_axis_value(value: f32) -> i32 {
    (value * MAX_AXIS_VALUE as f32) as i32
}
