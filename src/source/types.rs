//! Motion controller snapshot types
//!
//! This module defines the per-tick controller state handed from the
//! controller source to the event translator.

/// Number of controllers paired with one base station
pub const CONTROLLERS_PER_BASE: usize = 2;

/// State of one motion controller captured at a single poll tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSnapshot {
    /// Position in millimeters, device-native frame
    pub position: [f32; 3],

    /// Unit orientation quaternion, device-native component order
    pub orientation: [f32; 4],

    /// Analog trigger (0.0 to 1.0)
    pub trigger: f32,

    /// Joystick horizontal axis (-1.0 to 1.0)
    pub joystick_x: f32,

    /// Joystick vertical axis (-1.0 to 1.0)
    pub joystick_y: f32,

    /// Device-native button bitmask
    pub buttons: u32,

    /// Controller is resting in the base station dock
    pub is_docked: bool,

    /// Controller is powered and reporting
    pub is_enabled: bool,

    /// Index reported by the acquisition library
    pub controller_index: i32,
}

impl Default for ControllerSnapshot {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            orientation: [0.0, 0.0, 0.0, 1.0],
            trigger: 0.0,
            joystick_x: 0.0,
            joystick_y: 0.0,
            buttons: 0,
            is_docked: true,
            is_enabled: false,
            controller_index: 0,
        }
    }
}

impl ControllerSnapshot {
    /// Whether the controller is in hand and worth reporting in diagnostics
    pub fn is_active(&self) -> bool {
        self.is_enabled && !self.is_docked
    }
}

/// Both controllers of one base station, left slot first.
///
/// Both slots are always present; a missing controller shows up as
/// docked or disabled rather than being omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DualSnapshot {
    pub controllers: [ControllerSnapshot; CONTROLLERS_PER_BASE],
}

impl DualSnapshot {
    pub fn new(left: ControllerSnapshot, right: ControllerSnapshot) -> Self {
        Self {
            controllers: [left, right],
        }
    }

    pub fn left(&self) -> &ControllerSnapshot {
        &self.controllers[0]
    }

    pub fn right(&self) -> &ControllerSnapshot {
        &self.controllers[1]
    }

    /// Controllers in emission order (left, then right)
    pub fn iter(&self) -> impl Iterator<Item = &ControllerSnapshot> {
        self.controllers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_docked_and_inactive() {
        let snapshot = ControllerSnapshot::default();
        assert!(snapshot.is_docked);
        assert!(!snapshot.is_active());
    }

    #[test]
    fn test_iter_yields_left_then_right() {
        let left = ControllerSnapshot { controller_index: 0, ..Default::default() };
        let right = ControllerSnapshot { controller_index: 1, ..Default::default() };
        let dual = DualSnapshot::new(left, right);

        let indices: Vec<i32> = dual.iter().map(|c| c.controller_index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(dual.left().controller_index, 0);
        assert_eq!(dual.right().controller_index, 1);
    }
}
