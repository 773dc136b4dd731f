//! Sixense SDK binding
//!
//! Minimal FFI surface of the vendor SDK for the dual motion controller:
//! init/exit, base enumeration, base activation and newest-data polling.

use super::{ControllerLibrary, ControllerSnapshot, DualSnapshot, SourceError};
use std::os::raw::{c_float, c_int, c_uchar, c_uint, c_ushort};

const SIXENSE_FAILURE: c_int = -1;

/// Controller slots in the SDK's all-controllers record
const SIXENSE_MAX_CONTROLLERS: usize = 4;

#[repr(C)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
struct SixenseControllerData {
    pos: [c_float; 3],
    rot_mat: [[c_float; 3]; 3],
    joystick_x: c_float,
    joystick_y: c_float,
    trigger: c_float,
    buttons: c_uint,
    sequence_number: c_uchar,
    rot_quat: [c_float; 4],
    firmware_revision: c_ushort,
    hardware_revision: c_ushort,
    packet_type: c_ushort,
    magnetic_frequency: c_ushort,
    enabled: c_int,
    controller_index: c_int,
    is_docked: c_uchar,
    which_hand: c_uchar,
    hemi_tracking_enabled: c_uchar,
}

#[repr(C)]
struct SixenseAllControllerData {
    controllers: [SixenseControllerData; SIXENSE_MAX_CONTROLLERS],
}

extern "C" {
    fn sixenseInit() -> c_int;
    fn sixenseExit() -> c_int;
    fn sixenseGetMaxBases() -> c_int;
    fn sixenseSetActiveBase(i: c_int) -> c_int;
    fn sixenseIsBaseConnected(i: c_int) -> c_int;
    fn sixenseGetAllNewestData(data: *mut SixenseAllControllerData) -> c_int;
}

impl From<&SixenseControllerData> for ControllerSnapshot {
    fn from(data: &SixenseControllerData) -> Self {
        Self {
            position: data.pos,
            orientation: data.rot_quat,
            trigger: data.trigger,
            joystick_x: data.joystick_x,
            joystick_y: data.joystick_y,
            buttons: data.buttons,
            is_docked: data.is_docked != 0,
            is_enabled: data.enabled != 0,
            controller_index: data.controller_index,
        }
    }
}

/// The vendor SDK as a [`ControllerLibrary`]
#[derive(Debug, Default)]
pub struct SixenseLibrary;

impl SixenseLibrary {
    pub fn new() -> Self {
        Self
    }
}

impl ControllerLibrary for SixenseLibrary {
    fn init(&mut self) -> Result<(), SourceError> {
        // SAFETY: no arguments; the SDK manages its own state
        if unsafe { sixenseInit() } == SIXENSE_FAILURE {
            return Err(SourceError::Init);
        }
        Ok(())
    }

    fn max_bases(&self) -> usize {
        let max = unsafe { sixenseGetMaxBases() };
        usize::try_from(max).unwrap_or(0)
    }

    fn is_base_connected(&self, index: usize) -> bool {
        let Ok(index) = c_int::try_from(index) else {
            return false;
        };
        unsafe { sixenseIsBaseConnected(index) != 0 }
    }

    fn set_active_base(&mut self, index: usize) -> Result<(), SourceError> {
        let slot = c_int::try_from(index)
            .map_err(|_| SourceError::Library(format!("base index {} out of range", index)))?;
        if unsafe { sixenseSetActiveBase(slot) } == SIXENSE_FAILURE {
            return Err(SourceError::Library(format!("could not activate base {}", index)));
        }
        Ok(())
    }

    fn newest_data(&mut self) -> DualSnapshot {
        // SAFETY: the record is plain old data and fully written by the SDK;
        // zeroed is a valid bit pattern for every field
        let mut all: SixenseAllControllerData = unsafe { std::mem::zeroed() };
        unsafe { sixenseGetAllNewestData(&mut all) };

        DualSnapshot::new(
            ControllerSnapshot::from(&all.controllers[0]),
            ControllerSnapshot::from(&all.controllers[1]),
        )
    }

    fn exit(&mut self) -> Result<(), SourceError> {
        if unsafe { sixenseExit() } == SIXENSE_FAILURE {
            return Err(SourceError::Library("sixenseExit returned failure".into()));
        }
        Ok(())
    }
}
