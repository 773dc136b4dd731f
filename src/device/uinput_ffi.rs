//! Kernel input/uinput record layouts and directive numbers

use crate::translate::OutputEvent;

pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_ABS: u16 = 0x03;

pub const SYN_REPORT: u16 = 0;

pub const BUS_USB: u16 = 0x03;

pub const UINPUT_MAX_NAME_SIZE: usize = 80;
pub const ABS_CNT: usize = 0x40;

// ioctl direction bits and size field width, see asm/ioctl.h
#[cfg(any(
    target_arch = "powerpc",
    target_arch = "powerpc64",
    target_arch = "mips",
    target_arch = "mips64",
    target_arch = "sparc",
    target_arch = "sparc64"
))]
mod ioc {
    pub const NONE: u32 = 1;
    pub const WRITE: u32 = 4;
    pub const SIZEBITS: u32 = 13;
}

#[cfg(not(any(
    target_arch = "powerpc",
    target_arch = "powerpc64",
    target_arch = "mips",
    target_arch = "mips64",
    target_arch = "sparc",
    target_arch = "sparc64"
)))]
mod ioc {
    pub const NONE: u32 = 0;
    pub const WRITE: u32 = 1;
    pub const SIZEBITS: u32 = 14;
}

const fn ioc(dir: u32, ty: u8, nr: u8, size: usize) -> u32 {
    (dir << (16 + ioc::SIZEBITS)) | ((size as u32) << 16) | ((ty as u32) << 8) | nr as u32
}

/// _IO(ty, nr)
const fn io(ty: u8, nr: u8) -> u32 {
    ioc(ioc::NONE, ty, nr, 0)
}

/// _IOW(ty, nr, int)
const fn iow_int(ty: u8, nr: u8) -> u32 {
    ioc(ioc::WRITE, ty, nr, std::mem::size_of::<libc::c_int>())
}

const UINPUT_IOCTL_BASE: u8 = b'U';

pub const UI_DEV_CREATE: u32 = io(UINPUT_IOCTL_BASE, 1);
pub const UI_DEV_DESTROY: u32 = io(UINPUT_IOCTL_BASE, 2);
pub const UI_SET_EVBIT: u32 = iow_int(UINPUT_IOCTL_BASE, 100);
pub const UI_SET_KEYBIT: u32 = iow_int(UINPUT_IOCTL_BASE, 101);
pub const UI_SET_ABSBIT: u32 = iow_int(UINPUT_IOCTL_BASE, 103);

#[repr(C)]
#[derive(Clone, Copy)]
pub struct InputEvent {
    pub time: libc::timeval,
    pub type_: u16,
    pub code: u16,
    pub value: i32,
}

pub const INPUT_EVENT_SIZE: usize = std::mem::size_of::<InputEvent>();

impl From<&OutputEvent> for InputEvent {
    fn from(event: &OutputEvent) -> Self {
        let (type_, code, value) = match *event {
            OutputEvent::Key { code, value } => (EV_KEY, code, value),
            OutputEvent::Axis { code, value } => (EV_ABS, code, value),
            OutputEvent::Sync => (EV_SYN, SYN_REPORT, 0),
        };
        // Zero timestamp, the kernel stamps injected events
        InputEvent {
            time: libc::timeval { tv_sec: 0, tv_usec: 0 },
            type_,
            code,
            value,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct InputId {
    pub bustype: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct UinputUserDev {
    pub name: [u8; UINPUT_MAX_NAME_SIZE],
    pub id: InputId,
    pub ff_effects_max: u32,
    pub absmax: [i32; ABS_CNT],
    pub absmin: [i32; ABS_CNT],
    pub absfuzz: [i32; ABS_CNT],
    pub absflat: [i32; ABS_CNT],
}

impl Default for UinputUserDev {
    fn default() -> Self {
        Self {
            name: [0; UINPUT_MAX_NAME_SIZE],
            id: InputId::default(),
            ff_effects_max: 0,
            absmax: [0; ABS_CNT],
            absmin: [0; ABS_CNT],
            absfuzz: [0; ABS_CNT],
            absflat: [0; ABS_CNT],
        }
    }
}

/// View a slice of plain `repr(C)` records as raw bytes
pub fn as_bytes<T: Copy>(records: &[T]) -> &[u8] {
    // SAFETY: callers only pass repr(C) structs of integers, fully
    // initialised, and the byte view shares the slice's lifetime
    unsafe {
        std::slice::from_raw_parts(records.as_ptr() as *const u8, std::mem::size_of_val(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_dev_layout() {
        // name + id + ff_effects_max + 4 * 64 i32 arrays
        assert_eq!(std::mem::size_of::<UinputUserDev>(), 80 + 8 + 4 + 4 * 64 * 4);
    }

    #[test]
    fn test_input_event_conversion() {
        let key = InputEvent::from(&OutputEvent::Key { code: 0x121, value: 1 });
        assert_eq!((key.type_, key.code, key.value), (EV_KEY, 0x121, 1));

        let axis = InputEvent::from(&OutputEvent::Axis { code: 5, value: -300 });
        assert_eq!((axis.type_, axis.code, axis.value), (EV_ABS, 5, -300));

        let sync = InputEvent::from(&OutputEvent::Sync);
        assert_eq!((sync.type_, sync.code, sync.value), (EV_SYN, SYN_REPORT, 0));
    }

    #[test]
    #[cfg(any(target_arch = "x86_64", target_arch = "x86", target_arch = "aarch64", target_arch = "arm"))]
    fn test_directive_numbers_generic_layout() {
        assert_eq!(UI_DEV_CREATE, 0x5501);
        assert_eq!(UI_DEV_DESTROY, 0x5502);
        assert_eq!(UI_SET_EVBIT, 0x4004_5564);
        assert_eq!(UI_SET_KEYBIT, 0x4004_5565);
        assert_eq!(UI_SET_ABSBIT, 0x4004_5567);
    }

    #[test]
    fn test_directive_encoding_per_layout() {
        // Write direction sits just above the size field on every layout
        assert_eq!(UI_SET_EVBIT >> (16 + ioc::SIZEBITS), ioc::WRITE);
        assert_eq!(UI_DEV_CREATE >> (16 + ioc::SIZEBITS), ioc::NONE);
        assert_eq!((UI_SET_ABSBIT >> 16) & ((1 << ioc::SIZEBITS) - 1), 4);
        assert_eq!(UI_SET_KEYBIT & 0xffff, 0x5565);
    }

    #[test]
    fn test_as_bytes_length() {
        let events = [InputEvent::from(&OutputEvent::Sync); 3];
        assert_eq!(as_bytes(&events).len(), 3 * INPUT_EVENT_SIZE);
    }
}
