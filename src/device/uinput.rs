//! Linux uinput backend
//!
//! Talks to the kernel through the uinput device file: raw ioctls for
//! capability bits and device lifecycle, plain writes for the descriptor
//! record and event batches.

use super::uinput_ffi::*;
use super::{DeviceDescriptor, UinputBackend};
use crate::translate::EventBatch;
use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, IntoRawFd};
use std::path::Path;

/// uinput device file driven with raw ioctls
#[derive(Debug, Default)]
pub struct LinuxUinputBackend {
    file: Option<File>,
}

impl LinuxUinputBackend {
    pub fn new() -> Self {
        Self { file: None }
    }

    fn file(&mut self) -> io::Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "uinput file is not open"))
    }

    fn ioctl_int(&mut self, request: u32, arg: libc::c_int) -> io::Result<()> {
        let fd = self.file()?.as_raw_fd();
        // SAFETY: fd is owned by self.file and stays open for the call;
        // the uinput SET_*BIT directives take a plain int argument
        if unsafe { libc::ioctl(fd, request as _, arg) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn ioctl_none(&mut self, request: u32) -> io::Result<()> {
        let fd = self.file()?.as_raw_fd();
        // SAFETY: as above; DEV_CREATE and DEV_DESTROY take no argument
        if unsafe { libc::ioctl(fd, request as _) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl UinputBackend for LinuxUinputBackend {
    fn open(&mut self, path: &Path) -> io::Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)?;
        self.file = Some(file);
        Ok(())
    }

    fn set_event_bit(&mut self, event_type: u16) -> io::Result<()> {
        self.ioctl_int(UI_SET_EVBIT, libc::c_int::from(event_type))
    }

    fn set_key_bit(&mut self, code: u16) -> io::Result<()> {
        self.ioctl_int(UI_SET_KEYBIT, libc::c_int::from(code))
    }

    fn set_abs_bit(&mut self, code: u16) -> io::Result<()> {
        self.ioctl_int(UI_SET_ABSBIT, libc::c_int::from(code))
    }

    fn write_descriptor(&mut self, descriptor: &DeviceDescriptor) -> io::Result<()> {
        let mut dev = UinputUserDev::default();

        // Leave room for the NUL terminator
        let name = descriptor.name.as_bytes();
        let len = name.len().min(UINPUT_MAX_NAME_SIZE - 1);
        dev.name[..len].copy_from_slice(&name[..len]);

        dev.id = InputId {
            bustype: descriptor.bus_type,
            vendor: descriptor.vendor_id,
            product: descriptor.product_id,
            version: descriptor.version,
        };

        for &(code, min, max) in &descriptor.axis_ranges {
            let slot = usize::from(code);
            if slot >= ABS_CNT {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("axis code {} out of range", code),
                ));
            }
            dev.absmin[slot] = min;
            dev.absmax[slot] = max;
        }

        self.file()?.write_all(as_bytes(std::slice::from_ref(&dev)))
    }

    fn create(&mut self) -> io::Result<()> {
        self.ioctl_none(UI_DEV_CREATE)
    }

    fn write_events(&mut self, batch: &EventBatch) -> io::Result<usize> {
        let records: Vec<InputEvent> = batch.iter().map(InputEvent::from).collect();
        // One write call; a short count is reported, never completed
        let written = self.file()?.write(as_bytes(&records))?;
        if written != records.len() * INPUT_EVENT_SIZE {
            debug!("uinput accepted {} of {} bytes", written, records.len() * INPUT_EVENT_SIZE);
        }
        Ok(written)
    }

    fn destroy(&mut self) -> io::Result<()> {
        self.ioctl_none(UI_DEV_DESTROY)
    }

    fn close(&mut self) -> io::Result<()> {
        let file = self
            .file
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "uinput file is not open"))?;
        let fd = file.into_raw_fd();
        // SAFETY: fd was just released from the File, so it is closed exactly once
        if unsafe { libc::close(fd) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
