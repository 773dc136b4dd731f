//! Mock uinput backend for testing.
//!
//! This backend records every directive and batch instead of talking to
//! the kernel. Useful for testing the device manager and the bridge loop
//! without access to /dev/uinput.

use super::uinput_ffi::INPUT_EVENT_SIZE;
use super::{DeviceDescriptor, UinputBackend};
use crate::translate::EventBatch;
use log::info;
use std::io;
use std::path::{Path, PathBuf};

/// One recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UinputCall {
    Open(PathBuf),
    SetEventBit(u16),
    SetKeyBit(u16),
    SetAbsBit(u16),
    WriteDescriptor,
    Create,
    WriteEvents(usize),
    Destroy,
    Close,
}

/// Mock uinput backend that logs and records calls.
#[derive(Clone, Debug)]
pub struct MockUinputBackend {
    /// Paths that open successfully; `None` accepts every path
    accessible: Option<Vec<PathBuf>>,
    short_by: usize,
    write_error: bool,
    calls: Vec<UinputCall>,
    descriptor: Option<DeviceDescriptor>,
    batches: Vec<EventBatch>,
}

impl MockUinputBackend {
    /// Create a mock that opens any path.
    pub fn new() -> Self {
        Self {
            accessible: None,
            short_by: 0,
            write_error: false,
            calls: Vec::new(),
            descriptor: None,
            batches: Vec::new(),
        }
    }

    /// Create a mock where only the listed paths can be opened.
    pub fn with_accessible(paths: &[&str]) -> Self {
        Self {
            accessible: Some(paths.iter().map(PathBuf::from).collect()),
            ..Self::new()
        }
    }

    /// Report `bytes` fewer bytes than requested on every event write.
    pub fn short_write_by(&mut self, bytes: usize) {
        self.short_by = bytes;
    }

    /// Fail every event write with an I/O error.
    pub fn fail_writes(&mut self, fail: bool) {
        self.write_error = fail;
    }

    pub fn calls(&self) -> &[UinputCall] {
        &self.calls
    }

    pub fn descriptor(&self) -> Option<&DeviceDescriptor> {
        self.descriptor.as_ref()
    }

    /// Batches handed to `write_events`, including short-written ones
    pub fn written_batches(&self) -> &[EventBatch] {
        &self.batches
    }
}

impl Default for MockUinputBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl UinputBackend for MockUinputBackend {
    fn open(&mut self, path: &Path) -> io::Result<()> {
        if let Some(accessible) = &self.accessible {
            if !accessible.iter().any(|p| p == path) {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no such device file"));
            }
        }
        info!("[MOCK UINPUT] open {}", path.display());
        self.calls.push(UinputCall::Open(path.to_path_buf()));
        Ok(())
    }

    fn set_event_bit(&mut self, event_type: u16) -> io::Result<()> {
        self.calls.push(UinputCall::SetEventBit(event_type));
        Ok(())
    }

    fn set_key_bit(&mut self, code: u16) -> io::Result<()> {
        self.calls.push(UinputCall::SetKeyBit(code));
        Ok(())
    }

    fn set_abs_bit(&mut self, code: u16) -> io::Result<()> {
        self.calls.push(UinputCall::SetAbsBit(code));
        Ok(())
    }

    fn write_descriptor(&mut self, descriptor: &DeviceDescriptor) -> io::Result<()> {
        info!("[MOCK UINPUT] descriptor '{}'", descriptor.name);
        self.calls.push(UinputCall::WriteDescriptor);
        self.descriptor = Some(descriptor.clone());
        Ok(())
    }

    fn create(&mut self) -> io::Result<()> {
        info!("[MOCK UINPUT] create");
        self.calls.push(UinputCall::Create);
        Ok(())
    }

    fn write_events(&mut self, batch: &EventBatch) -> io::Result<usize> {
        if self.write_error {
            return Err(io::Error::new(io::ErrorKind::WouldBlock, "device busy"));
        }
        let requested = batch.len() * INPUT_EVENT_SIZE;
        let written = requested.saturating_sub(self.short_by);
        self.calls.push(UinputCall::WriteEvents(batch.len()));
        self.batches.push(batch.clone());
        Ok(written)
    }

    fn destroy(&mut self) -> io::Result<()> {
        info!("[MOCK UINPUT] destroy");
        self.calls.push(UinputCall::Destroy);
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        info!("[MOCK UINPUT] close");
        self.calls.push(UinputCall::Close);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_uinput_works() {
        let mut backend = MockUinputBackend::with_accessible(&["/dev/uinput"]);
        assert!(backend.open(Path::new("/dev/input/uinput")).is_err());
        assert!(backend.open(Path::new("/dev/uinput")).is_ok());
        assert!(backend.create().is_ok());
        assert!(backend.destroy().is_ok());
        assert!(backend.close().is_ok());

        // Failed opens are not recorded
        assert_eq!(backend.calls().len(), 4);
    }
}
