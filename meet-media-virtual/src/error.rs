use thiserror::Error;

use meet_media_core::DeviceKind;

/// Errors from manipulating the simulated device set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VirtualDeviceError {
    #[error("no {kind:?} device with id '{id}'")]
    UnknownDevice { kind: DeviceKind, id: String },

    #[error("a {kind:?} device with id '{id}' already exists")]
    DuplicateDevice { kind: DeviceKind, id: String },

    #[error("invalid frame size {width}x{height}")]
    InvalidFrameSize { width: u32, height: u32 },
}
