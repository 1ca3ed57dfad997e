use thiserror::Error;

/// Errors surfaced by the device/stream manager.
///
/// The `Display` text doubles as the user-facing message the manager stores
/// as its latest error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("Device not found")]
    DeviceNotFound,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Device constraints not supported")]
    ConstraintsNotSatisfiable,

    #[error("Failed to enumerate devices")]
    EnumerationFailed,

    #[error("Audio output selection is not supported")]
    OutputSelectionUnsupported,

    #[error("Failed to set audio output device")]
    OutputSelectionFailed,

    #[error("Media capture is not supported")]
    CaptureUnsupported,

    /// A newer acquisition was issued while this one was in flight; its
    /// stream was released. Never stored as the latest error.
    #[error("Stream request was superseded")]
    Superseded,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unknown error")]
    Unknown(String),
}

impl MediaError {
    /// Classify a failed stream acquisition by the platform's error name.
    pub fn from_acquisition(err: &PlatformError) -> Self {
        match err.name.as_str() {
            PlatformError::NOT_FOUND => Self::DeviceNotFound,
            PlatformError::NOT_ALLOWED => Self::PermissionDenied,
            PlatformError::OVERCONSTRAINED => Self::ConstraintsNotSatisfiable,
            PlatformError::NOT_SUPPORTED => Self::CaptureUnsupported,
            _ => Self::Unknown(err.to_string()),
        }
    }
}

/// A failure reported by a platform backend.
///
/// `name` carries the platform-native error class (for browsers, the
/// `DOMException` name); the manager classifies on it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{name}: {message}")]
pub struct PlatformError {
    pub name: String,
    pub message: String,
}

impl PlatformError {
    pub const NOT_FOUND: &'static str = "NotFoundError";
    pub const NOT_ALLOWED: &'static str = "NotAllowedError";
    pub const OVERCONSTRAINED: &'static str = "OverconstrainedError";
    pub const NOT_SUPPORTED: &'static str = "NotSupportedError";
    pub const ABORT: &'static str = "AbortError";

    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Self::NOT_FOUND, message)
    }

    pub fn not_allowed(message: impl Into<String>) -> Self {
        Self::new(Self::NOT_ALLOWED, message)
    }

    /// `constraint` names the constraint that could not be met (e.g. `deviceId`).
    pub fn overconstrained(constraint: &str) -> Self {
        Self::new(
            Self::OVERCONSTRAINED,
            format!("constraint '{}' cannot be satisfied", constraint),
        )
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::new(Self::NOT_SUPPORTED, message)
    }
}
