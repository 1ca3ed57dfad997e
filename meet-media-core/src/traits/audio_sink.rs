use crate::models::error::PlatformError;

/// A playback element that renders audio to an output device.
///
/// Sinks consume streams but never own their lifecycle.
pub trait AudioSink: Send + Sync {
    /// Whether this sink can be routed to a specific output device.
    fn supports_output_selection(&self) -> bool;

    /// Route playback to the speaker with `device_id`.
    fn set_output_device(&self, device_id: &str) -> Result<(), PlatformError>;

    /// Currently routed output device id, empty for the platform default.
    fn output_device(&self) -> String;
}
