use crate::models::device::{DeviceList, SelectedDevices};
use crate::models::error::MediaError;
use crate::models::state::MediaState;
use crate::models::stream::MediaStream;

/// Event delegate for device manager notifications.
///
/// This is the seam UI bindings hook into. Methods may be called from the
/// platform's notification thread; implementations should marshal to the UI
/// thread if needed.
pub trait MediaDelegate: Send + Sync {
    /// Called when enumeration detected a changed device set.
    fn on_devices_changed(&self, devices: &DeviceList, selected: &SelectedDevices);

    /// Called whenever camera/microphone on-state changes.
    fn on_media_state_changed(&self, state: &MediaState);

    /// Called when the current stream is replaced or released (`None`).
    fn on_stream_changed(&self, stream: Option<&MediaStream>);

    /// Called when an operation records a new latest error.
    fn on_error(&self, error: &MediaError);
}
