use std::fmt;
use std::sync::Arc;

use crate::models::constraints::MediaConstraints;
use crate::models::device::DeviceDescriptor;
use crate::models::error::PlatformError;
use crate::models::state::MediaPermissions;
use crate::models::stream::MediaStream;

/// Callback invoked when the platform's set of devices changes.
pub type DeviceChangeCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// Capability access to cameras, microphones, and speakers.
///
/// Implemented by:
/// - `VirtualPlatform` (meet-media-virtual)
/// - Future: browser backend over `navigator.mediaDevices`
pub trait MediaPlatform: Send + Sync + 'static {
    /// Whether stream acquisition is available at all.
    fn supports_capture(&self) -> bool;

    /// Whether device enumeration is available at all.
    fn supports_enumeration(&self) -> bool;

    /// List every camera, microphone, and speaker in platform order.
    fn enumerate_devices(&self) -> Result<Vec<DeviceDescriptor>, PlatformError>;

    /// Acquire a new capture stream satisfying `constraints`.
    ///
    /// Exact device constraints must fail rather than substitute another device.
    /// The platform may deliver fewer kinds than requested.
    fn acquire(&self, constraints: &MediaConstraints) -> Result<MediaStream, PlatformError>;

    /// Register for device hot-plug notifications.
    ///
    /// The returned guard unregisters `callback` when dropped.
    fn on_device_change(&self, callback: DeviceChangeCallback) -> DeviceChangeSubscription;

    /// Current capture permission states.
    fn query_permissions(&self) -> Result<MediaPermissions, PlatformError>;
}

/// Guard for a device-change registration. Unsubscribes on drop.
pub struct DeviceChangeSubscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl DeviceChangeSubscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// A subscription for platforms without hot-plug notifications.
    pub fn inert() -> Self {
        Self { unsubscribe: None }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for DeviceChangeSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for DeviceChangeSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceChangeSubscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn drop_unsubscribes_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let sub = DeviceChangeSubscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(sub);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn explicit_unsubscribe_does_not_repeat_on_drop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let sub = DeviceChangeSubscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        sub.unsubscribe();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
