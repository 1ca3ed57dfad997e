//! In-process media platform with simulated devices.
//!
//! Devices can be plugged and unplugged at runtime (firing hot-plug
//! notifications), permissions are prompted per kind, and failures can be
//! injected to exercise a manager's error paths.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Weak};

use meet_media_core::{
    AudioConstraint, DeviceChangeCallback, DeviceChangeSubscription, DeviceDescriptor, DeviceKind,
    MediaConstraints, MediaPermissions, MediaPlatform, MediaStream, MediaTrack, PermissionState,
    PlatformError, TrackKind, VideoConstraint,
};
use parking_lot::Mutex;

use crate::error::VirtualDeviceError;
use crate::permissions::{self, PromptResponse};
use crate::track::VirtualTrack;

#[derive(Default)]
struct Faults {
    enumeration: Option<PlatformError>,
    permissions_query: Option<PlatformError>,
    acquisitions: VecDeque<PlatformError>,
}

struct PlatformInner {
    devices: Mutex<Vec<DeviceDescriptor>>,
    permissions: Mutex<MediaPermissions>,
    prompt_response: Mutex<PromptResponse>,
    faults: Mutex<Faults>,
    listeners: Mutex<Vec<(u64, DeviceChangeCallback)>>,
    next_listener: AtomicU64,
    /// Every track handed out and not yet observed stopped.
    tracks: Mutex<Vec<Arc<VirtualTrack>>>,
    next_track: AtomicU64,
    gate: Mutex<Option<Arc<Barrier>>>,
    capture_supported: AtomicBool,
    enumeration_supported: AtomicBool,
    acquisitions: AtomicUsize,
    last_constraints: Mutex<Option<MediaConstraints>>,
}

/// Simulated camera/microphone/speaker platform.
///
/// Cheap to clone; clones share the same simulated machine, so a test can keep
/// one handle while a manager owns another.
#[derive(Clone)]
pub struct VirtualPlatform {
    inner: Arc<PlatformInner>,
}

impl VirtualPlatform {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(PlatformInner {
                devices: Mutex::new(Vec::new()),
                permissions: Mutex::new(MediaPermissions::default()),
                prompt_response: Mutex::new(PromptResponse::Accept),
                faults: Mutex::new(Faults::default()),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(0),
                tracks: Mutex::new(Vec::new()),
                next_track: AtomicU64::new(0),
                gate: Mutex::new(None),
                capture_supported: AtomicBool::new(true),
                enumeration_supported: AtomicBool::new(true),
                acquisitions: AtomicUsize::new(0),
                last_constraints: Mutex::new(None),
            }),
        }
    }

    /// A platform pre-populated with `devices`. No notification is fired.
    pub fn with_devices(devices: Vec<DeviceDescriptor>) -> Self {
        let platform = Self::new();
        *platform.inner.devices.lock() = devices;
        platform
    }

    /// A laptop-like machine: one camera, one microphone, one speaker.
    pub fn laptop() -> Self {
        Self::with_devices(vec![
            DeviceDescriptor::new("cam-builtin", DeviceKind::Camera, "FaceTime HD Camera"),
            DeviceDescriptor::new("mic-builtin", DeviceKind::Microphone, "Built-in Microphone"),
            DeviceDescriptor::new("spk-builtin", DeviceKind::Speaker, "Built-in Speakers"),
        ])
    }

    // --- Device set ---

    /// Attach a device and fire a device-change notification.
    pub fn plug(&self, device: DeviceDescriptor) -> Result<(), VirtualDeviceError> {
        {
            let mut devices = self.inner.devices.lock();
            if devices.iter().any(|d| d.kind == device.kind && d.id == device.id) {
                return Err(VirtualDeviceError::DuplicateDevice {
                    kind: device.kind,
                    id: device.id,
                });
            }
            log::info!("plugged {:?} '{}'", device.kind, device.id);
            devices.push(device);
        }
        self.notify_device_change();
        Ok(())
    }

    /// Detach a device, end its live tracks, and fire a device-change notification.
    pub fn unplug(&self, kind: DeviceKind, id: &str) -> Result<DeviceDescriptor, VirtualDeviceError> {
        let removed = {
            let mut devices = self.inner.devices.lock();
            let index = devices
                .iter()
                .position(|d| d.kind == kind && d.id == id)
                .ok_or_else(|| VirtualDeviceError::UnknownDevice {
                    kind,
                    id: id.to_string(),
                })?;
            devices.remove(index)
        };
        log::info!("unplugged {:?} '{}'", kind, id);

        if kind != DeviceKind::Speaker {
            for track in self.inner.tracks.lock().iter() {
                if track.device_id() == id {
                    track.end();
                }
            }
        }
        self.notify_device_change();
        Ok(removed)
    }

    /// Replace the whole device set and fire a device-change notification.
    pub fn set_devices(&self, devices: Vec<DeviceDescriptor>) {
        *self.inner.devices.lock() = devices;
        self.notify_device_change();
    }

    /// Invoke every registered device-change callback.
    pub fn notify_device_change(&self) {
        let listeners: Vec<DeviceChangeCallback> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in listeners {
            callback();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    // --- Permissions ---

    pub fn set_permission(&self, kind: TrackKind, state: PermissionState) {
        let mut permissions = self.inner.permissions.lock();
        match kind {
            TrackKind::Video => permissions.camera = state,
            TrackKind::Audio => permissions.microphone = state,
        }
    }

    /// Grant both kinds up front, as after a previous session's consent.
    pub fn grant_all(&self) {
        self.set_permission(TrackKind::Video, PermissionState::Granted);
        self.set_permission(TrackKind::Audio, PermissionState::Granted);
    }

    pub fn set_prompt_response(&self, response: PromptResponse) {
        *self.inner.prompt_response.lock() = response;
    }

    pub fn permissions(&self) -> MediaPermissions {
        *self.inner.permissions.lock()
    }

    // --- Capabilities & faults ---

    pub fn set_capture_supported(&self, supported: bool) {
        self.inner.capture_supported.store(supported, Ordering::SeqCst);
    }

    pub fn set_enumeration_supported(&self, supported: bool) {
        self.inner.enumeration_supported.store(supported, Ordering::SeqCst);
    }

    /// Make every enumeration fail with `error` until cleared with `None`.
    pub fn fail_enumeration(&self, error: Option<PlatformError>) {
        self.inner.faults.lock().enumeration = error;
    }

    /// Make the next acquisition fail with `error`. Queued failures apply in order.
    pub fn fail_next_acquisition(&self, error: PlatformError) {
        self.inner.faults.lock().acquisitions.push_back(error);
    }

    pub fn fail_permission_query(&self, error: Option<PlatformError>) {
        self.inner.faults.lock().permissions_query = error;
    }

    /// Hold every acquisition until `parties` acquisitions are in flight at once.
    /// `None` removes the gate.
    pub fn gate_acquisitions(&self, parties: Option<usize>) {
        *self.inner.gate.lock() = parties.map(|n| Arc::new(Barrier::new(n)));
    }

    // --- Inspection ---

    /// Live tracks handed out by this platform, optionally of one kind.
    pub fn live_track_count(&self, kind: Option<TrackKind>) -> usize {
        self.inner
            .tracks
            .lock()
            .iter()
            .filter(|t| t.is_live() && kind.is_none_or(|k| t.kind() == k))
            .count()
    }

    /// Number of acquisition requests received, successful or not.
    pub fn acquisition_count(&self) -> usize {
        self.inner.acquisitions.load(Ordering::SeqCst)
    }

    pub fn last_constraints(&self) -> Option<MediaConstraints> {
        self.inner.last_constraints.lock().clone()
    }

    // --- Internal helpers ---

    fn find_device(&self, kind: DeviceKind, id: &str) -> Option<DeviceDescriptor> {
        self.inner
            .devices
            .lock()
            .iter()
            .find(|d| d.kind == kind && d.id == id)
            .cloned()
    }

    fn first_device(&self, kind: DeviceKind) -> Option<DeviceDescriptor> {
        self.inner.devices.lock().iter().find(|d| d.kind == kind).cloned()
    }

    fn resolve_video(&self, constraint: &VideoConstraint) -> Result<DeviceDescriptor, PlatformError> {
        match constraint {
            VideoConstraint::ExactDevice(id) => self
                .find_device(DeviceKind::Camera, id)
                .ok_or_else(|| PlatformError::overconstrained("deviceId")),
            VideoConstraint::IdealResolution { .. } => self
                .first_device(DeviceKind::Camera)
                .ok_or_else(|| PlatformError::not_found("no camera available")),
        }
    }

    fn resolve_audio(&self, constraint: &AudioConstraint) -> Result<DeviceDescriptor, PlatformError> {
        match constraint {
            AudioConstraint::ExactDevice(id) => self
                .find_device(DeviceKind::Microphone, id)
                .ok_or_else(|| PlatformError::overconstrained("deviceId")),
            AudioConstraint::Processing { .. } => self
                .first_device(DeviceKind::Microphone)
                .ok_or_else(|| PlatformError::not_found("no microphone available")),
        }
    }

    /// Resolve (and remember) the permission for `kind`. Returns whether it is granted.
    fn prompt(&self, kind: TrackKind) -> bool {
        let response = *self.inner.prompt_response.lock();
        let mut permissions = self.inner.permissions.lock();
        let slot = match kind {
            TrackKind::Video => &mut permissions.camera,
            TrackKind::Audio => &mut permissions.microphone,
        };
        *slot = permissions::resolve(*slot, response);
        *slot == PermissionState::Granted
    }

    fn open_track(&self, kind: TrackKind, device: &DeviceDescriptor) -> Arc<VirtualTrack> {
        let n = self.inner.next_track.fetch_add(1, Ordering::SeqCst) + 1;
        let track = Arc::new(VirtualTrack::new(
            format!("{}-track-{}", device.id, n),
            kind,
            device.id.clone(),
        ));
        let mut tracks = self.inner.tracks.lock();
        tracks.retain(|t| t.is_live());
        tracks.push(Arc::clone(&track));
        track
    }
}

impl Default for VirtualPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaPlatform for VirtualPlatform {
    fn supports_capture(&self) -> bool {
        self.inner.capture_supported.load(Ordering::SeqCst)
    }

    fn supports_enumeration(&self) -> bool {
        self.inner.enumeration_supported.load(Ordering::SeqCst)
    }

    fn enumerate_devices(&self) -> Result<Vec<DeviceDescriptor>, PlatformError> {
        if !self.supports_enumeration() {
            return Err(PlatformError::not_supported("device enumeration is not available"));
        }
        if let Some(error) = self.inner.faults.lock().enumeration.clone() {
            return Err(error);
        }

        let permissions = self.permissions();
        let devices = self.inner.devices.lock().clone();
        Ok(devices
            .into_iter()
            .map(|mut device| {
                // Labels are withheld until the matching capture permission is granted.
                let granted = match device.kind {
                    DeviceKind::Camera => permissions.camera == PermissionState::Granted,
                    DeviceKind::Microphone | DeviceKind::Speaker => {
                        permissions.microphone == PermissionState::Granted
                    }
                };
                if !granted {
                    device.label.clear();
                }
                device
            })
            .collect())
    }

    fn acquire(&self, constraints: &MediaConstraints) -> Result<MediaStream, PlatformError> {
        let gate = self.inner.gate.lock().clone();
        if let Some(barrier) = gate {
            barrier.wait();
        }

        self.inner.acquisitions.fetch_add(1, Ordering::SeqCst);
        *self.inner.last_constraints.lock() = Some(constraints.clone());

        if let Some(error) = self.inner.faults.lock().acquisitions.pop_front() {
            return Err(error);
        }
        if !self.supports_capture() {
            return Err(PlatformError::not_supported("capture is not available"));
        }
        if constraints.is_empty() {
            return Err(PlatformError::new(
                "TypeError",
                "at least one of audio and video must be requested",
            ));
        }

        let camera = constraints
            .video
            .as_ref()
            .map(|c| self.resolve_video(c))
            .transpose()?;
        let microphone = constraints
            .audio
            .as_ref()
            .map(|c| self.resolve_audio(c))
            .transpose()?;

        let camera = camera.filter(|_| self.prompt(TrackKind::Video));
        let microphone = microphone.filter(|_| self.prompt(TrackKind::Audio));
        if camera.is_none() && microphone.is_none() {
            return Err(PlatformError::not_allowed("capture permission denied"));
        }

        let mut tracks: Vec<Arc<dyn MediaTrack>> = Vec::new();
        if let Some(device) = &camera {
            tracks.push(self.open_track(TrackKind::Video, device));
        }
        if let Some(device) = &microphone {
            tracks.push(self.open_track(TrackKind::Audio, device));
        }
        let stream = MediaStream::new(tracks);
        log::debug!("virtual stream {} opened: {:?}", stream.id(), stream);
        Ok(stream)
    }

    fn on_device_change(&self, callback: DeviceChangeCallback) -> DeviceChangeSubscription {
        let id = self.inner.next_listener.fetch_add(1, Ordering::SeqCst);
        self.inner.listeners.lock().push((id, callback));
        let weak: Weak<PlatformInner> = Arc::downgrade(&self.inner);
        DeviceChangeSubscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.lock().retain(|(listener, _)| *listener != id);
            }
        })
    }

    fn query_permissions(&self) -> Result<MediaPermissions, PlatformError> {
        if let Some(error) = self.inner.faults.lock().permissions_query.clone() {
            return Err(error);
        }
        Ok(self.permissions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_hidden_until_granted() {
        let platform = VirtualPlatform::laptop();
        let devices = platform.enumerate_devices().unwrap();
        assert!(devices.iter().all(|d| d.label.is_empty()));

        platform.grant_all();
        let devices = platform.enumerate_devices().unwrap();
        assert!(devices.iter().all(|d| !d.label.is_empty()));
    }

    #[test]
    fn exact_device_never_falls_back() {
        let platform = VirtualPlatform::laptop();
        let constraints = MediaConstraints {
            video: Some(VideoConstraint::ExactDevice("cam-missing".into())),
            audio: None,
        };
        let err = platform.acquire(&constraints).unwrap_err();
        assert_eq!(err.name, PlatformError::OVERCONSTRAINED);
        assert_eq!(platform.live_track_count(None), 0);
    }

    #[test]
    fn partial_grant_delivers_remaining_kind() {
        let platform = VirtualPlatform::laptop();
        platform.set_permission(TrackKind::Video, PermissionState::Denied);
        let constraints = MediaConstraints::defaults(&Default::default(), true, true);
        let stream = platform.acquire(&constraints).unwrap();
        assert!(!stream.has_live(TrackKind::Video));
        assert!(stream.has_live(TrackKind::Audio));
    }

    #[test]
    fn denied_prompt_fails_request() {
        let platform = VirtualPlatform::laptop();
        platform.set_prompt_response(PromptResponse::Deny);
        let constraints = MediaConstraints::defaults(&Default::default(), true, false);
        let err = platform.acquire(&constraints).unwrap_err();
        assert_eq!(err.name, PlatformError::NOT_ALLOWED);
        assert_eq!(platform.permissions().camera, PermissionState::Denied);
    }

    #[test]
    fn unplug_ends_tracks_and_notifies() {
        let platform = VirtualPlatform::laptop();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _sub = platform.on_device_change(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let constraints = MediaConstraints::defaults(&Default::default(), true, false);
        let stream = platform.acquire(&constraints).unwrap();
        platform.unplug(DeviceKind::Camera, "cam-builtin").unwrap();

        assert!(!stream.is_active());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            platform.unplug(DeviceKind::Camera, "cam-builtin"),
            Err(VirtualDeviceError::UnknownDevice { .. })
        ));
    }

    #[test]
    fn dropping_subscription_removes_listener() {
        let platform = VirtualPlatform::laptop();
        let sub = platform.on_device_change(Arc::new(|| {}));
        assert_eq!(platform.listener_count(), 1);
        drop(sub);
        assert_eq!(platform.listener_count(), 0);
    }

    #[test]
    fn duplicate_plug_is_rejected() {
        let platform = VirtualPlatform::laptop();
        let err = platform
            .plug(DeviceDescriptor::new("mic-builtin", DeviceKind::Microphone, "again"))
            .unwrap_err();
        assert!(matches!(err, VirtualDeviceError::DuplicateDevice { .. }));
    }
}
