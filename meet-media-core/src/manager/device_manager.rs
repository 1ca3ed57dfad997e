use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use crate::models::config::MediaConfiguration;
use crate::models::constraints::MediaConstraints;
use crate::models::device::{DeviceDescriptor, DeviceKind, DeviceList, SelectedDevices};
use crate::models::error::MediaError;
use crate::models::state::{MediaPermissions, MediaState};
use crate::models::stream::MediaStream;
use crate::traits::audio_sink::AudioSink;
use crate::traits::media_delegate::MediaDelegate;
use crate::traits::media_platform::{DeviceChangeSubscription, MediaPlatform};
use crate::traits::media_track::TrackKind;

/// Internal mutable manager state, protected by `parking_lot::Mutex`.
///
/// The lock is never held across a platform call.
#[derive(Debug, Default)]
struct ManagerState {
    devices: DeviceList,
    selected: SelectedDevices,
    media_state: MediaState,
    current_stream: Option<MediaStream>,
    last_error: Option<MediaError>,
    initialized: bool,
}

/// State shared with the hot-plug callback.
struct ManagerInner<P: MediaPlatform> {
    platform: P,
    config: MediaConfiguration,
    state: Mutex<ManagerState>,
    delegate: RwLock<Option<Arc<dyn MediaDelegate>>>,
    /// Sequence number of the most recently issued acquisition.
    acquisition_seq: AtomicU64,
}

/// Owner of device selection and the single current capture stream.
///
/// Generic over the platform backend via the `MediaPlatform` trait:
/// ```text
/// [MediaPlatform] ── enumerate ──→ DeviceList ──→ SelectedDevices
///        │                                              │
///        └──────── acquire(constraints) ←───────────────┘
///                        │
///                        ▼
///                 current MediaStream ──→ sinks / frame source
/// ```
///
/// Call [`activate`](Self::activate) once the consumer is attached; dropping
/// the manager (or [`shutdown`](Self::shutdown)) unsubscribes from hot-plug
/// notifications and releases all tracks.
pub struct MediaDeviceManager<P: MediaPlatform> {
    inner: Arc<ManagerInner<P>>,
    subscription: Mutex<Option<DeviceChangeSubscription>>,
}

impl<P: MediaPlatform> MediaDeviceManager<P> {
    pub fn new(platform: P) -> Self {
        Self::build(platform, MediaConfiguration::default())
    }

    pub fn with_configuration(platform: P, config: MediaConfiguration) -> Result<Self, MediaError> {
        config.validate().map_err(MediaError::InvalidConfiguration)?;
        Ok(Self::build(platform, config))
    }

    fn build(platform: P, config: MediaConfiguration) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                platform,
                config,
                state: Mutex::new(ManagerState::default()),
                delegate: RwLock::new(None),
                acquisition_seq: AtomicU64::new(0),
            }),
            subscription: Mutex::new(None),
        }
    }

    pub fn set_delegate(&self, delegate: Arc<dyn MediaDelegate>) {
        *self.inner.delegate.write() = Some(delegate);
    }

    pub fn platform(&self) -> &P {
        &self.inner.platform
    }

    pub fn configuration(&self) -> &MediaConfiguration {
        &self.inner.config
    }

    // --- Lifecycle ---

    /// Subscribe to hot-plug notifications and run the initial enumeration.
    ///
    /// Calling again keeps the existing subscription and only re-enumerates.
    pub fn activate(&self) -> Result<DeviceList, MediaError> {
        {
            let mut subscription = self.subscription.lock();
            if subscription.is_none() {
                let weak: Weak<ManagerInner<P>> = Arc::downgrade(&self.inner);
                let callback = Arc::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        log::debug!("device change notification");
                        let _ = inner.refresh_devices();
                    }
                });
                *subscription = Some(self.inner.platform.on_device_change(callback));
                log::info!("media device manager activated");
            }
        }
        self.enumerate()
    }

    /// Whether a hot-plug subscription is held.
    pub fn is_active(&self) -> bool {
        self.subscription.lock().is_some()
    }

    /// Unsubscribe from hot-plug notifications and release every track.
    pub fn shutdown(&self) {
        if let Some(subscription) = self.subscription.lock().take() {
            subscription.unsubscribe();
            log::info!("media device manager deactivated");
        }
        self.stop_all();
    }

    // --- Enumeration ---

    /// Enumerate devices and re-derive the selection if the device set changed.
    pub fn enumerate(&self) -> Result<DeviceList, MediaError> {
        self.inner.refresh_devices()?;
        Ok(self.devices())
    }

    /// Enumerate devices; returns whether the device set changed.
    pub fn refresh_devices(&self) -> Result<bool, MediaError> {
        self.inner.refresh_devices()
    }

    // --- Streams ---

    /// Replace the current stream with one carrying the requested kinds.
    pub fn acquire_stream(&self, want_video: bool, want_audio: bool) -> Result<MediaStream, MediaError> {
        self.inner.acquire_stream(want_video, want_audio)
    }

    pub fn toggle_camera(&self) -> Result<(), MediaError> {
        self.inner.toggle(TrackKind::Video)
    }

    pub fn toggle_microphone(&self) -> Result<(), MediaError> {
        self.inner.toggle(TrackKind::Audio)
    }

    /// Select `device_id` for `kind`. If that kind is live, the stream is
    /// re-acquired so the change takes effect immediately.
    pub fn handle_device_change(&self, kind: DeviceKind, device_id: &str) -> Result<(), MediaError> {
        self.inner.handle_device_change(kind, device_id)
    }

    /// Release the current stream and mark both kinds off.
    pub fn stop_all(&self) {
        self.inner.stop_all();
    }

    // --- Output ---

    /// Route `sink` to the speaker `device_id`.
    ///
    /// Sinks without output selection yield `OutputSelectionUnsupported` and
    /// nothing is changed.
    pub fn select_output_device(&self, sink: &dyn AudioSink, device_id: &str) -> Result<(), MediaError> {
        if !sink.supports_output_selection() {
            log::warn!("audio output selection is not supported by this sink");
            return Err(MediaError::OutputSelectionUnsupported);
        }
        sink.set_output_device(device_id).map_err(|e| {
            log::error!("failed to set audio output device {}: {}", device_id, e);
            self.inner.record_error(MediaError::OutputSelectionFailed);
            MediaError::OutputSelectionFailed
        })
    }

    /// Select the speaker and route every sink that supports it.
    ///
    /// Sinks without output selection are skipped. Returns the first routing failure.
    pub fn select_speaker(&self, device_id: &str, sinks: &[&dyn AudioSink]) -> Result<(), MediaError> {
        self.handle_device_change(DeviceKind::Speaker, device_id)?;
        let mut first_error = None;
        for sink in sinks {
            match self.select_output_device(*sink, device_id) {
                Ok(()) | Err(MediaError::OutputSelectionUnsupported) => {}
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    // --- Capabilities ---

    pub fn is_media_supported(&self) -> bool {
        self.inner.platform.supports_capture()
    }

    pub fn is_enumeration_supported(&self) -> bool {
        self.inner.platform.supports_enumeration()
    }

    pub fn is_output_selection_supported(&self, sink: &dyn AudioSink) -> bool {
        sink.supports_output_selection()
    }

    /// Prompt for capture permission by opening and immediately closing a
    /// throwaway stream. The current stream is not touched.
    pub fn request_permissions(&self, video: bool, audio: bool) -> bool {
        if !self.inner.platform.supports_capture() {
            return false;
        }
        let constraints = MediaConstraints::defaults(&self.inner.config, video, audio);
        if constraints.is_empty() {
            return false;
        }
        match self.inner.platform.acquire(&constraints) {
            Ok(stream) => {
                stream.stop();
                true
            }
            Err(e) => {
                log::warn!("permission request failed: {}", e);
                false
            }
        }
    }

    /// Platform permission states; `prompt` for both when the query fails.
    pub fn permission_status(&self) -> MediaPermissions {
        self.inner.platform.query_permissions().unwrap_or_else(|e| {
            log::warn!("failed to query media permissions: {}", e);
            MediaPermissions::default()
        })
    }

    // --- Queries ---

    pub fn devices(&self) -> DeviceList {
        self.inner.state.lock().devices.clone()
    }

    pub fn devices_of(&self, kind: DeviceKind) -> Vec<DeviceDescriptor> {
        self.inner.state.lock().devices.of_kind(kind).to_vec()
    }

    pub fn selected_devices(&self) -> SelectedDevices {
        self.inner.state.lock().selected.clone()
    }

    /// Descriptor of the selected device of `kind`, if it is listed.
    pub fn current_device(&self, kind: DeviceKind) -> Option<DeviceDescriptor> {
        let s = self.inner.state.lock();
        s.devices.find(kind, s.selected.get(kind)).cloned()
    }

    pub fn media_state(&self) -> MediaState {
        self.inner.state.lock().media_state
    }

    pub fn current_stream(&self) -> Option<MediaStream> {
        self.inner.state.lock().current_stream.clone()
    }

    pub fn last_error(&self) -> Option<MediaError> {
        self.inner.state.lock().last_error.clone()
    }

    pub fn clear_error(&self) {
        self.inner.state.lock().last_error = None;
    }

    /// Whether a non-empty device set has been enumerated at least once.
    pub fn is_initialized(&self) -> bool {
        self.inner.state.lock().initialized
    }
}

impl<P: MediaPlatform> Drop for MediaDeviceManager<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<P: MediaPlatform> ManagerInner<P> {
    fn refresh_devices(&self) -> Result<bool, MediaError> {
        let raw = match self.platform.enumerate_devices() {
            Ok(devices) => devices,
            Err(e) => {
                log::error!("device enumeration failed: {}", e);
                self.record_error(MediaError::EnumerationFailed);
                return Err(MediaError::EnumerationFailed);
            }
        };
        let fresh = DeviceList::partition(raw);

        let (changed, ended, released) = {
            let mut s = self.state.lock();
            let changed = s.devices.differs_from(&fresh);
            if changed {
                s.selected = s.selected.reconcile(&fresh, !s.initialized);
                s.initialized = true;
            }
            // Labels can appear after permission is granted without an id change.
            s.devices = fresh;

            // Removing a device ends its tracks; the on-state follows what is still live.
            let live = s.current_stream.as_ref().map(|stream| MediaState {
                camera_on: s.media_state.camera_on && stream.has_live(TrackKind::Video),
                microphone_on: s.media_state.microphone_on && stream.has_live(TrackKind::Audio),
            });
            let (ended, released) = match live {
                Some(live) if live != s.media_state => {
                    s.media_state = live;
                    let released = if live.is_idle() { s.current_stream.take() } else { None };
                    (Some(live), released)
                }
                _ => (None, None),
            };
            (
                changed.then(|| (s.devices.clone(), s.selected.clone())),
                ended,
                released,
            )
        };

        if let Some(stream) = &released {
            stream.stop();
            log::info!("stream {} released: no live tracks left", stream.id());
        }
        if let Some(media_state) = ended {
            log::info!(
                "capture ended by device removal (camera={}, microphone={})",
                media_state.camera_on,
                media_state.microphone_on
            );
            if let Some(delegate) = self.delegate() {
                if released.is_some() {
                    delegate.on_stream_changed(None);
                }
                delegate.on_media_state_changed(&media_state);
            }
        }

        match changed {
            Some((devices, selected)) => {
                log::info!(
                    "devices changed: {} cameras, {} microphones, {} speakers",
                    devices.cameras.len(),
                    devices.microphones.len(),
                    devices.speakers.len()
                );
                if let Some(delegate) = self.delegate() {
                    delegate.on_devices_changed(&devices, &selected);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn acquire_stream(&self, want_video: bool, want_audio: bool) -> Result<MediaStream, MediaError> {
        if !want_video && !want_audio {
            self.record_error(MediaError::ConstraintsNotSatisfiable);
            return Err(MediaError::ConstraintsNotSatisfiable);
        }
        if !self.platform.supports_capture() {
            log::warn!("stream requested but capture is not supported");
            self.record_error(MediaError::CaptureUnsupported);
            return Err(MediaError::CaptureUnsupported);
        }

        let seq = self.acquisition_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let (constraints, previous) = {
            let mut s = self.state.lock();
            let constraints =
                MediaConstraints::for_selection(&s.selected, &self.config, want_video, want_audio);
            (constraints, s.current_stream.take())
        };

        // Release the held stream before asking for a new one.
        if let Some(previous) = previous {
            previous.stop();
            log::debug!("released stream {}", previous.id());
            if let Some(delegate) = self.delegate() {
                delegate.on_stream_changed(None);
            }
        }

        log::debug!("acquisition #{} requested: {:?}", seq, constraints);
        let result = self.platform.acquire(&constraints);

        match result {
            Ok(stream) => {
                let media_state = {
                    let mut s = self.state.lock();
                    if self.acquisition_seq.load(Ordering::SeqCst) != seq {
                        drop(s);
                        stream.stop();
                        log::debug!("acquisition #{} superseded, stream discarded", seq);
                        return Err(MediaError::Superseded);
                    }
                    s.media_state = MediaState {
                        camera_on: want_video && stream.has_live(TrackKind::Video),
                        microphone_on: want_audio && stream.has_live(TrackKind::Audio),
                    };
                    s.current_stream = Some(stream.clone());
                    s.media_state
                };

                log::info!(
                    "stream {} acquired (camera={}, microphone={})",
                    stream.id(),
                    media_state.camera_on,
                    media_state.microphone_on
                );
                if let Some(delegate) = self.delegate() {
                    delegate.on_stream_changed(Some(&stream));
                    delegate.on_media_state_changed(&media_state);
                }
                Ok(stream)
            }
            Err(e) => {
                let error = MediaError::from_acquisition(&e);
                if self.acquisition_seq.load(Ordering::SeqCst) != seq {
                    log::debug!("acquisition #{} superseded after failure: {}", seq, e);
                    return Err(MediaError::Superseded);
                }
                log::error!("stream acquisition failed: {}", e);
                self.record_error(error.clone());
                Err(error)
            }
        }
    }

    fn toggle(&self, kind: TrackKind) -> Result<(), MediaError> {
        let state = self.state.lock().media_state;
        let (is_on, other_on) = match kind {
            TrackKind::Video => (state.camera_on, state.microphone_on),
            TrackKind::Audio => (state.microphone_on, state.camera_on),
        };

        if !is_on {
            let (want_video, want_audio) = match kind {
                TrackKind::Video => (true, other_on),
                TrackKind::Audio => (other_on, true),
            };
            return match self.acquire_stream(want_video, want_audio) {
                Ok(_) | Err(MediaError::Superseded) => Ok(()),
                Err(e) => Err(e),
            };
        }

        let (media_state, released) = {
            let mut s = self.state.lock();
            if let Some(stream) = &s.current_stream {
                stream.stop_kind(kind);
            }
            match kind {
                TrackKind::Video => s.media_state.camera_on = false,
                TrackKind::Audio => s.media_state.microphone_on = false,
            }
            let released = if other_on { None } else { s.current_stream.take() };
            (s.media_state, released)
        };
        log::debug!("{:?} tracks stopped", kind);

        if let Some(stream) = &released {
            stream.stop();
        }
        if let Some(delegate) = self.delegate() {
            if released.is_some() {
                delegate.on_stream_changed(None);
            }
            delegate.on_media_state_changed(&media_state);
        }

        if other_on {
            let (want_video, want_audio) = match kind {
                TrackKind::Video => (false, true),
                TrackKind::Audio => (true, false),
            };
            return match self.acquire_stream(want_video, want_audio) {
                Ok(_) | Err(MediaError::Superseded) => Ok(()),
                Err(e) => Err(e),
            };
        }
        Ok(())
    }

    fn handle_device_change(&self, kind: DeviceKind, device_id: &str) -> Result<(), MediaError> {
        let (media_state, devices, selected) = {
            let mut s = self.state.lock();
            if !device_id.is_empty() && !s.devices.contains(kind, device_id) {
                drop(s);
                log::warn!("cannot select unknown {:?} device {}", kind, device_id);
                self.record_error(MediaError::DeviceNotFound);
                return Err(MediaError::DeviceNotFound);
            }
            s.selected.set(kind, device_id);
            (s.media_state, s.devices.clone(), s.selected.clone())
        };
        log::info!("selected {:?} device '{}'", kind, device_id);
        if let Some(delegate) = self.delegate() {
            delegate.on_devices_changed(&devices, &selected);
        }

        let reacquire = match kind {
            DeviceKind::Camera if media_state.camera_on => Some((true, media_state.microphone_on)),
            DeviceKind::Microphone if media_state.microphone_on => Some((media_state.camera_on, true)),
            _ => None,
        };
        match reacquire {
            Some((want_video, want_audio)) => match self.acquire_stream(want_video, want_audio) {
                Ok(_) | Err(MediaError::Superseded) => Ok(()),
                Err(e) => Err(e),
            },
            None => Ok(()),
        }
    }

    fn stop_all(&self) {
        let (released, was) = {
            let mut s = self.state.lock();
            let was = s.media_state;
            s.media_state = MediaState::default();
            (s.current_stream.take(), was)
        };
        if let Some(stream) = &released {
            stream.stop();
            log::info!("stream {} released", stream.id());
        }
        if let Some(delegate) = self.delegate() {
            if released.is_some() {
                delegate.on_stream_changed(None);
            }
            if !was.is_idle() {
                delegate.on_media_state_changed(&MediaState::default());
            }
        }
    }

    fn record_error(&self, error: MediaError) {
        self.state.lock().last_error = Some(error.clone());
        if let Some(delegate) = self.delegate() {
            delegate.on_error(&error);
        }
    }

    fn delegate(&self) -> Option<Arc<dyn MediaDelegate>> {
        self.delegate.read().clone()
    }
}
