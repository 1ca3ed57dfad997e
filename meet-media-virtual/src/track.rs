use std::sync::atomic::{AtomicBool, Ordering};

use meet_media_core::{MediaTrack, TrackKind};

/// A simulated capture track. Live until stopped or its device is unplugged.
#[derive(Debug)]
pub struct VirtualTrack {
    id: String,
    kind: TrackKind,
    device_id: String,
    live: AtomicBool,
}

impl VirtualTrack {
    pub fn new(id: String, kind: TrackKind, device_id: String) -> Self {
        Self {
            id,
            kind,
            device_id,
            live: AtomicBool::new(true),
        }
    }

    /// Mark the track ended without a consumer stop, as on device removal.
    pub(crate) fn end(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            log::debug!("track {} ended: device {} removed", self.id, self.device_id);
        }
    }
}

impl MediaTrack for VirtualTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn stop(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            log::debug!("track {} stopped", self.id);
        }
    }
}
