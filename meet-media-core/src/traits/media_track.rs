use serde::{Deserialize, Serialize};

/// Kind of signal carried by a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

/// A single live audio or video channel handed out by a platform backend.
///
/// Implemented by:
/// - `VirtualTrack` (meet-media-virtual)
pub trait MediaTrack: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> TrackKind;

    /// Id of the device producing this track.
    fn device_id(&self) -> &str;

    /// Whether the track is still delivering media.
    fn is_live(&self) -> bool;

    /// Stop the track and release its device. Stopping an ended track is a no-op.
    fn stop(&self);
}
