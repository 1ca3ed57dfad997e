use std::fmt;
use std::sync::Arc;

use crate::traits::media_track::{MediaTrack, TrackKind};

/// A bundle of tracks managed as one unit.
///
/// Cloning shares the tracks; only the device manager stops them.
#[derive(Clone)]
pub struct MediaStream {
    id: String,
    tracks: Vec<Arc<dyn MediaTrack>>,
}

impl MediaStream {
    pub fn new(tracks: Vec<Arc<dyn MediaTrack>>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tracks,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tracks(&self) -> &[Arc<dyn MediaTrack>] {
        &self.tracks
    }

    pub fn tracks_of(&self, kind: TrackKind) -> impl Iterator<Item = &Arc<dyn MediaTrack>> {
        self.tracks.iter().filter(move |t| t.kind() == kind)
    }

    pub fn video_tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        self.tracks_of(TrackKind::Video).cloned().collect()
    }

    pub fn audio_tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        self.tracks_of(TrackKind::Audio).cloned().collect()
    }

    /// Whether at least one live track of `kind` is present.
    pub fn has_live(&self, kind: TrackKind) -> bool {
        self.tracks_of(kind).any(|t| t.is_live())
    }

    /// Whether any track is still live.
    pub fn is_active(&self) -> bool {
        self.tracks.iter().any(|t| t.is_live())
    }

    pub(crate) fn stop(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }

    pub(crate) fn stop_kind(&self, kind: TrackKind) {
        for track in self.tracks_of(kind) {
            track.stop();
        }
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<_> = self
            .tracks
            .iter()
            .map(|t| (t.kind(), t.is_live()))
            .collect();
        f.debug_struct("MediaStream")
            .field("id", &self.id)
            .field("tracks", &kinds)
            .finish()
    }
}

impl PartialEq for MediaStream {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
