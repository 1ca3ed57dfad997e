use serde::{Deserialize, Serialize};

/// Whether the current stream carries a live camera / microphone track.
///
/// Reflects what the platform actually delivered, not what was requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaState {
    pub camera_on: bool,
    pub microphone_on: bool,
}

impl MediaState {
    pub fn is_idle(&self) -> bool {
        !self.camera_on && !self.microphone_on
    }
}

/// Capture permission state as reported by the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Denied,
    #[default]
    Prompt,
}

/// Camera and microphone permission states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPermissions {
    pub camera: PermissionState,
    pub microphone: PermissionState,
}
