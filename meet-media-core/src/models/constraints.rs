use serde::{Deserialize, Serialize};

use super::config::MediaConfiguration;
use super::device::SelectedDevices;

/// Video portion of a capture request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VideoConstraint {
    /// Exactly this camera. The platform must fail rather than substitute another.
    ExactDevice(String),
    IdealResolution { width: u32, height: u32 },
}

/// Audio portion of a capture request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AudioConstraint {
    /// Exactly this microphone. The platform must fail rather than substitute another.
    ExactDevice(String),
    Processing {
        echo_cancellation: bool,
        noise_suppression: bool,
    },
}

/// A capture request handed to the platform. `None` means "do not capture".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaConstraints {
    pub video: Option<VideoConstraint>,
    pub audio: Option<AudioConstraint>,
}

impl MediaConstraints {
    /// Build constraints from the current selection.
    ///
    /// A selected device is requested exactly; with no selection the
    /// configured defaults apply.
    pub fn for_selection(
        selected: &SelectedDevices,
        config: &MediaConfiguration,
        want_video: bool,
        want_audio: bool,
    ) -> Self {
        let video = want_video.then(|| {
            if selected.camera.is_empty() {
                VideoConstraint::IdealResolution {
                    width: config.ideal_width,
                    height: config.ideal_height,
                }
            } else {
                VideoConstraint::ExactDevice(selected.camera.clone())
            }
        });

        let audio = want_audio.then(|| {
            if selected.microphone.is_empty() {
                AudioConstraint::Processing {
                    echo_cancellation: config.echo_cancellation,
                    noise_suppression: config.noise_suppression,
                }
            } else {
                AudioConstraint::ExactDevice(selected.microphone.clone())
            }
        });

        Self { video, audio }
    }

    /// Default constraints with no device preference.
    pub fn defaults(config: &MediaConfiguration, want_video: bool, want_audio: bool) -> Self {
        Self::for_selection(&SelectedDevices::default(), config, want_video, want_audio)
    }

    pub fn is_empty(&self) -> bool {
        self.video.is_none() && self.audio.is_none()
    }
}
