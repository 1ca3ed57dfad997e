//! # meet-media-virtual
//!
//! In-process virtual device backend for meet-media.
//!
//! Provides:
//! - `VirtualPlatform` — simulated cameras, microphones and speakers with
//!   hot-plug, permission prompts and fault injection
//! - `VirtualAudioSink` — playback element with optional output routing
//! - `VirtualCamera` — colour-bar frame generator for the render pipeline
//!
//! ## Usage
//! ```ignore
//! use meet_media_core::MediaDeviceManager;
//! use meet_media_virtual::VirtualPlatform;
//!
//! let platform = VirtualPlatform::laptop();
//! let manager = MediaDeviceManager::new(platform.clone());
//! manager.activate()?;
//! manager.toggle_camera()?;
//! ```

pub mod audio_sink;
pub mod camera;
pub mod error;
pub mod permissions;
pub mod platform;
pub mod track;

pub use audio_sink::VirtualAudioSink;
pub use camera::{color_bars, VirtualCamera};
pub use error::VirtualDeviceError;
pub use permissions::PromptResponse;
pub use platform::VirtualPlatform;
pub use track::VirtualTrack;
