//! # meet-media-core
//!
//! Platform-agnostic media core for video-meeting front ends.
//!
//! Provides device enumeration and selection, single-stream capture
//! management, and the camera transform pipeline (flip, rotate, aspect ratio)
//! driven by a paint-cadence render loop. Platform backends (browser, virtual
//! devices) implement the `MediaPlatform` trait and plug into the generic
//! `MediaDeviceManager`.
//!
//! ## Architecture
//!
//! ```text
//! meet-media-core (this crate)
//! ├── traits/    ← MediaPlatform, MediaTrack, AudioSink, MediaDelegate,
//! │                FrameSource, DrawSurface, FrameScheduler
//! ├── models/    ← MediaError, DeviceList, SelectedDevices, MediaState,
//! │                MediaStream, MediaConstraints, CameraSettings, config
//! ├── manager/   ← MediaDeviceManager (device/stream lifecycle)
//! └── render/    ← render loop, CameraRenderer, schedulers, RasterSurface
//! ```

pub mod manager;
pub mod models;
pub mod render;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use manager::device_manager::MediaDeviceManager;
pub use models::camera_settings::{AspectRatio, CameraSettings, Rotation};
pub use models::config::MediaConfiguration;
pub use models::constraints::{AudioConstraint, MediaConstraints, VideoConstraint};
pub use models::device::{DeviceDescriptor, DeviceKind, DeviceList, SelectedDevices};
pub use models::error::{MediaError, PlatformError};
pub use models::state::{MediaPermissions, MediaState, PermissionState};
pub use models::stream::MediaStream;
pub use render::camera_renderer::CameraRenderer;
pub use render::geometry::{draw_dimensions, surface_dimensions, DrawSize, FrameSize};
pub use render::raster::{RasterSurface, SharedFrameSource};
pub use render::render_loop::{start_rendering, stop_rendering, RenderLoopHandle};
pub use render::scheduler::{IntervalFrameScheduler, ManualFrameScheduler};
pub use render::transform::{render_frame, Affine2D};
pub use traits::audio_sink::AudioSink;
pub use traits::draw_surface::DrawSurface;
pub use traits::frame_scheduler::{FrameCallback, FrameRequestId, FrameScheduler};
pub use traits::frame_source::FrameSource;
pub use traits::media_delegate::MediaDelegate;
pub use traits::media_platform::{DeviceChangeCallback, DeviceChangeSubscription, MediaPlatform};
pub use traits::media_track::{MediaTrack, TrackKind};
