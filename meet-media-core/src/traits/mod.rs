pub mod audio_sink;
pub mod draw_surface;
pub mod frame_scheduler;
pub mod frame_source;
pub mod media_delegate;
pub mod media_platform;
pub mod media_track;
