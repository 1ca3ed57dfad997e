pub mod camera_settings;
pub mod config;
pub mod constraints;
pub mod device;
pub mod error;
pub mod state;
pub mod stream;
