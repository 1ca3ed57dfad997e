pub mod camera_renderer;
pub mod geometry;
pub mod raster;
pub mod render_loop;
pub mod scheduler;
pub mod transform;
