use crate::render::geometry::FrameSize;
use crate::traits::frame_source::FrameSource;

/// A 2D drawing surface with a canvas-style transform stack.
///
/// Transform calls compose onto the current transform in call order; `save`
/// and `restore` push and pop it.
///
/// Implemented by:
/// - `RasterSurface` (RGBA image backed)
pub trait DrawSurface: Send + 'static {
    fn size(&self) -> FrameSize;

    /// Resize the surface. Resizing clears its contents and resets the transform.
    fn set_size(&mut self, size: FrameSize);

    /// Clear every pixel to transparent.
    fn clear(&mut self);

    fn save(&mut self);

    fn restore(&mut self);

    fn translate(&mut self, x: f64, y: f64);

    /// Rotate clockwise by `radians` (y axis pointing down).
    fn rotate(&mut self, radians: f64);

    fn scale(&mut self, x: f64, y: f64);

    /// Draw the source's current frame into the rectangle `(x, y, width, height)`
    /// of the current coordinate space. Does nothing if the source has no frame.
    fn draw_frame(&mut self, source: &dyn FrameSource, x: f64, y: f64, width: f64, height: f64);
}
