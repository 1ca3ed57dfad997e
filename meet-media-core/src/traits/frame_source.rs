use std::sync::Arc;

use image::RgbaImage;

use crate::render::geometry::FrameSize;

/// A live video frame provider, e.g. a decoder attached to a capture stream.
pub trait FrameSource: Send + Sync {
    /// Natural dimensions of the current frame.
    ///
    /// `None` (or an empty size) until the first frame has been decoded.
    fn natural_size(&self) -> Option<FrameSize>;

    /// The most recent frame, if any.
    fn current_frame(&self) -> Option<Arc<RgbaImage>>;
}
