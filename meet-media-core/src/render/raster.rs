use std::sync::Arc;

use image::{Rgba, RgbaImage};
use parking_lot::RwLock;

use crate::render::geometry::FrameSize;
use crate::render::transform::Affine2D;
use crate::traits::draw_surface::DrawSurface;
use crate::traits::frame_source::FrameSource;

/// Software drawing surface backed by an RGBA image.
///
/// Blits are inverse-mapped with nearest-neighbour sampling, so right-angle
/// rotations and mirrors are pixel exact.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixels: RgbaImage,
    transform: Affine2D,
    saved: Vec<Affine2D>,
}

impl RasterSurface {
    pub fn new(size: FrameSize) -> Self {
        Self {
            pixels: RgbaImage::new(size.width, size.height),
            transform: Affine2D::IDENTITY,
            saved: Vec::new(),
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x < self.pixels.width() && y < self.pixels.height() {
            Some(*self.pixels.get_pixel(x, y))
        } else {
            None
        }
    }

    pub fn transform(&self) -> Affine2D {
        self.transform
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> RgbaImage {
        self.pixels.clone()
    }
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new(FrameSize::default())
    }
}

impl DrawSurface for RasterSurface {
    fn size(&self) -> FrameSize {
        FrameSize::new(self.pixels.width(), self.pixels.height())
    }

    fn set_size(&mut self, size: FrameSize) {
        self.pixels = RgbaImage::new(size.width, size.height);
        self.transform = Affine2D::IDENTITY;
        self.saved.clear();
    }

    fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    fn save(&mut self) {
        self.saved.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(previous) = self.saved.pop() {
            self.transform = previous;
        }
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.transform.translate(x, y);
    }

    fn rotate(&mut self, radians: f64) {
        self.transform.rotate(radians);
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.transform.scale(x, y);
    }

    fn draw_frame(&mut self, source: &dyn FrameSource, x: f64, y: f64, width: f64, height: f64) {
        let Some(frame) = source.current_frame() else {
            return;
        };
        if frame.width() == 0 || frame.height() == 0 || width <= 0.0 || height <= 0.0 {
            return;
        }
        let Some(inverse) = self.transform.invert() else {
            return;
        };

        // Destination bounding box of the transformed rectangle.
        let corners = [
            self.transform.apply(x, y),
            self.transform.apply(x + width, y),
            self.transform.apply(x, y + height),
            self.transform.apply(x + width, y + height),
        ];
        let min_x = corners.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        let min_y = corners.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max_y = corners.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

        let surface_w = self.pixels.width() as f64;
        let surface_h = self.pixels.height() as f64;
        let x0 = min_x.floor().clamp(0.0, surface_w) as u32;
        let x1 = max_x.ceil().clamp(0.0, surface_w) as u32;
        let y0 = min_y.floor().clamp(0.0, surface_h) as u32;
        let y1 = max_y.ceil().clamp(0.0, surface_h) as u32;

        let frame_w = frame.width();
        let frame_h = frame.height();

        for dy in y0..y1 {
            for dx in x0..x1 {
                let (u, v) = inverse.apply(dx as f64 + 0.5, dy as f64 + 0.5);
                let fx = (u - x) / width;
                let fy = (v - y) / height;
                if !(0.0..1.0).contains(&fx) || !(0.0..1.0).contains(&fy) {
                    continue;
                }
                let sx = ((fx * frame_w as f64) as u32).min(frame_w - 1);
                let sy = ((fy * frame_h as f64) as u32).min(frame_h - 1);
                self.pixels.put_pixel(dx, dy, *frame.get_pixel(sx, sy));
            }
        }
    }
}

/// Latest-frame slot fed by a decoder and read by the render loop.
///
/// Plays the role of the hidden playback element the pipeline samples.
#[derive(Debug, Default)]
pub struct SharedFrameSource {
    frame: RwLock<Option<Arc<RgbaImage>>>,
}

impl SharedFrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_frame(&self, frame: RgbaImage) {
        *self.frame.write() = Some(Arc::new(frame));
    }

    /// Forget the current frame, e.g. when the stream is detached.
    pub fn clear(&self) {
        *self.frame.write() = None;
    }
}

impl FrameSource for SharedFrameSource {
    fn natural_size(&self) -> Option<FrameSize> {
        self.frame
            .read()
            .as_ref()
            .map(|f| FrameSize::new(f.width(), f.height()))
    }

    fn current_frame(&self) -> Option<Arc<RgbaImage>> {
        self.frame.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::camera_settings::{AspectRatio, CameraSettings, Rotation};
    use crate::render::transform::render_frame;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    /// 2x1 frame: red on the left, blue on the right.
    fn red_blue_source() -> SharedFrameSource {
        let mut frame = RgbaImage::new(2, 1);
        frame.put_pixel(0, 0, RED);
        frame.put_pixel(1, 0, BLUE);
        let source = SharedFrameSource::new();
        source.push_frame(frame);
        source
    }

    #[test]
    fn identity_copies_frame() {
        let source = red_blue_source();
        let mut surface = RasterSurface::default();
        assert!(render_frame(&source, &mut surface, &CameraSettings::default()));
        assert_eq!(surface.size(), FrameSize::new(2, 1));
        assert_eq!(surface.pixel(0, 0), Some(RED));
        assert_eq!(surface.pixel(1, 0), Some(BLUE));
    }

    #[test]
    fn flip_mirrors_horizontally() {
        let source = red_blue_source();
        let mut surface = RasterSurface::default();
        let settings = CameraSettings {
            flip: true,
            ..Default::default()
        };
        render_frame(&source, &mut surface, &settings);
        assert_eq!(surface.pixel(0, 0), Some(BLUE));
        assert_eq!(surface.pixel(1, 0), Some(RED));
    }

    #[test]
    fn quarter_turn_moves_left_column_to_top() {
        let source = red_blue_source();
        let mut surface = RasterSurface::default();
        let settings = CameraSettings {
            rotate: Rotation::Rotate90,
            ..Default::default()
        };
        render_frame(&source, &mut surface, &settings);
        assert_eq!(surface.size(), FrameSize::new(1, 2));
        assert_eq!(surface.pixel(0, 0), Some(RED));
        assert_eq!(surface.pixel(0, 1), Some(BLUE));
    }

    #[test]
    fn three_quarter_turn_moves_left_column_to_bottom() {
        let source = red_blue_source();
        let mut surface = RasterSurface::default();
        let settings = CameraSettings {
            rotate: Rotation::Rotate270,
            ..Default::default()
        };
        render_frame(&source, &mut surface, &settings);
        assert_eq!(surface.pixel(0, 0), Some(BLUE));
        assert_eq!(surface.pixel(0, 1), Some(RED));
    }

    #[test]
    fn half_turn_with_flip_is_vertical_mirror() {
        let mut frame = RgbaImage::new(1, 2);
        frame.put_pixel(0, 0, RED);
        frame.put_pixel(0, 1, BLUE);
        let source = SharedFrameSource::new();
        source.push_frame(frame);

        let mut surface = RasterSurface::default();
        let settings = CameraSettings {
            flip: true,
            rotate: Rotation::Rotate180,
            ratio: AspectRatio::Native,
        };
        render_frame(&source, &mut surface, &settings);
        assert_eq!(surface.pixel(0, 0), Some(BLUE));
        assert_eq!(surface.pixel(0, 1), Some(RED));
    }

    #[test]
    fn square_ratio_crops_by_viewport() {
        let mut frame = RgbaImage::new(4, 2);
        for x in 0..4 {
            let color = if x < 2 { RED } else { BLUE };
            frame.put_pixel(x, 0, color);
            frame.put_pixel(x, 1, color);
        }
        let source = SharedFrameSource::new();
        source.push_frame(frame);

        let mut surface = RasterSurface::default();
        let settings = CameraSettings {
            ratio: AspectRatio::Square,
            ..Default::default()
        };
        render_frame(&source, &mut surface, &settings);
        // 2x2 viewport centered on a 4x2 frame keeps the middle two columns.
        assert_eq!(surface.size(), FrameSize::new(2, 2));
        assert_eq!(surface.pixel(0, 0), Some(RED));
        assert_eq!(surface.pixel(1, 0), Some(BLUE));
    }

    #[test]
    fn unready_source_is_skipped() {
        let source = SharedFrameSource::new();
        let mut surface = RasterSurface::new(FrameSize::new(3, 3));
        assert!(!render_frame(&source, &mut surface, &CameraSettings::default()));
        assert_eq!(surface.size(), FrameSize::new(3, 3));
    }

    #[test]
    fn restore_without_save_is_harmless() {
        let mut surface = RasterSurface::new(FrameSize::new(1, 1));
        surface.translate(5.0, 5.0);
        surface.restore();
        assert_eq!(surface.transform().e, 5.0);
    }
}
