use serde::{Deserialize, Serialize};

use crate::models::camera_settings::{AspectRatio, Rotation};

/// Integer pixel dimensions of a frame or surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A source reporting zero in either dimension has not produced a frame yet.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Fractional viewport dimensions before they are applied to a surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawSize {
    pub width: f64,
    pub height: f64,
}

/// Viewport size for a source of `natural` size under `ratio`.
///
/// 16:9 grows the shorter side until the proportion is reached; 1:1 shrinks
/// both sides to the shorter one. Native leaves the size untouched.
pub fn draw_dimensions(natural: FrameSize, ratio: AspectRatio) -> DrawSize {
    let mut width = natural.width as f64;
    let mut height = natural.height as f64;

    match ratio {
        AspectRatio::Native => {}
        AspectRatio::Widescreen => {
            let target = 16.0 / 9.0;
            if width / height > target {
                height = width / target;
            } else {
                width = height * target;
            }
        }
        AspectRatio::Square => {
            let side = width.min(height);
            width = side;
            height = side;
        }
    }

    DrawSize { width, height }
}

/// Pixel size the surface must take to hold a `draw` viewport rotated by `rotation`.
///
/// Fractional sizes truncate, as a canvas does when assigned a non-integer width.
pub fn surface_dimensions(draw: DrawSize, rotation: Rotation) -> FrameSize {
    let width = draw.width as u32;
    let height = draw.height as u32;
    if rotation.swaps_dimensions() {
        FrameSize::new(height, width)
    } else {
        FrameSize::new(width, height)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const VGA: FrameSize = FrameSize {
        width: 640,
        height: 480,
    };

    #[test]
    fn native_keeps_dimensions() {
        let d = draw_dimensions(VGA, AspectRatio::Native);
        assert_eq!(d, DrawSize { width: 640.0, height: 480.0 });
    }

    #[test]
    fn square_uses_shorter_side() {
        let d = draw_dimensions(VGA, AspectRatio::Square);
        assert_eq!(d, DrawSize { width: 480.0, height: 480.0 });
    }

    #[test]
    fn widescreen_grows_width_of_four_by_three() {
        let d = draw_dimensions(VGA, AspectRatio::Widescreen);
        assert_relative_eq!(d.width, 480.0 * 16.0 / 9.0);
        assert_relative_eq!(d.width, 853.333, epsilon = 1e-3);
        assert_relative_eq!(d.height, 480.0);
    }

    #[test]
    fn widescreen_grows_height_of_ultrawide() {
        let d = draw_dimensions(FrameSize::new(2560, 1080), AspectRatio::Widescreen);
        assert_relative_eq!(d.width, 2560.0);
        assert_relative_eq!(d.height, 1440.0);
    }

    #[test]
    fn quarter_turns_swap_surface() {
        let d = draw_dimensions(VGA, AspectRatio::Native);
        assert_eq!(surface_dimensions(d, Rotation::Rotate90), FrameSize::new(480, 640));
        assert_eq!(surface_dimensions(d, Rotation::Rotate270), FrameSize::new(480, 640));
        assert_eq!(surface_dimensions(d, Rotation::None), FrameSize::new(640, 480));
        assert_eq!(surface_dimensions(d, Rotation::Rotate180), FrameSize::new(640, 480));
    }

    #[test]
    fn fractional_width_truncates() {
        let d = draw_dimensions(VGA, AspectRatio::Widescreen);
        assert_eq!(surface_dimensions(d, Rotation::None), FrameSize::new(853, 480));
    }
}
