use crate::models::camera_settings::CameraSettings;
use crate::render::geometry::{draw_dimensions, surface_dimensions, FrameSize};
use crate::traits::draw_surface::DrawSurface;
use crate::traits::frame_source::FrameSource;

/// 2D affine transform in canvas matrix order `[a b c d e f]`:
///
/// ```text
/// x' = a·x + c·y + e
/// y' = b·x + d·y + f
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine2D {
    pub const IDENTITY: Affine2D = Affine2D {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(&mut self, x: f64, y: f64) {
        self.e += self.a * x + self.c * y;
        self.f += self.b * x + self.d * y;
    }

    pub fn rotate(&mut self, radians: f64) {
        let (sin, cos) = radians.sin_cos();
        let (a, b, c, d) = (self.a, self.b, self.c, self.d);
        self.a = a * cos + c * sin;
        self.b = b * cos + d * sin;
        self.c = c * cos - a * sin;
        self.d = d * cos - b * sin;
    }

    pub fn scale(&mut self, x: f64, y: f64) {
        self.a *= x;
        self.b *= x;
        self.c *= y;
        self.d *= y;
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// The inverse transform, or `None` if the matrix is singular.
    pub fn invert(&self) -> Option<Affine2D> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < f64::EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        Some(Affine2D {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }
}

impl Default for Affine2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Render one transformed frame of `source` onto `surface`.
///
/// Returns `false` without touching the surface when the source has no
/// natural size yet.
pub fn render_frame<S: DrawSurface + ?Sized>(
    source: &dyn FrameSource,
    surface: &mut S,
    settings: &CameraSettings,
) -> bool {
    let natural = match source.natural_size() {
        Some(size) if !size.is_empty() => size,
        _ => return false,
    };

    let draw = draw_dimensions(natural, settings.ratio);
    let target = surface_dimensions(draw, settings.rotate);
    surface.set_size(target);
    surface.clear();

    surface.save();
    surface.translate(target.width as f64 / 2.0, target.height as f64 / 2.0);
    if settings.rotate.degrees() != 0 {
        surface.rotate(settings.rotate.radians());
    }
    if settings.flip {
        surface.scale(-1.0, 1.0);
    }
    draw_native_centered(source, surface, natural);
    surface.restore();
    true
}

fn draw_native_centered<S: DrawSurface + ?Sized>(source: &dyn FrameSource, surface: &mut S, natural: FrameSize) {
    let width = natural.width as f64;
    let height = natural.height as f64;
    surface.draw_frame(source, -width / 2.0, -height / 2.0, width, height);
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn quarter_turn_is_clockwise() {
        let mut m = Affine2D::IDENTITY;
        m.rotate(FRAC_PI_2);
        let (x, y) = m.apply(1.0, 0.0);
        assert_relative_eq!(x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn operations_compose_in_call_order() {
        let mut m = Affine2D::IDENTITY;
        m.translate(10.0, 5.0);
        m.scale(-1.0, 1.0);
        let (x, y) = m.apply(2.0, 3.0);
        assert_relative_eq!(x, 8.0);
        assert_relative_eq!(y, 8.0);
    }

    #[test]
    fn inverse_round_trips_points() {
        let mut m = Affine2D::IDENTITY;
        m.translate(320.0, 240.0);
        m.rotate(3.0 * FRAC_PI_2);
        m.scale(-1.0, 1.0);
        let inv = m.invert().unwrap();
        let (x, y) = m.apply(-12.5, 40.0);
        let (bx, by) = inv.apply(x, y);
        assert_relative_eq!(bx, -12.5, epsilon = 1e-9);
        assert_relative_eq!(by, 40.0, epsilon = 1e-9);
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let mut m = Affine2D::IDENTITY;
        m.scale(0.0, 1.0);
        assert!(m.invert().is_none());
    }
}
