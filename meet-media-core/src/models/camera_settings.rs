use std::fmt;

use serde::{Deserialize, Serialize};

/// Clockwise display rotation applied to the rendered camera frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RotationRepr", into = "RotationRepr")]
pub enum Rotation {
    #[default]
    None,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Rotation {
    /// Rotation from an integer degree value, normalised to 0-360.
    /// Values that are not a right-angle multiple map to `None`.
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 => Rotation::Rotate90,
            180 => Rotation::Rotate180,
            270 => Rotation::Rotate270,
            _ => Rotation::None,
        }
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Rotate90 => 90,
            Rotation::Rotate180 => 180,
            Rotation::Rotate270 => 270,
        }
    }

    pub fn radians(&self) -> f64 {
        (self.degrees() as f64).to_radians()
    }

    /// Whether the rotated frame's width and height trade places.
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, Rotation::Rotate90 | Rotation::Rotate270)
    }

    /// The next rotation step clockwise, wrapping back to `None`.
    pub fn next(&self) -> Self {
        Self::from_degrees(self.degrees() as i32 + 90)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RotationRepr {
    Off(bool),
    Degrees(u32),
}

impl TryFrom<RotationRepr> for Rotation {
    type Error = String;

    fn try_from(repr: RotationRepr) -> Result<Self, Self::Error> {
        match repr {
            RotationRepr::Off(false) | RotationRepr::Degrees(0) => Ok(Rotation::None),
            RotationRepr::Degrees(90) => Ok(Rotation::Rotate90),
            RotationRepr::Degrees(180) => Ok(Rotation::Rotate180),
            RotationRepr::Degrees(270) => Ok(Rotation::Rotate270),
            RotationRepr::Off(true) => Err("rotation must be false or a degree value".into()),
            RotationRepr::Degrees(other) => Err(format!("unsupported rotation: {}", other)),
        }
    }
}

impl From<Rotation> for RotationRepr {
    fn from(rotation: Rotation) -> Self {
        match rotation {
            Rotation::None => RotationRepr::Off(false),
            other => RotationRepr::Degrees(other.degrees()),
        }
    }
}

/// Output aspect ratio of the rendered camera frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AspectRatioRepr", into = "AspectRatioRepr")]
pub enum AspectRatio {
    /// Native source proportions.
    #[default]
    Native,
    /// 16:9, reached by growing the short side.
    Widescreen,
    /// 1:1, reached by shrinking both sides to the shorter one.
    Square,
}

impl AspectRatio {
    /// Target width/height proportion, if any.
    pub fn proportion(&self) -> Option<f64> {
        match self {
            AspectRatio::Native => None,
            AspectRatio::Widescreen => Some(16.0 / 9.0),
            AspectRatio::Square => Some(1.0),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AspectRatio::Native => "none",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Square => "1:1",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AspectRatioRepr {
    Off(bool),
    Named(String),
}

impl TryFrom<AspectRatioRepr> for AspectRatio {
    type Error = String;

    fn try_from(repr: AspectRatioRepr) -> Result<Self, Self::Error> {
        match repr {
            AspectRatioRepr::Off(false) => Ok(AspectRatio::Native),
            AspectRatioRepr::Off(true) => Err("ratio must be false or a ratio name".into()),
            AspectRatioRepr::Named(name) => match name.as_str() {
                "video" | "16:9" => Ok(AspectRatio::Widescreen),
                "square" | "1:1" => Ok(AspectRatio::Square),
                "none" => Ok(AspectRatio::Native),
                other => Err(format!("unsupported ratio: {}", other)),
            },
        }
    }
}

impl From<AspectRatio> for AspectRatioRepr {
    fn from(ratio: AspectRatio) -> Self {
        match ratio {
            AspectRatio::Native => AspectRatioRepr::Off(false),
            AspectRatio::Widescreen => AspectRatioRepr::Named("video".into()),
            AspectRatio::Square => AspectRatioRepr::Named("square".into()),
        }
    }
}

/// Display-only transform applied when rendering the local camera.
///
/// Has no effect on the captured stream itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Horizontal mirror.
    pub flip: bool,
    pub rotate: Rotation,
    pub ratio: AspectRatio,
}

impl CameraSettings {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}
