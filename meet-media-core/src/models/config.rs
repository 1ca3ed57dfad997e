/// Configuration for a device manager and its renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaConfiguration {
    /// Preferred capture width when no camera is selected (default: 1920).
    pub ideal_width: u32,

    /// Preferred capture height when no camera is selected (default: 1080).
    pub ideal_height: u32,

    /// Request echo cancellation when no microphone is selected (default: true).
    pub echo_cancellation: bool,

    /// Request noise suppression when no microphone is selected (default: true).
    pub noise_suppression: bool,

    /// Display refresh rate driving interval-based frame scheduling (default: 60).
    pub refresh_rate_hz: f64,
}

impl MediaConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.ideal_width == 0 || self.ideal_height == 0 {
            return Err(format!(
                "ideal resolution must be non-zero: {}x{}",
                self.ideal_width, self.ideal_height
            ));
        }
        if !(self.refresh_rate_hz > 0.0 && self.refresh_rate_hz <= 480.0) {
            return Err(format!("unsupported refresh rate: {}", self.refresh_rate_hz));
        }
        Ok(())
    }
}

impl Default for MediaConfiguration {
    fn default() -> Self {
        Self {
            ideal_width: 1920,
            ideal_height: 1080,
            echo_cancellation: true,
            noise_suppression: true,
            refresh_rate_hz: 60.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(MediaConfiguration::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_resolution_and_bad_refresh() {
        let config = MediaConfiguration {
            ideal_width: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MediaConfiguration {
            refresh_rate_hz: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MediaConfiguration {
            refresh_rate_hz: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
