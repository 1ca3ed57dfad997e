//! Synthetic camera feed.
//!
//! Produces colour-bar frames for a [`SharedFrameSource`] so the render
//! pipeline can be driven without capture hardware.

use std::sync::Arc;

use image::{Rgba, RgbaImage};

use meet_media_core::{FrameSize, SharedFrameSource};

use crate::error::VirtualDeviceError;

/// Vertical bars, left to right.
pub const BARS: [Rgba<u8>; 8] = [
    Rgba([255, 255, 255, 255]),
    Rgba([255, 255, 0, 255]),
    Rgba([0, 255, 255, 255]),
    Rgba([0, 255, 0, 255]),
    Rgba([255, 0, 255, 255]),
    Rgba([255, 0, 0, 255]),
    Rgba([0, 0, 255, 255]),
    Rgba([0, 0, 0, 255]),
];

/// Colour of the sweep line that marks frame progress.
pub const SWEEP: Rgba<u8> = Rgba([128, 128, 128, 255]);

pub struct VirtualCamera {
    size: FrameSize,
    output: Arc<SharedFrameSource>,
    frames_pushed: u64,
    streaming: bool,
}

impl VirtualCamera {
    pub fn new(width: u32, height: u32, output: Arc<SharedFrameSource>) -> Result<Self, VirtualDeviceError> {
        if width == 0 || height == 0 {
            return Err(VirtualDeviceError::InvalidFrameSize { width, height });
        }
        Ok(Self {
            size: FrameSize::new(width, height),
            output,
            frames_pushed: 0,
            streaming: false,
        })
    }

    pub fn size(&self) -> FrameSize {
        self.size
    }

    /// Begin feeding the output. The first frame is pushed immediately.
    pub fn start(&mut self) {
        if self.streaming {
            return;
        }
        log::info!(
            "virtual camera streaming at {}x{}",
            self.size.width,
            self.size.height
        );
        self.streaming = true;
        self.push_next();
    }

    /// Stop feeding and clear the output so consumers see it as not ready.
    pub fn stop(&mut self) {
        if !self.streaming {
            return;
        }
        self.streaming = false;
        self.output.clear();
        log::info!("virtual camera stopped after {} frames", self.frames_pushed);
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn frames_pushed(&self) -> u64 {
        self.frames_pushed
    }

    /// Push the next frame. Returns `false` when not streaming.
    pub fn push_next(&mut self) -> bool {
        if !self.streaming {
            return false;
        }
        let frame = color_bars(self.size, Some(self.frames_pushed));
        self.output.push_frame(frame);
        self.frames_pushed += 1;
        true
    }
}

impl Drop for VirtualCamera {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Render colour bars. With `sweep`, the bottom row carries a grey marker
/// at column `sweep % width`.
pub fn color_bars(size: FrameSize, sweep: Option<u64>) -> RgbaImage {
    let width = size.width.max(1);
    let height = size.height.max(1);
    let mut frame = RgbaImage::from_fn(width, height, |x, _| {
        let bar = (x as usize * BARS.len()) / width as usize;
        BARS[bar.min(BARS.len() - 1)]
    });
    if let Some(n) = sweep {
        let x = (n % u64::from(width)) as u32;
        frame.put_pixel(x, height - 1, SWEEP);
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use meet_media_core::FrameSource;

    #[test]
    fn bars_span_the_width() {
        let frame = color_bars(FrameSize::new(16, 2), None);
        assert_eq!(*frame.get_pixel(0, 0), BARS[0]);
        assert_eq!(*frame.get_pixel(2, 0), BARS[1]);
        assert_eq!(*frame.get_pixel(15, 1), BARS[7]);
    }

    #[test]
    fn sweep_marker_advances() {
        let frame = color_bars(FrameSize::new(8, 4), Some(3));
        assert_eq!(*frame.get_pixel(3, 3), SWEEP);
        assert_eq!(*frame.get_pixel(3, 0), BARS[3]);
    }

    #[test]
    fn start_stop_drives_source_readiness() {
        let source = Arc::new(SharedFrameSource::new());
        let mut camera = VirtualCamera::new(8, 4, Arc::clone(&source)).unwrap();
        assert!(source.natural_size().is_none());
        assert!(!camera.push_next());

        camera.start();
        assert_eq!(source.natural_size(), Some(FrameSize::new(8, 4)));
        assert!(camera.push_next());
        assert_eq!(camera.frames_pushed(), 2);

        camera.stop();
        assert!(source.natural_size().is_none());
    }

    #[test]
    fn rejects_empty_size() {
        let source = Arc::new(SharedFrameSource::new());
        assert!(matches!(
            VirtualCamera::new(0, 4, source),
            Err(VirtualDeviceError::InvalidFrameSize { .. })
        ));
    }
}
