use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use meet_media_core::{AudioSink, PlatformError};

/// Simulated playback element.
#[derive(Debug, Default)]
pub struct VirtualAudioSink {
    selectable: bool,
    output: Mutex<String>,
    fail_next: AtomicBool,
}

impl VirtualAudioSink {
    /// A sink that can be routed to a chosen speaker.
    pub fn new() -> Self {
        Self {
            selectable: true,
            ..Self::default()
        }
    }

    /// A sink on a platform without output routing.
    pub fn without_output_selection() -> Self {
        Self::default()
    }

    /// Reject the next routing request.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl AudioSink for VirtualAudioSink {
    fn supports_output_selection(&self) -> bool {
        self.selectable
    }

    fn set_output_device(&self, device_id: &str) -> Result<(), PlatformError> {
        if !self.selectable {
            return Err(PlatformError::not_supported("output routing is not available"));
        }
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(PlatformError::new(
                PlatformError::ABORT,
                format!("could not route audio to '{}'", device_id),
            ));
        }
        *self.output.lock() = device_id.to_string();
        Ok(())
    }

    fn output_device(&self) -> String {
        self.output.lock().clone()
    }
}
