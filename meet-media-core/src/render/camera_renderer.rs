use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::camera_settings::CameraSettings;
use crate::render::render_loop::{start_rendering, RenderLoopHandle};
use crate::traits::draw_surface::DrawSurface;
use crate::traits::frame_scheduler::FrameScheduler;
use crate::traits::frame_source::FrameSource;

/// Local camera preview: one source, one surface, at most one live loop.
///
/// Any settings change cancels the running loop and starts a fresh one, so
/// a stale loop never keeps drawing with old parameters.
pub struct CameraRenderer<S: DrawSurface> {
    scheduler: Arc<dyn FrameScheduler>,
    source: Arc<dyn FrameSource>,
    surface: Arc<Mutex<S>>,
    settings: CameraSettings,
    active: Option<RenderLoopHandle>,
}

impl<S: DrawSurface> CameraRenderer<S> {
    pub fn new(
        scheduler: Arc<dyn FrameScheduler>,
        source: Arc<dyn FrameSource>,
        surface: Arc<Mutex<S>>,
    ) -> Self {
        Self {
            scheduler,
            source,
            surface,
            settings: CameraSettings::default(),
            active: None,
        }
    }

    pub fn settings(&self) -> CameraSettings {
        self.settings
    }

    pub fn surface(&self) -> &Arc<Mutex<S>> {
        &self.surface
    }

    pub fn is_running(&self) -> bool {
        self.active.as_ref().is_some_and(|h| h.is_running())
    }

    /// Handle of the live loop, if any.
    pub fn active_loop(&self) -> Option<&RenderLoopHandle> {
        self.active.as_ref()
    }

    /// Start (or restart) rendering with the current settings.
    pub fn start(&mut self) {
        self.stop();
        self.active = Some(start_rendering(
            Arc::clone(&self.scheduler),
            Arc::clone(&self.source),
            Arc::clone(&self.surface),
            self.settings,
        ));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.stop();
        }
    }

    /// Replace the settings. A running loop is restarted with them.
    pub fn apply_settings(&mut self, settings: CameraSettings) {
        if settings == self.settings && self.is_running() {
            return;
        }
        self.settings = settings;
        if self.active.is_some() {
            log::debug!("camera settings changed, restarting render loop");
            self.start();
        }
    }

    /// Back to identity settings, as after switching to another camera.
    pub fn reset_settings(&mut self) {
        self.apply_settings(CameraSettings::default());
    }
}

impl<S: DrawSurface> Drop for CameraRenderer<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::camera_settings::{AspectRatio, Rotation};
    use crate::render::geometry::FrameSize;
    use crate::render::raster::{RasterSurface, SharedFrameSource};
    use crate::render::scheduler::ManualFrameScheduler;
    use crate::traits::draw_surface::DrawSurface;

    fn renderer() -> (Arc<ManualFrameScheduler>, CameraRenderer<RasterSurface>) {
        let scheduler = Arc::new(ManualFrameScheduler::new());
        let source = Arc::new(SharedFrameSource::new());
        source.push_frame(image::RgbaImage::new(640, 480));
        let surface = Arc::new(Mutex::new(RasterSurface::default()));
        let renderer = CameraRenderer::new(scheduler.clone(), source, surface);
        (scheduler, renderer)
    }

    #[test]
    fn settings_change_replaces_the_loop() {
        let (scheduler, mut renderer) = renderer();
        renderer.start();
        scheduler.run_frame();

        renderer.apply_settings(CameraSettings {
            rotate: Rotation::Rotate270,
            ..Default::default()
        });
        assert_eq!(scheduler.pending_count(), 1);
        scheduler.run_frame();
        assert_eq!(renderer.surface().lock().size(), FrameSize::new(480, 640));
        assert_eq!(renderer.active_loop().map(|h| h.frames_rendered()), Some(1));
    }

    #[test]
    fn settings_while_stopped_apply_on_next_start() {
        let (scheduler, mut renderer) = renderer();
        renderer.apply_settings(CameraSettings {
            ratio: AspectRatio::Square,
            ..Default::default()
        });
        assert_eq!(scheduler.pending_count(), 0);

        renderer.start();
        scheduler.run_frame();
        assert_eq!(renderer.surface().lock().size(), FrameSize::new(480, 480));
    }

    #[test]
    fn reset_restores_identity() {
        let (scheduler, mut renderer) = renderer();
        renderer.apply_settings(CameraSettings {
            flip: true,
            rotate: Rotation::Rotate90,
            ratio: AspectRatio::Widescreen,
        });
        renderer.start();
        renderer.reset_settings();
        assert!(renderer.settings().is_identity());
        scheduler.run_frame();
        assert_eq!(renderer.surface().lock().size(), FrameSize::new(640, 480));
    }

    #[test]
    fn stop_and_drop_leave_nothing_scheduled() {
        let (scheduler, mut renderer) = renderer();
        renderer.start();
        renderer.stop();
        renderer.stop();
        assert_eq!(scheduler.pending_count(), 0);

        renderer.start();
        drop(renderer);
        assert_eq!(scheduler.pending_count(), 0);
    }
}
