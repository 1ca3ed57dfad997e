use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use meet_media_core::{
    AspectRatio, CameraRenderer, CameraSettings, DrawSurface, FrameSize, IntervalFrameScheduler,
    ManualFrameScheduler, RasterSurface, Rotation, SharedFrameSource,
};
use meet_media_virtual::camera::BARS;
use meet_media_virtual::VirtualCamera;

struct Preview {
    scheduler: Arc<ManualFrameScheduler>,
    surface: Arc<Mutex<RasterSurface>>,
    camera: VirtualCamera,
    renderer: CameraRenderer<RasterSurface>,
}

fn preview(width: u32, height: u32) -> Preview {
    let _ = env_logger::builder().is_test(true).try_init();
    let scheduler = Arc::new(ManualFrameScheduler::new());
    let source = Arc::new(SharedFrameSource::new());
    let surface = Arc::new(Mutex::new(RasterSurface::default()));
    let camera = VirtualCamera::new(width, height, Arc::clone(&source)).unwrap();
    let renderer = CameraRenderer::new(scheduler.clone(), source, Arc::clone(&surface));
    Preview {
        scheduler,
        surface,
        camera,
        renderer,
    }
}

#[test]
fn waits_for_first_frame_then_draws() {
    let mut p = preview(8, 2);
    p.renderer.start();

    p.scheduler.run_frame();
    let handle = p.renderer.active_loop().unwrap();
    assert_eq!(handle.frames_skipped(), 1);
    assert_eq!(handle.frames_rendered(), 0);

    p.camera.start();
    p.scheduler.run_frame();
    assert_eq!(p.renderer.active_loop().unwrap().frames_rendered(), 1);

    let surface = p.surface.lock();
    assert_eq!(surface.size(), FrameSize::new(8, 2));
    assert_eq!(surface.pixel(0, 0), Some(BARS[0]));
    assert_eq!(surface.pixel(7, 0), Some(BARS[7]));
}

#[test]
fn settings_changes_take_effect_on_next_frame() {
    let mut p = preview(8, 2);
    p.camera.start();
    p.renderer.start();
    p.scheduler.run_frame();

    p.renderer.apply_settings(CameraSettings {
        flip: true,
        ..Default::default()
    });
    assert_eq!(p.scheduler.pending_count(), 1);
    p.camera.push_next();
    p.scheduler.run_frame();
    assert_eq!(p.surface.lock().pixel(0, 0), Some(BARS[7]));

    p.renderer.apply_settings(CameraSettings {
        rotate: Rotation::Rotate90,
        ..Default::default()
    });
    p.scheduler.run_frame();
    {
        let surface = p.surface.lock();
        assert_eq!(surface.size(), FrameSize::new(2, 8));
        assert_eq!(surface.pixel(1, 0), Some(BARS[0]));
        assert_eq!(surface.pixel(1, 7), Some(BARS[7]));
    }

    p.renderer.reset_settings();
    p.scheduler.run_frame();
    assert_eq!(p.surface.lock().size(), FrameSize::new(8, 2));
}

#[test]
fn square_ratio_keeps_center_bars() {
    let mut p = preview(8, 2);
    p.camera.start();
    p.renderer.apply_settings(CameraSettings {
        ratio: AspectRatio::Square,
        ..Default::default()
    });
    p.renderer.start();
    p.scheduler.run_frame();

    let surface = p.surface.lock();
    assert_eq!(surface.size(), FrameSize::new(2, 2));
    assert_eq!(surface.pixel(0, 0), Some(BARS[3]));
    assert_eq!(surface.pixel(1, 0), Some(BARS[4]));
}

#[test]
fn stopping_cancels_pending_frame() {
    let mut p = preview(4, 4);
    p.camera.start();
    p.renderer.start();
    assert_eq!(p.scheduler.pending_count(), 1);

    p.renderer.stop();
    assert!(!p.renderer.is_running());
    assert_eq!(p.scheduler.pending_count(), 0);
    assert_eq!(p.scheduler.run_frame(), 0);
}

#[test]
fn camera_stop_pauses_drawing_without_ending_loop() {
    let mut p = preview(4, 4);
    p.camera.start();
    p.renderer.start();
    p.scheduler.run_frame();

    p.camera.stop();
    p.scheduler.run_frame();
    let handle = p.renderer.active_loop().unwrap();
    assert!(handle.is_running());
    assert_eq!(handle.frames_rendered(), 1);
    assert_eq!(handle.frames_skipped(), 1);
}

#[test]
fn interval_scheduler_drives_loop() {
    let _ = env_logger::builder().is_test(true).try_init();
    let scheduler = Arc::new(IntervalFrameScheduler::new(240.0).unwrap());
    let source = Arc::new(SharedFrameSource::new());
    let surface = Arc::new(Mutex::new(RasterSurface::default()));
    let mut camera = VirtualCamera::new(4, 2, Arc::clone(&source)).unwrap();
    camera.start();

    let mut renderer = CameraRenderer::new(scheduler, source, Arc::clone(&surface));
    renderer.start();

    let deadline = Instant::now() + Duration::from_secs(5);
    while renderer.active_loop().map_or(0, |h| h.frames_rendered()) < 3 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(renderer.active_loop().unwrap().frames_rendered() >= 3);
    renderer.stop();
    assert_eq!(surface.lock().size(), FrameSize::new(4, 2));
}
