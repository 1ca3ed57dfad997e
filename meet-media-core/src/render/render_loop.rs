use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::camera_settings::CameraSettings;
use crate::render::transform::render_frame;
use crate::traits::draw_surface::DrawSurface;
use crate::traits::frame_scheduler::{FrameRequestId, FrameScheduler};
use crate::traits::frame_source::FrameSource;

/// Book-keeping shared between a loop's ticks and its handle.
#[derive(Debug, Default)]
struct LoopState {
    pending: Option<FrameRequestId>,
    stopped: bool,
    frames_rendered: u64,
    frames_skipped: u64,
}

/// Everything a tick needs. Settings are fixed for the lifetime of a loop.
struct TickContext<S: DrawSurface> {
    scheduler: Arc<dyn FrameScheduler>,
    source: Arc<dyn FrameSource>,
    surface: Arc<Mutex<S>>,
    settings: CameraSettings,
    state: Arc<Mutex<LoopState>>,
}

/// Handle to a running render loop. Dropping the handle stops the loop.
pub struct RenderLoopHandle {
    scheduler: Arc<dyn FrameScheduler>,
    settings: CameraSettings,
    state: Arc<Mutex<LoopState>>,
}

impl RenderLoopHandle {
    /// Cancel the scheduled continuation. Calling this on a stopped loop is a no-op.
    pub fn stop(&self) {
        let pending = {
            let mut state = self.state.lock();
            if state.stopped {
                return;
            }
            state.stopped = true;
            state.pending.take()
        };
        if let Some(id) = pending {
            self.scheduler.cancel_frame(id);
        }
        log::debug!("render loop stopped");
    }

    pub fn is_running(&self) -> bool {
        !self.state.lock().stopped
    }

    pub fn settings(&self) -> CameraSettings {
        self.settings
    }

    /// Ticks that drew a frame.
    pub fn frames_rendered(&self) -> u64 {
        self.state.lock().frames_rendered
    }

    /// Ticks skipped because the source had no frame yet.
    pub fn frames_skipped(&self) -> u64 {
        self.state.lock().frames_skipped
    }
}

impl Drop for RenderLoopHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start compositing `source` onto `surface` once per scheduled frame.
///
/// The first tick runs on the next frame. Each tick recomputes the surface
/// size, so source dimension changes are picked up without a restart; a
/// settings change requires a new loop.
pub fn start_rendering<S: DrawSurface>(
    scheduler: Arc<dyn FrameScheduler>,
    source: Arc<dyn FrameSource>,
    surface: Arc<Mutex<S>>,
    settings: CameraSettings,
) -> RenderLoopHandle {
    let state = Arc::new(Mutex::new(LoopState::default()));
    let ctx = Arc::new(TickContext {
        scheduler: Arc::clone(&scheduler),
        source,
        surface,
        settings,
        state: Arc::clone(&state),
    });
    log::debug!(
        "render loop started (flip={}, rotate={}, ratio={})",
        settings.flip,
        settings.rotate,
        settings.ratio
    );
    schedule_tick(ctx);

    RenderLoopHandle {
        scheduler,
        settings,
        state,
    }
}

/// Stop a loop started by [`start_rendering`]. Safe on an already-stopped handle.
pub fn stop_rendering(handle: &RenderLoopHandle) {
    handle.stop();
}

fn schedule_tick<S: DrawSurface>(ctx: Arc<TickContext<S>>) {
    let next = Arc::clone(&ctx);
    let mut state = ctx.state.lock();
    if state.stopped {
        return;
    }
    let id = ctx.scheduler.request_frame(Box::new(move || run_tick(next)));
    state.pending = Some(id);
}

fn run_tick<S: DrawSurface>(ctx: Arc<TickContext<S>>) {
    {
        let mut state = ctx.state.lock();
        if state.stopped {
            return;
        }
        state.pending = None;
    }

    let drawn = {
        let mut surface = ctx.surface.lock();
        render_frame(ctx.source.as_ref(), &mut *surface, &ctx.settings)
    };

    {
        let mut state = ctx.state.lock();
        if drawn {
            state.frames_rendered += 1;
        } else {
            state.frames_skipped += 1;
        }
    }

    schedule_tick(ctx);
}
