use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::config::MediaConfiguration;
use crate::traits::frame_scheduler::{FrameCallback, FrameRequestId, FrameScheduler};

/// Pending frame requests, shared by the scheduler implementations.
#[derive(Default)]
struct FrameQueue {
    next_id: u64,
    pending: Vec<(FrameRequestId, FrameCallback)>,
}

impl FrameQueue {
    fn push(&mut self, callback: FrameCallback) -> FrameRequestId {
        self.next_id += 1;
        let id = FrameRequestId(self.next_id);
        self.pending.push((id, callback));
        id
    }

    fn cancel(&mut self, id: FrameRequestId) {
        self.pending.retain(|(pending, _)| *pending != id);
    }

    fn take(&mut self) -> Vec<(FrameRequestId, FrameCallback)> {
        mem::take(&mut self.pending)
    }
}

/// Run one frame's worth of callbacks. The queue lock is not held while they run,
/// so requests made from inside a callback land on the following frame.
fn run_frame(queue: &Mutex<FrameQueue>) -> usize {
    let batch = queue.lock().take();
    let count = batch.len();
    for (_, callback) in batch {
        callback();
    }
    count
}

/// Frame scheduler pumped by the host, once per display refresh.
#[derive(Default)]
pub struct ManualFrameScheduler {
    queue: Mutex<FrameQueue>,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every callback requested before this call. Returns how many ran.
    pub fn run_frame(&self) -> usize {
        run_frame(&self.queue)
    }

    pub fn pending_count(&self) -> usize {
        self.queue.lock().pending.len()
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId {
        self.queue.lock().push(callback)
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        self.queue.lock().cancel(id);
    }
}

/// Frame scheduler driven by a dedicated thread at a fixed refresh rate.
///
/// The thread stops when the scheduler is dropped; pending callbacks are discarded.
pub struct IntervalFrameScheduler {
    queue: Arc<Mutex<FrameQueue>>,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
    interval: Duration,
}

impl IntervalFrameScheduler {
    pub fn new(refresh_rate_hz: f64) -> std::io::Result<Self> {
        if !(refresh_rate_hz > 0.0) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("refresh rate must be positive: {}", refresh_rate_hz),
            ));
        }
        let interval = Duration::from_secs_f64(1.0 / refresh_rate_hz);
        let queue = Arc::new(Mutex::new(FrameQueue::default()));
        let running = Arc::new(AtomicBool::new(true));

        let thread_queue = Arc::clone(&queue);
        let thread_running = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("frame-clock".into())
            .spawn(move || {
                let mut next = Instant::now() + interval;
                while thread_running.load(Ordering::SeqCst) {
                    let now = Instant::now();
                    if next > now {
                        thread::sleep(next - now);
                    }
                    next += interval;
                    // Skip missed frames rather than bursting to catch up.
                    let now = Instant::now();
                    if next < now {
                        next = now + interval;
                    }
                    if !thread_running.load(Ordering::SeqCst) {
                        break;
                    }
                    run_frame(&thread_queue);
                }
            })?;

        log::debug!("frame clock started at {:.1} Hz", refresh_rate_hz);

        Ok(Self {
            queue,
            running,
            handle: Some(handle),
            interval,
        })
    }

    /// Clock at the configured display refresh rate.
    pub fn from_configuration(config: &MediaConfiguration) -> std::io::Result<Self> {
        Self::new(config.refresh_rate_hz)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn pending_count(&self) -> usize {
        self.queue.lock().pending.len()
    }
}

impl FrameScheduler for IntervalFrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId {
        self.queue.lock().push(callback)
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        self.queue.lock().cancel(id);
    }
}

impl Drop for IntervalFrameScheduler {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
        let discarded = self.queue.lock().take();
        drop(discarded);
        log::debug!("frame clock stopped");
    }
}
