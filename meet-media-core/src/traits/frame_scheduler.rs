/// Callback run on a scheduled paint opportunity.
pub type FrameCallback = Box<dyn FnOnce() + Send + 'static>;

/// Identifier of a pending frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequestId(pub u64);

/// Paint-cadence scheduler: one callback per display refresh.
///
/// Implementations run callbacks one at a time and never from inside
/// `request_frame` or `cancel_frame`.
///
/// Implemented by:
/// - `ManualFrameScheduler` (host-pumped)
/// - `IntervalFrameScheduler` (dedicated thread at a fixed refresh rate)
pub trait FrameScheduler: Send + Sync + 'static {
    /// Run `callback` once on the next frame.
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId;

    /// Drop a pending request. Unknown or already-run ids are ignored.
    fn cancel_frame(&self, id: FrameRequestId);
}
