/// Receives progress updates while artifacts are evaluated.
///
/// The pipeline reports a phase per artifact: `Resolving` with the artifact's name, then
/// `Evaluating` with a counter of finished metrics. Callbacks are polled by the
/// implementation whenever it redraws.
pub trait Progress: Send + Sync {
    fn set_phase(&self, phase: &str);

    /// Follow a counter; the callback returns (total, completed, label).
    fn set_determinate(&self, callback: Box<dyn Fn() -> (u64, u64, String) + Send + Sync + 'static>);

    /// Follow a label without a known end.
    fn set_indeterminate(&self, callback: Box<dyn Fn() -> String + Send + Sync + 'static>);

    /// Remove any indicator; no further updates follow.
    fn done(&self);
}

/// Progress sink that shows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl Progress for NullProgress {
    fn set_phase(&self, _phase: &str) {}

    fn set_determinate(&self, _callback: Box<dyn Fn() -> (u64, u64, String) + Send + Sync + 'static>) {}

    fn set_indeterminate(&self, _callback: Box<dyn Fn() -> String + Send + Sync + 'static>) {}

    fn done(&self) {}
}
