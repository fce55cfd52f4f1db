/// Observer for the progress of a crawl.
///
/// The pipeline reports through this trait instead of shared global state, so the binary can
/// draw a progress bar while tests pass a no-op implementation.
pub trait Progress: Send + Sync {
    /// Set the phase label for the current operation (e.g., "Searching", "Enriching").
    fn set_phase(&self, phase: &str);

    /// Configure determinate progress reporting.
    ///
    /// The callback returns (total, current, message).
    fn set_determinate(&self, callback: Box<dyn Fn() -> (u64, u64, String) + Send + Sync + 'static>);

    /// Configure indeterminate progress reporting with a message-only callback.
    fn set_indeterminate(&self, callback: Box<dyn Fn() -> String + Send + Sync + 'static>);

    /// Finish and clear the progress indicator.
    fn done(&self);
}
