//! Scheduler-facing error types (§4.5 Backpressure).

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("pending queue is full")]
    QueueFull,
    #[error("job failed validation")]
    Invalid,
}
