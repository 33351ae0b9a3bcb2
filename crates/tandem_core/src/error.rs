//! # Core Error Types
//!
//! Only recoverable conditions live here. Protocol violations (stale handles,
//! writes to a slot that is not writable) are bugs and panic instead.

use thiserror::Error;

/// Why a command was not enqueued.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// Shutdown was requested; no further frames will be drawn.
    #[error("render queue is shutting down, command dropped")]
    ShuttingDown,

    /// The render thread is gone (it finished or panicked).
    #[error("render thread disconnected, command dropped")]
    Disconnected,
}

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;
