//! # Rendering Error Types

use thiserror::Error;

use tandem_core::RenderObjectId;

/// Failures reported by a [`RenderBackend`](crate::RenderBackend).
///
/// These never cross back to the simulation thread. The render thread logs
/// them and keeps the object as a resource-less placeholder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The mesh is empty, not a triangle list, or indexes out of range.
    #[error("invalid geometry for {0:?}")]
    InvalidGeometry(RenderObjectId),

    /// The backend cannot build this kind of geometry.
    #[error("unsupported geometry: {0}")]
    Unsupported(String),

    /// The device refused the allocation.
    #[error("device error: {0}")]
    Device(String),
}

/// Failures of the render thread itself.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The configuration cannot produce a working render thread.
    #[error("invalid render config: {0}")]
    InvalidConfig(&'static str),

    /// The OS refused to start the thread.
    #[error("failed to spawn render thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The render thread panicked (protocol violation or backend bug).
    #[error("render thread panicked")]
    Panicked,

    /// The render thread was already joined.
    #[error("render thread already joined")]
    AlreadyJoined,
}

/// Result type for render thread operations.
pub type RenderResult<T> = Result<T, RenderError>;
