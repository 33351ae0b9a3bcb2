//! # TANDEM Rendering
//!
//! The render half of the simulation/render split.
//!
//! ## Architecture
//!
//! ```text
//!  wait_batch ──> apply commands in order ──> last EndFrame? ──> draw ──> retire
//!      ^               │                           │
//!      │               v                           v
//!      │       RenderObjectTable            FrameSlotStore::read
//!      │               │
//!      │               v
//!      │      RenderBackend (build / update / draw / release)
//!      └───────────────────────────────────────── until shutdown
//! ```
//!
//! The simulation talks to all of this through [`RenderThread`], which it
//! owns. The backend is moved into the thread at spawn time.

#![deny(unsafe_code)]

pub mod backend;
pub mod config;
pub mod error;
pub mod recording;
pub mod render_object;
pub mod render_thread;
pub mod stats;

pub use backend::RenderBackend;
pub use config::RenderConfig;
pub use error::{BackendError, RenderError, RenderResult};
pub use recording::{BackendEvent, DrawnFrame, EventLog, FrameGate, GateOpener, RecordedResource, RecordingBackend};
pub use render_object::{RenderObject, RenderObjectTable};
pub use render_thread::RenderThread;
pub use stats::RenderStats;
