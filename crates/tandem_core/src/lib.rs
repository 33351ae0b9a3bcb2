//! # TANDEM Core
//!
//! The synchronization contract between one simulation thread and one render
//! thread.
//!
//! ```text
//! Simulation thread                               Render thread
//! ─────────────────                               ─────────────
//! HandleAllocator::allocate ──┐
//! CommandSender::enqueue ─────┼──> [ FIFO queue ] ──> CommandReceiver::wait_batch
//! FrameSlotStore::write ──────┤                          │
//! FrameSlotStore::publish ────┘                          ▼
//!        │                              FrameSlotStore::read / retire
//!        └── acquire_writable (blocks when every slot is in flight)
//! ```
//!
//! Only two things cross threads: commands through the queue, and frame slots
//! through the store. Everything else is owned by exactly one side.

#![deny(unsafe_code)]

pub mod command;
pub mod error;
pub mod frame;
pub mod handle;
pub mod queue;

pub use command::{RenderCommand, SequencedCommand};
pub use error::{QueueError, QueueResult};
pub use frame::{FrameSlotStore, FrameToken, PublishedFrame, SlotState};
pub use handle::{HandleAllocator, RenderObjectId};
pub use queue::{command_queue, Batch, CommandReceiver, CommandSender};
