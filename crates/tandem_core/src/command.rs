//! # Render Commands
//!
//! The closed set of things the simulation can ask of the render thread.
//! The consumer matches exhaustively; adding a variant is a compile error
//! everywhere a command is applied.

use tandem_shared::{GeometryDescriptor, Transform};

use crate::frame::FrameToken;
use crate::handle::RenderObjectId;

/// A command travelling simulation → render.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCommand {
    /// Build a drawable from `geometry` behind the already allocated `id`.
    CreateRenderObject {
        /// Handle allocated synchronously by the simulation.
        id: RenderObjectId,
        /// Consumed once when the GPU resource is built.
        geometry: GeometryDescriptor,
    },

    /// Place an object immediately, outside the frame slot snapshot.
    ///
    /// Used for initial placement at spawn time. A transform from a
    /// published frame newer than `frame` always wins over this one.
    UpdateTransform {
        /// Target object.
        id: RenderObjectId,
        /// New transform.
        transform: Transform,
        /// Writable frame at the time the command was issued.
        frame: FrameToken,
    },

    /// Release the drawable and its GPU resource.
    DestroyRenderObject {
        /// Target object.
        id: RenderObjectId,
    },

    /// The slot for `frame` is published and forms a complete snapshot.
    EndFrame {
        /// The frame that was just published.
        frame: FrameToken,
    },
}

impl RenderCommand {
    /// The object this command addresses, if any.
    #[must_use]
    pub fn target(&self) -> Option<RenderObjectId> {
        match self {
            Self::CreateRenderObject { id, .. }
            | Self::UpdateTransform { id, .. }
            | Self::DestroyRenderObject { id } => Some(*id),
            Self::EndFrame { .. } => None,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CreateRenderObject { .. } => "create",
            Self::UpdateTransform { .. } => "update_transform",
            Self::DestroyRenderObject { .. } => "destroy",
            Self::EndFrame { .. } => "end_frame",
        }
    }
}

/// A command tagged with its submission order.
///
/// Sequence numbers start at 0 and increase by one per enqueued command.
#[derive(Clone, Debug, PartialEq)]
pub struct SequencedCommand {
    /// Position in submission order.
    pub sequence: u64,
    /// The command itself.
    pub command: RenderCommand,
}
