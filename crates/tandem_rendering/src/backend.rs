//! The seam between the render thread and an actual graphics API.
//!
//! Everything behind this trait is opaque to the synchronization design. The
//! render thread calls it, in order, from a single thread.

use tandem_core::{FrameToken, RenderObjectId};
use tandem_shared::{GeometryDescriptor, Transform, ViewState};

use crate::error::BackendError;

/// Graphics capabilities the render thread drives.
///
/// Call order per drawn frame:
///
/// ```text
/// begin_frame ─> draw (once per live object with a resource) ─> end_frame
/// ```
///
/// `build`, `update_transform` and `release` happen while commands are
/// applied, between frames.
pub trait RenderBackend: Send + 'static {
    /// GPU-side state for one drawable.
    type Resource: Send;

    /// Builds the GPU resource for a newly created object.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the geometry cannot be built. The render
    /// thread logs it and keeps the object without a resource.
    fn build(&mut self, id: RenderObjectId, geometry: &GeometryDescriptor) -> Result<Self::Resource, BackendError>;

    /// Pushes a new per-instance transform to the GPU resource.
    fn update_transform(&mut self, id: RenderObjectId, resource: &mut Self::Resource, transform: &Transform);

    /// Starts drawing frame `frame` as seen from `view`.
    fn begin_frame(&mut self, frame: FrameToken, view: &ViewState);

    /// Submits one draw call.
    fn draw(&mut self, id: RenderObjectId, resource: &Self::Resource, transform: &Transform);

    /// Finishes (presents) frame `frame`. May block on the GPU.
    fn end_frame(&mut self, frame: FrameToken);

    /// Releases the GPU resource of a destroyed object.
    fn release(&mut self, id: RenderObjectId, resource: Self::Resource);
}
