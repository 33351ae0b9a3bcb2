//! Headless backend that records every call it receives.
//!
//! Stands in for a GPU in tests and in the headless binary. The log is shared
//! through an [`EventLog`] handle so the simulation side can inspect what the
//! render thread did after joining it.

use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;

use tandem_core::{FrameToken, RenderObjectId};
use tandem_shared::{GeometryDescriptor, Transform, ViewState};

use crate::backend::RenderBackend;
use crate::error::BackendError;

/// One backend call, as observed.
#[derive(Clone, Debug, PartialEq)]
pub enum BackendEvent {
    /// A resource was built.
    Built {
        /// Object id.
        id: RenderObjectId,
        /// Vertices in the source geometry.
        vertex_count: usize,
        /// Indices in the source geometry.
        index_count: usize,
    },
    /// Building a resource failed.
    BuildFailed {
        /// Object id.
        id: RenderObjectId,
    },
    /// A per-instance transform was uploaded.
    TransformUpdated {
        /// Object id.
        id: RenderObjectId,
        /// Uploaded transform.
        transform: Transform,
    },
    /// A frame started.
    FrameBegun {
        /// Frame being drawn.
        frame: FrameToken,
        /// Camera for the frame.
        view: ViewState,
    },
    /// A draw call was submitted.
    Drawn {
        /// Object id.
        id: RenderObjectId,
        /// Transform used for the draw.
        transform: Transform,
    },
    /// A frame was presented.
    FrameEnded {
        /// Frame presented.
        frame: FrameToken,
    },
    /// A resource was released.
    Released {
        /// Object id.
        id: RenderObjectId,
    },
}

/// Draw calls grouped by frame, rebuilt from an event log.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawnFrame {
    /// Frame that was drawn.
    pub frame: FrameToken,
    /// Camera used.
    pub view: ViewState,
    /// Every draw in submission order.
    pub draws: Vec<(RenderObjectId, Transform)>,
}

impl DrawnFrame {
    /// Transform drawn for `id` in this frame.
    #[must_use]
    pub fn transform_of(&self, id: RenderObjectId) -> Option<Transform> {
        self.draws.iter().find(|(drawn, _)| *drawn == id).map(|(_, t)| *t)
    }
}

/// Shared, cloneable handle to a recorded event list.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<BackendEvent>>>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: BackendEvent) {
        self.events.lock().push(event);
    }

    /// Copy of every event so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<BackendEvent> {
        self.events.lock().clone()
    }

    /// Number of events so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Completed frames, oldest first.
    #[must_use]
    pub fn frames(&self) -> Vec<DrawnFrame> {
        let events = self.events.lock();
        let mut frames = Vec::new();
        let mut current: Option<DrawnFrame> = None;

        for event in events.iter() {
            match event {
                BackendEvent::FrameBegun { frame, view } => {
                    current = Some(DrawnFrame { frame: *frame, view: *view, draws: Vec::new() });
                }
                BackendEvent::Drawn { id, transform } => {
                    if let Some(frame) = current.as_mut() {
                        frame.draws.push((*id, *transform));
                    }
                }
                BackendEvent::FrameEnded { frame } => {
                    if let Some(done) = current.take() {
                        debug_assert_eq!(done.frame, *frame);
                        frames.push(done);
                    }
                }
                _ => {}
            }
        }

        frames
    }

    /// Most recently completed frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<DrawnFrame> {
        self.frames().pop()
    }

    /// Ids in the order their resources were built.
    #[must_use]
    pub fn built_ids(&self) -> Vec<RenderObjectId> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                BackendEvent::Built { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Ids in the order their resources were released.
    #[must_use]
    pub fn released_ids(&self) -> Vec<RenderObjectId> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                BackendEvent::Released { id } => Some(*id),
                _ => None,
            })
            .collect()
    }
}

/// Holds the render thread inside `end_frame` until opened.
///
/// Lets tests stall presentation the way a slow GPU would.
#[derive(Debug)]
pub struct FrameGate {
    receiver: Receiver<()>,
}

/// Opens a [`FrameGate`] for good when dropped or when [`open`](Self::open)
/// is called.
#[derive(Debug)]
pub struct GateOpener {
    _sender: Sender<()>,
}

impl GateOpener {
    /// Releases the render thread and every later frame.
    pub fn open(self) {}
}

impl FrameGate {
    /// Creates a closed gate and the handle that opens it.
    #[must_use]
    pub fn closed() -> (Self, GateOpener) {
        let (sender, receiver) = bounded(0);
        (Self { receiver }, GateOpener { _sender: sender })
    }

    fn wait(&self) {
        // Nothing is ever sent; recv returns once the opener is dropped
        let _ = self.receiver.recv();
    }
}

/// What [`RecordingBackend`] keeps per object.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedResource {
    /// Vertices in the source geometry.
    pub vertex_count: usize,
    /// Indices in the source geometry.
    pub index_count: usize,
    /// Last uploaded transform.
    pub transform: Transform,
}

/// Backend that draws nothing and writes everything down.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    log: EventLog,
    gate: Option<FrameGate>,
    /// Skip per-instance transform uploads in the log (they dominate long runs).
    quiet_uploads: bool,
}

impl RecordingBackend {
    /// Creates a backend writing into `log`.
    #[must_use]
    pub fn new(log: EventLog) -> Self {
        Self { log, gate: None, quiet_uploads: false }
    }

    /// Makes `end_frame` wait on `gate`.
    #[must_use]
    pub fn with_gate(mut self, gate: FrameGate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Stops logging transform uploads.
    #[must_use]
    pub fn quiet_uploads(mut self) -> Self {
        self.quiet_uploads = true;
        self
    }

    /// The log this backend writes into.
    #[must_use]
    pub fn log(&self) -> &EventLog {
        &self.log
    }
}

impl RenderBackend for RecordingBackend {
    type Resource = RecordedResource;

    fn build(&mut self, id: RenderObjectId, geometry: &GeometryDescriptor) -> Result<Self::Resource, BackendError> {
        if !geometry.is_well_formed() {
            self.log.push(BackendEvent::BuildFailed { id });
            return Err(BackendError::InvalidGeometry(id));
        }

        let resource = RecordedResource {
            vertex_count: geometry.vertex_count(),
            index_count: geometry.index_count(),
            transform: Transform::IDENTITY,
        };
        self.log.push(BackendEvent::Built {
            id,
            vertex_count: resource.vertex_count,
            index_count: resource.index_count,
        });
        Ok(resource)
    }

    fn update_transform(&mut self, id: RenderObjectId, resource: &mut Self::Resource, transform: &Transform) {
        resource.transform = *transform;
        if !self.quiet_uploads {
            self.log.push(BackendEvent::TransformUpdated { id, transform: *transform });
        }
    }

    fn begin_frame(&mut self, frame: FrameToken, view: &ViewState) {
        self.log.push(BackendEvent::FrameBegun { frame, view: *view });
    }

    fn draw(&mut self, id: RenderObjectId, resource: &Self::Resource, transform: &Transform) {
        debug_assert_eq!(resource.transform, *transform, "draw with a transform that was never uploaded");
        self.log.push(BackendEvent::Drawn { id, transform: *transform });
    }

    fn end_frame(&mut self, frame: FrameToken) {
        self.log.push(BackendEvent::FrameEnded { frame });
        if let Some(gate) = &self.gate {
            gate.wait();
        }
    }

    fn release(&mut self, id: RenderObjectId, _resource: Self::Resource) {
        self.log.push(BackendEvent::Released { id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_shared::{DefaultGeometry, Vec3};

    #[test]
    fn test_frames_grouping() {
        let log = EventLog::new();
        let mut backend = RecordingBackend::new(log.clone());
        let id = RenderObjectId::new(0, 0);

        let mut resource = backend.build(id, &DefaultGeometry::cube()).unwrap();
        let moved = Transform::from_position(Vec3::X);
        backend.update_transform(id, &mut resource, &moved);

        let frame = FrameToken::new(0, 0);
        backend.begin_frame(frame, &ViewState::default());
        backend.draw(id, &resource, &moved);
        backend.end_frame(frame);
        backend.release(id, resource);

        let frames = log.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].transform_of(id), Some(moved));
        assert_eq!(log.built_ids(), vec![id]);
        assert_eq!(log.released_ids(), vec![id]);
    }

    #[test]
    fn test_gate_blocks_until_opened() {
        let (gate, opener) = FrameGate::closed();
        let mut backend = RecordingBackend::new(EventLog::new()).with_gate(gate);

        let handle = std::thread::spawn(move || {
            backend.end_frame(FrameToken::new(0, 0));
            backend.end_frame(FrameToken::new(1, 1));
        });

        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(!handle.is_finished());
        opener.open();
        handle.join().unwrap();
    }
}
