//! # Render Thread
//!
//! ## Frame Flow
//!
//! ```text
//! Simulation (tick N)                         Render thread
//! ───────────────────                         ─────────────
//! set_transform(id, t, frame N) ──> slot N
//! end_frame():
//!   publish(slot N)
//!   enqueue EndFrame(N) ─────────────────────> wait_batch
//!   acquire_writable() (may block)             read slot N ──> table
//!                                              draw
//!                     <──────────────────────  retire slot N
//! ```
//!
//! Creates, destroys and immediate transforms travel through the same queue,
//! so the render thread sees them in exactly the order the simulation issued
//! them relative to frame boundaries.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tandem_core::{
    command_queue, Batch, CommandReceiver, CommandSender, FrameSlotStore, FrameToken, HandleAllocator, QueueError,
    RenderCommand, RenderObjectId, SequencedCommand,
};
use tandem_shared::{GeometryDescriptor, Transform, ViewState, MAX_COMMAND_CAPACITY, MAX_FRAMES_IN_FLIGHT};

use crate::backend::RenderBackend;
use crate::config::RenderConfig;
use crate::error::{RenderError, RenderResult};
use crate::render_object::RenderObjectTable;
use crate::stats::RenderStats;

/// Simulation-side handle to the render thread.
///
/// Owns the command producer, the handle allocator and a reference to the
/// frame slot store. Dropping it shuts the render thread down and joins it.
///
/// # Thread Safety
///
/// `Send` but not meant to be shared: exactly one simulation thread drives it.
#[derive(Debug)]
pub struct RenderThread {
    commands: CommandSender,
    handles: HandleAllocator,
    frames: Arc<FrameSlotStore>,
    worker: Option<JoinHandle<RenderStats>>,
}

impl RenderThread {
    /// Starts the render thread with `backend` moved into it.
    ///
    /// # Errors
    ///
    /// - [`RenderError::InvalidConfig`] for a frame depth outside
    ///   `1..=MAX_FRAMES_IN_FLIGHT` or a queue capacity outside
    ///   `1..=MAX_COMMAND_CAPACITY`.
    /// - [`RenderError::Spawn`] if the OS refuses the thread.
    pub fn spawn<B: RenderBackend>(config: &RenderConfig, backend: B) -> RenderResult<Self> {
        if config.frames_in_flight == 0 {
            return Err(RenderError::InvalidConfig("frames_in_flight must be at least 1"));
        }
        if config.frames_in_flight > MAX_FRAMES_IN_FLIGHT {
            return Err(RenderError::InvalidConfig("frames_in_flight exceeds MAX_FRAMES_IN_FLIGHT"));
        }
        if config.command_capacity == 0 {
            return Err(RenderError::InvalidConfig("command_capacity must be at least 1"));
        }
        if config.command_capacity > MAX_COMMAND_CAPACITY {
            return Err(RenderError::InvalidConfig("command_capacity exceeds MAX_COMMAND_CAPACITY"));
        }

        let (commands, receiver) = command_queue(config.command_capacity);
        let frames = FrameSlotStore::new(config.frames_in_flight);
        let worker = RenderWorker::new(receiver, Arc::clone(&frames), backend);

        let handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || worker.run())?;

        tracing::info!(
            thread = %config.thread_name,
            frames_in_flight = config.frames_in_flight,
            command_capacity = config.command_capacity,
            "render thread spawned"
        );

        Ok(Self {
            commands,
            handles: HandleAllocator::new(),
            frames,
            worker: Some(handle),
        })
    }

    // =========================================================================
    // Object lifecycle (queued)
    // =========================================================================

    /// Allocates a handle and queues the object's creation.
    ///
    /// The handle is valid immediately; the resource is built later on the
    /// render thread. After shutdown was requested the command is dropped and
    /// the handle never materializes.
    pub fn create_render_object(&mut self, geometry: GeometryDescriptor) -> RenderObjectId {
        let id = self.handles.allocate();
        self.submit(RenderCommand::CreateRenderObject { id, geometry });
        id
    }

    /// Queues an immediate transform for `id`, outside the frame snapshot.
    ///
    /// Meant for initial placement. Per-tick motion goes through
    /// [`set_transform`](Self::set_transform).
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live.
    pub fn update_transform(&mut self, id: RenderObjectId, transform: Transform) {
        self.expect_live(id, "update_transform");
        let frame = self.frames.current_frame();
        self.submit(RenderCommand::UpdateTransform { id, transform, frame });
    }

    /// Releases `id` and queues destruction of its render object.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live.
    pub fn destroy_render_object(&mut self, id: RenderObjectId) {
        self.handles.release(id);
        self.submit(RenderCommand::DestroyRenderObject { id });
    }

    // =========================================================================
    // Frame snapshot
    // =========================================================================

    /// The frame the simulation is writing this tick.
    #[must_use]
    pub fn current_frame(&self) -> FrameToken {
        self.frames.current_frame()
    }

    /// Writes `transform` for `id` into writable frame `frame`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live or `frame` is not the writable frame.
    pub fn set_transform(&self, id: RenderObjectId, transform: Transform, frame: FrameToken) {
        self.expect_live(id, "set_transform");
        self.frames.write(frame, id, transform);
    }

    /// Writes the camera view into writable frame `frame`.
    ///
    /// # Panics
    ///
    /// Panics if `frame` is not the writable frame.
    pub fn set_view(&self, view: ViewState, frame: FrameToken) {
        self.frames.set_view(frame, view);
    }

    /// Publishes the current frame and hands it to the render thread.
    ///
    /// Blocks while `frames_in_flight` published frames are still unretired.
    /// Returns the next writable frame.
    pub fn end_frame(&mut self) -> FrameToken {
        let published = self.frames.current_frame();
        self.frames.publish(published);
        // If the command is dropped the render thread closes the store on exit
        self.submit(RenderCommand::EndFrame { frame: published });

        let next = self.frames.acquire_writable();
        tracing::trace!(?published, ?next, "frame ended");
        next
    }

    // =========================================================================
    // Shutdown
    // =========================================================================

    /// Queues the shutdown marker. Everything queued so far is still applied.
    ///
    /// Idempotent. Commands issued afterwards are dropped.
    pub fn request_shutdown(&mut self) {
        if !self.commands.is_closed() {
            tracing::info!(pending = self.commands.pending_count(), "render thread shutdown requested");
            self.commands.close();
        }
    }

    /// Whether [`request_shutdown`](Self::request_shutdown) was called.
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.commands.is_closed()
    }

    /// Requests shutdown, waits for the render thread to drain and release
    /// everything, and returns its statistics.
    ///
    /// # Errors
    ///
    /// [`RenderError::Panicked`] if the render thread panicked.
    pub fn shutdown(mut self) -> RenderResult<RenderStats> {
        self.request_shutdown();
        self.join()
    }

    fn join(&mut self) -> RenderResult<RenderStats> {
        let worker = self.worker.take().ok_or(RenderError::AlreadyJoined)?;
        worker.join().map_err(|_| RenderError::Panicked)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// The frame slot store shared with the render thread.
    #[must_use]
    pub fn frames(&self) -> &Arc<FrameSlotStore> {
        &self.frames
    }

    /// Whether `id` is a live handle.
    #[must_use]
    pub fn is_live(&self, id: RenderObjectId) -> bool {
        self.handles.is_live(id)
    }

    /// Number of live handles.
    #[must_use]
    pub fn live_objects(&self) -> usize {
        self.handles.live_count()
    }

    fn expect_live(&self, id: RenderObjectId, action: &str) {
        assert!(
            self.handles.is_live(id),
            "protocol violation: {action} on non-live handle {id:?}"
        );
    }

    fn submit(&mut self, command: RenderCommand) {
        let kind = command.kind();
        match self.commands.enqueue(command) {
            Ok(sequence) => tracing::trace!(sequence, kind, "command enqueued"),
            // Already logged by the sender
            Err(QueueError::ShuttingDown) => {}
            Err(QueueError::Disconnected) => {
                tracing::warn!(kind, "render thread is gone, command dropped");
            }
        }
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        if self.worker.is_none() {
            return;
        }
        self.request_shutdown();
        if let Err(error) = self.join() {
            tracing::error!(%error, "render thread did not shut down cleanly");
        }
    }
}

/// Closes the frame store when the render thread exits, even by panic, so a
/// simulation blocked on backpressure is never stranded.
struct CloseOnDrop(Arc<FrameSlotStore>);

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// State owned by the render thread.
struct RenderWorker<B: RenderBackend> {
    commands: CommandReceiver,
    frames: Arc<FrameSlotStore>,
    backend: B,
    objects: RenderObjectTable<B::Resource>,
    view: ViewState,
    /// Frames read this batch but not yet drawn and retired.
    consumed: Vec<FrameToken>,
    stats: RenderStats,
}

impl<B: RenderBackend> RenderWorker<B> {
    fn new(commands: CommandReceiver, frames: Arc<FrameSlotStore>, backend: B) -> Self {
        let consumed = Vec::with_capacity(frames.slot_count());
        Self {
            commands,
            frames,
            backend,
            objects: RenderObjectTable::new(),
            view: ViewState::default(),
            consumed,
            stats: RenderStats::default(),
        }
    }

    fn run(mut self) -> RenderStats {
        let _close = CloseOnDrop(Arc::clone(&self.frames));
        tracing::info!("render thread started");

        let mut batch = Vec::with_capacity(256);
        loop {
            batch.clear();
            let status = self.commands.wait_batch(&mut batch);
            self.apply_batch(&batch);
            if status == Batch::ShutdownRequested {
                break;
            }
        }

        self.release_all();
        tracing::info!(
            commands = self.stats.commands_applied,
            frames_drawn = self.stats.frames_drawn,
            released = self.stats.objects_released_at_shutdown,
            "render thread stopped"
        );
        self.stats
    }

    /// Applies a batch in order. Only the last `EndFrame` in the batch draws;
    /// earlier frames are folded into it.
    fn apply_batch(&mut self, batch: &[SequencedCommand]) {
        let last_end = batch
            .iter()
            .rposition(|c| matches!(c.command, RenderCommand::EndFrame { .. }));

        for (position, sequenced) in batch.iter().enumerate() {
            self.check_order(sequenced.sequence);

            match &sequenced.command {
                RenderCommand::CreateRenderObject { id, geometry } => self.create(*id, geometry),
                RenderCommand::UpdateTransform { id, transform, frame } => {
                    self.update_immediate(*id, transform, *frame);
                }
                RenderCommand::DestroyRenderObject { id } => self.destroy(*id),
                RenderCommand::EndFrame { frame } => {
                    self.consume_frame(*frame);
                    if Some(position) == last_end {
                        self.draw(*frame);
                        self.retire_consumed();
                    }
                }
            }

            self.stats.commands_applied += 1;
            self.stats.last_sequence = Some(sequenced.sequence);
        }
    }

    fn check_order(&self, sequence: u64) {
        if let Some(last) = self.stats.last_sequence {
            assert_eq!(
                sequence,
                last + 1,
                "protocol violation: command {sequence} applied after {last}"
            );
        }
    }

    fn create(&mut self, id: RenderObjectId, geometry: &GeometryDescriptor) {
        let resource = match self.backend.build(id, geometry) {
            Ok(resource) => Some(resource),
            Err(error) => {
                tracing::error!(?id, %error, "failed to build render object, it will not be drawn");
                self.stats.build_failures += 1;
                None
            }
        };
        self.objects.create(id, resource);
        self.stats.objects_created += 1;
        tracing::trace!(?id, "render object created");
    }

    fn update_immediate(&mut self, id: RenderObjectId, transform: &Transform, frame: FrameToken) {
        match self.objects.apply_immediate(id, *transform, frame) {
            Some(object) => {
                if let Some(resource) = object.resource_mut() {
                    self.backend.update_transform(id, resource, transform);
                }
            }
            None => {
                tracing::trace!(?id, ?frame, "immediate transform superseded by a published frame");
                self.stats.immediate_transforms_ignored += 1;
            }
        }
    }

    fn destroy(&mut self, id: RenderObjectId) {
        if let Some(resource) = self.objects.destroy(id) {
            self.backend.release(id, resource);
        }
        self.stats.objects_destroyed += 1;
        tracing::trace!(?id, "render object destroyed");
    }

    /// Copies published frame `token` into the object table.
    fn consume_frame(&mut self, token: FrameToken) {
        let frame = self.frames.read(token);
        if let Some(view) = frame.view() {
            self.view = view;
        }

        for (id, transform) in frame.transforms() {
            match self.objects.apply_published(id, *transform, token) {
                Some(object) => {
                    if let Some(resource) = object.resource_mut() {
                        self.backend.update_transform(id, resource, transform);
                    }
                }
                None => {
                    // Destroyed earlier in queue order
                    tracing::trace!(?id, ?token, "skipping transform for destroyed render object");
                    self.stats.stale_transforms_skipped += 1;
                }
            }
        }

        self.consumed.push(token);
        self.stats.frames_consumed += 1;
    }

    fn draw(&mut self, token: FrameToken) {
        self.backend.begin_frame(token, &self.view);

        let mut draws = 0;
        for object in self.objects.iter() {
            if let Some(resource) = object.resource() {
                self.backend.draw(object.id(), resource, object.transform());
                draws += 1;
            }
        }

        self.backend.end_frame(token);
        self.stats.draw_calls += draws;
        self.stats.frames_drawn += 1;
        tracing::trace!(?token, draws, "frame drawn");
    }

    fn retire_consumed(&mut self) {
        for token in self.consumed.drain(..) {
            self.frames.retire(token);
        }
    }

    fn release_all(&mut self) {
        for (id, resource) in self.objects.drain() {
            if let Some(resource) = resource {
                self.backend.release(id, resource);
            }
            self.stats.objects_released_at_shutdown += 1;
        }
    }
}
