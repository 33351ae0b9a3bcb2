//! # Frame Slot Store
//!
//! Lets the simulation write frame N+1 while the render thread reads frame N,
//! without either side ever seeing a half-written frame.
//!
//! ## The Problem
//!
//! ```text
//! Simulation:  write obj0, obj1, obj2 ... (tick in progress)
//! Render:      read  obj0, obj1, obj2 ... (draw in progress)
//!
//! Same buffer:  TEARING (obj0 from frame N+1, obj2 from frame N)
//! ```
//!
//! ## The Solution: A Ring of Slots with Explicit State
//!
//! ```text
//!             publish()                 retire()
//! Writable ─────────────> Published ─────────────> Retired
//!    ^                                                │
//!    └──────────────── acquire_writable() ────────────┘
//!                    (blocks if nothing is Retired)
//! ```
//!
//! - Exactly one slot is `Writable`, and only the simulation thread touches it.
//! - `Published` slots are read only by the render thread, oldest first.
//! - With `frames_in_flight = N` the store holds `N + 1` slots, so the
//!   simulation blocks in its `N + 1`-th end of frame until the first
//!   published frame is retired.
//!
//! Each slot sits behind its own `parking_lot::Mutex`. The state check and the
//! write happen under the same lock, so a stale token can never write into a
//! slot the render thread is reading. Ring bookkeeping (free list, publish
//! order) lives behind a second mutex paired with the backpressure condvar.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex, MutexGuard};
use tandem_shared::{Transform, ViewState};

use crate::handle::RenderObjectId;

/// Identifies one frame and the ring slot holding it.
///
/// `frame` increases by one per published frame; `slot` is the ring index.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameToken {
    frame: u64,
    slot: usize,
}

impl FrameToken {
    /// Creates a token.
    #[inline]
    #[must_use]
    pub const fn new(frame: u64, slot: usize) -> Self {
        Self { frame, slot }
    }

    /// Monotonic frame number.
    #[inline]
    #[must_use]
    pub const fn frame(self) -> u64 {
        self.frame
    }

    /// Ring slot index.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> usize {
        self.slot
    }
}

impl fmt::Debug for FrameToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame#{}@slot{}", self.frame, self.slot)
    }
}

/// Lifecycle state of one slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// Owned by the simulation thread for the current tick.
    Writable,
    /// Complete; readable by the render thread only.
    Published,
    /// Consumed; free to become the next writable slot.
    Retired,
}

/// One frame's worth of transform writes.
#[derive(Debug)]
struct FrameSlot {
    state: SlotState,
    frame: u64,
    /// Last write wins within a frame.
    transforms: HashMap<RenderObjectId, Transform>,
    view: Option<ViewState>,
}

impl FrameSlot {
    fn retired() -> Self {
        Self {
            state: SlotState::Retired,
            frame: 0,
            transforms: HashMap::new(),
            view: None,
        }
    }

    fn expect(&self, token: FrameToken, state: SlotState, action: &str) {
        assert!(
            self.state == state && self.frame == token.frame,
            "protocol violation: cannot {action} {token:?}, slot is {:?} for frame {}",
            self.state,
            self.frame,
        );
    }
}

/// Ring bookkeeping shared by both threads.
#[derive(Debug)]
struct Ring {
    /// `None` between `publish` and `acquire_writable`.
    writable: Option<FrameToken>,
    /// Retired slots ready for reuse, oldest first.
    free: VecDeque<usize>,
    /// Published frames in publish order.
    published: VecDeque<FrameToken>,
    next_frame: u64,
    closed: bool,
    published_total: u64,
    retired_total: u64,
}

/// Fixed ring of transform slots with a publish/retire protocol.
///
/// ## Usage
///
/// ```rust
/// use tandem_core::{FrameSlotStore, RenderObjectId};
/// use tandem_shared::{Transform, Vec3};
///
/// let store = FrameSlotStore::new(2);
/// let id = RenderObjectId::new(0, 0);
///
/// // Simulation thread
/// let token = store.current_frame();
/// store.write(token, id, Transform::from_position(Vec3::X));
/// store.publish(token);
/// let _next = store.acquire_writable();
///
/// // Render thread
/// {
///     let frame = store.read(token);
///     assert_eq!(frame.get(id).unwrap().position, Vec3::X);
/// }
/// store.retire(token);
/// ```
pub struct FrameSlotStore {
    slots: Box<[Mutex<FrameSlot>]>,
    ring: Mutex<Ring>,
    /// Signalled on every retire and on close.
    slot_retired: Condvar,
    frames_in_flight: usize,
}

impl FrameSlotStore {
    /// Creates a store allowing `frames_in_flight` published-but-unretired
    /// frames. Allocates `frames_in_flight + 1` slots; slot 0 starts writable.
    ///
    /// # Panics
    ///
    /// Panics if `frames_in_flight` is zero.
    #[must_use]
    pub fn new(frames_in_flight: usize) -> Arc<Self> {
        assert!(frames_in_flight > 0, "frames_in_flight must be greater than zero");

        let slot_count = frames_in_flight + 1;
        let slots: Vec<Mutex<FrameSlot>> = (0..slot_count)
            .map(|_| Mutex::new(FrameSlot::retired()))
            .collect();

        {
            let mut first = slots[0].lock();
            first.state = SlotState::Writable;
            first.frame = 0;
        }

        Arc::new(Self {
            slots: slots.into_boxed_slice(),
            ring: Mutex::new(Ring {
                writable: Some(FrameToken::new(0, 0)),
                free: (1..slot_count).collect(),
                published: VecDeque::with_capacity(slot_count),
                next_frame: 1,
                closed: false,
                published_total: 0,
                retired_total: 0,
            }),
            slot_retired: Condvar::new(),
            frames_in_flight,
        })
    }

    /// Maximum number of published, unretired frames.
    #[inline]
    #[must_use]
    pub const fn frames_in_flight(&self) -> usize {
        self.frames_in_flight
    }

    /// Total number of slots in the ring.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    // =========================================================================
    // Simulation side
    // =========================================================================

    /// Token of the slot the simulation may write this tick.
    ///
    /// # Panics
    ///
    /// Panics if called between [`publish`](Self::publish) and
    /// [`acquire_writable`](Self::acquire_writable).
    #[must_use]
    pub fn current_frame(&self) -> FrameToken {
        self.ring
            .lock()
            .writable
            .expect("protocol violation: no writable frame between publish and acquire")
    }

    /// Records `transform` for `id` in the writable slot `token`.
    ///
    /// # Panics
    ///
    /// Panics if `token` is not the current writable frame.
    pub fn write(&self, token: FrameToken, id: RenderObjectId, transform: Transform) {
        let mut slot = self.lock_slot(token);
        slot.expect(token, SlotState::Writable, "write to");
        slot.transforms.insert(id, transform);
    }

    /// Records the camera view for frame `token`.
    ///
    /// # Panics
    ///
    /// Panics if `token` is not the current writable frame.
    pub fn set_view(&self, token: FrameToken, view: ViewState) {
        let mut slot = self.lock_slot(token);
        slot.expect(token, SlotState::Writable, "set view on");
        slot.view = Some(view);
    }

    /// Marks the writable slot `token` as published.
    ///
    /// After this call the simulation must not touch `token` again. Call
    /// [`acquire_writable`](Self::acquire_writable) for the next frame once
    /// the render thread has been told about this one.
    ///
    /// # Panics
    ///
    /// Panics if `token` is not the current writable frame.
    pub fn publish(&self, token: FrameToken) {
        {
            let mut slot = self.lock_slot(token);
            slot.expect(token, SlotState::Writable, "publish");
            slot.state = SlotState::Published;
        }

        let mut ring = self.ring.lock();
        assert_eq!(
            ring.writable,
            Some(token),
            "protocol violation: published frame is not the ring's writable frame"
        );
        ring.writable = None;
        ring.published.push_back(token);
        ring.published_total += 1;
        tracing::trace!(?token, in_flight = ring.published.len(), "frame published");
    }

    /// Claims the next writable slot, blocking while every slot is in flight.
    ///
    /// Never blocks once the store is closed.
    ///
    /// # Panics
    ///
    /// Panics if a writable slot is already held.
    pub fn acquire_writable(&self) -> FrameToken {
        let mut ring = self.ring.lock();
        assert!(
            ring.writable.is_none(),
            "protocol violation: acquire_writable while {:?} is still writable",
            ring.writable
        );

        if ring.free.is_empty() && !ring.closed {
            tracing::debug!(
                in_flight = ring.published.len(),
                "all frame slots in flight, simulation waiting for render thread"
            );
            while ring.free.is_empty() && !ring.closed {
                self.slot_retired.wait(&mut ring);
            }
        }
        if ring.free.is_empty() {
            // Closed: nobody will read the published frames any more
            self.reclaim_published(&mut ring);
        }

        let slot = ring
            .free
            .pop_front()
            .expect("a free slot exists after waiting or reclaiming");
        let token = FrameToken::new(ring.next_frame, slot);
        ring.next_frame += 1;
        ring.writable = Some(token);
        drop(ring);

        let mut slot = self.lock_slot(token);
        assert_eq!(slot.state, SlotState::Retired, "protocol violation: reusing a slot that is not retired");
        slot.state = SlotState::Writable;
        slot.frame = token.frame;
        slot.transforms.clear();
        slot.view = None;

        token
    }

    // =========================================================================
    // Render side
    // =========================================================================

    /// Locks published frame `token` for reading.
    ///
    /// # Panics
    ///
    /// Panics if `token` is not published.
    #[must_use]
    pub fn read(&self, token: FrameToken) -> PublishedFrame<'_> {
        let slot = self.lock_slot(token);
        slot.expect(token, SlotState::Published, "read");
        PublishedFrame { token, slot }
    }

    /// Returns published frame `token` to the free ring and wakes a blocked
    /// simulation thread.
    ///
    /// Frames must be retired in publish order.
    ///
    /// # Panics
    ///
    /// Panics if `token` is not the oldest published frame.
    pub fn retire(&self, token: FrameToken) {
        {
            let mut slot = self.lock_slot(token);
            slot.expect(token, SlotState::Published, "retire");
            slot.state = SlotState::Retired;
            slot.transforms.clear();
            slot.view = None;
        }

        let mut ring = self.ring.lock();
        let oldest = ring.published.pop_front();
        assert_eq!(oldest, Some(token), "protocol violation: frames must be retired in publish order");
        ring.free.push_back(token.slot);
        ring.retired_total += 1;
        drop(ring);

        self.slot_retired.notify_one();
    }

    /// Oldest frame still waiting to be retired.
    #[must_use]
    pub fn oldest_published(&self) -> Option<FrameToken> {
        self.ring.lock().published.front().copied()
    }

    /// Stops backpressure for good.
    ///
    /// Called by the render thread on its way out. Published frames are
    /// reclaimed and a blocked simulation thread is released.
    pub fn close(&self) {
        let mut ring = self.ring.lock();
        ring.closed = true;
        self.reclaim_published(&mut ring);
        drop(ring);
        self.slot_retired.notify_all();
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Whether [`close`](Self::close) was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.ring.lock().closed
    }

    /// Number of published, unretired frames.
    #[must_use]
    pub fn published_count(&self) -> usize {
        self.ring.lock().published.len()
    }

    /// Total frames ever published.
    #[must_use]
    pub fn frames_published(&self) -> u64 {
        self.ring.lock().published_total
    }

    /// Total frames ever retired by the render thread.
    #[must_use]
    pub fn frames_retired(&self) -> u64 {
        self.ring.lock().retired_total
    }

    /// Current state of ring slot `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    #[must_use]
    pub fn slot_state(&self, slot: usize) -> SlotState {
        self.slots[slot].lock().state
    }

    fn lock_slot(&self, token: FrameToken) -> MutexGuard<'_, FrameSlot> {
        assert!(
            token.slot < self.slots.len(),
            "protocol violation: {token:?} is outside a ring of {} slots",
            self.slots.len()
        );
        self.slots[token.slot].lock()
    }

    /// Moves every published slot straight to the free ring. Ring lock held.
    fn reclaim_published(&self, ring: &mut Ring) {
        while let Some(token) = ring.published.pop_front() {
            let mut slot = self.slots[token.slot].lock();
            slot.state = SlotState::Retired;
            slot.transforms.clear();
            slot.view = None;
            ring.free.push_back(token.slot);
        }
    }
}

impl fmt::Debug for FrameSlotStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ring = self.ring.lock();
        f.debug_struct("FrameSlotStore")
            .field("slots", &self.slots.len())
            .field("writable", &ring.writable)
            .field("published", &ring.published)
            .field("closed", &ring.closed)
            .finish()
    }
}

/// Read guard over one published frame.
///
/// Holds the slot lock; drop it before calling
/// [`FrameSlotStore::retire`].
pub struct PublishedFrame<'a> {
    token: FrameToken,
    slot: MutexGuard<'a, FrameSlot>,
}

impl PublishedFrame<'_> {
    /// The frame being read.
    #[inline]
    #[must_use]
    pub fn token(&self) -> FrameToken {
        self.token
    }

    /// Transform written for `id` in this frame, if any.
    #[must_use]
    pub fn get(&self, id: RenderObjectId) -> Option<&Transform> {
        self.slot.transforms.get(&id)
    }

    /// Every transform written in this frame.
    pub fn transforms(&self) -> impl Iterator<Item = (RenderObjectId, &Transform)> + '_ {
        self.slot.transforms.iter().map(|(id, t)| (*id, t))
    }

    /// Number of objects written in this frame.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slot.transforms.len()
    }

    /// Whether no object was written in this frame.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slot.transforms.is_empty()
    }

    /// Camera view published with this frame.
    #[must_use]
    pub fn view(&self) -> Option<ViewState> {
        self.slot.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tandem_shared::Vec3;

    fn at(x: f32, y: f32, z: f32) -> Transform {
        Transform::from_position(Vec3::new(x, y, z))
    }

    #[test]
    fn test_store_creation() {
        let store = FrameSlotStore::new(2);
        assert_eq!(store.slot_count(), 3);
        assert_eq!(store.current_frame(), FrameToken::new(0, 0));
        assert_eq!(store.slot_state(0), SlotState::Writable);
        assert_eq!(store.slot_state(1), SlotState::Retired);
        assert_eq!(store.published_count(), 0);
    }

    #[test]
    fn test_write_publish_read_roundtrip() {
        let store = FrameSlotStore::new(2);
        let ids: Vec<RenderObjectId> = (0..3).map(|i| RenderObjectId::new(i, 0)).collect();

        let token = store.current_frame();
        store.write(token, ids[0], at(0.5, 0.0, 0.0));
        store.write(token, ids[1], at(0.0, -0.5, 0.0));
        store.write(token, ids[2], at(0.5, -0.5, 0.0));
        store.publish(token);
        let next = store.acquire_writable();

        assert_eq!(next.frame(), 1);
        assert_ne!(next.slot(), token.slot());

        let frame = store.read(token);
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.get(ids[0]), Some(&at(0.5, 0.0, 0.0)));
        assert_eq!(frame.get(ids[1]), Some(&at(0.0, -0.5, 0.0)));
        assert_eq!(frame.get(ids[2]), Some(&at(0.5, -0.5, 0.0)));
    }

    #[test]
    fn test_last_write_wins_within_frame() {
        let store = FrameSlotStore::new(1);
        let id = RenderObjectId::new(0, 0);
        let token = store.current_frame();
        store.write(token, id, at(1.0, 0.0, 0.0));
        store.write(token, id, at(2.0, 0.0, 0.0));
        store.publish(token);

        assert_eq!(store.read(token).get(id), Some(&at(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_writable_and_published_never_alias() {
        let store = FrameSlotStore::new(2);
        for _ in 0..10 {
            let token = store.current_frame();
            store.publish(token);
            let next = store.acquire_writable();
            assert_ne!(next.slot(), token.slot());
            assert_eq!(store.slot_state(token.slot()), SlotState::Published);
            assert_eq!(store.slot_state(next.slot()), SlotState::Writable);
            store.retire(token);
        }
        assert_eq!(store.frames_retired(), 10);
    }

    #[test]
    fn test_backpressure_blocks_until_retire() {
        let depth = 2;
        let store = FrameSlotStore::new(depth);
        let completed = Arc::new(AtomicUsize::new(0));
        let first = store.current_frame();

        let producer = {
            let store = Arc::clone(&store);
            let completed = Arc::clone(&completed);
            std::thread::spawn(move || {
                for _ in 0..=depth {
                    let token = store.current_frame();
                    store.publish(token);
                    let _ = store.acquire_writable();
                    completed.fetch_add(1, Ordering::SeqCst);
                }
            })
        };

        // Call number depth + 1 cannot finish while frame 0 is in flight
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(completed.load(Ordering::SeqCst), depth);
        assert_eq!(store.published_count(), depth + 1);

        store.retire(first);
        producer.join().unwrap();
        assert_eq!(completed.load(Ordering::SeqCst), depth + 1);
    }

    #[test]
    fn test_close_releases_blocked_producer() {
        let store = FrameSlotStore::new(1);
        let token = store.current_frame();
        store.publish(token);
        let token = store.acquire_writable();
        store.publish(token);

        let producer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || store.acquire_writable())
        };

        std::thread::sleep(Duration::from_millis(20));
        store.close();
        let next = producer.join().unwrap();
        assert_eq!(next.frame(), 2);
        assert_eq!(store.published_count(), 0);
    }

    #[test]
    #[should_panic(expected = "cannot write to")]
    fn test_stale_token_write_panics() {
        let store = FrameSlotStore::new(2);
        let stale = store.current_frame();
        store.publish(stale);
        let _ = store.acquire_writable();
        store.write(stale, RenderObjectId::new(0, 0), Transform::IDENTITY);
    }

    #[test]
    #[should_panic(expected = "cannot read")]
    fn test_read_writable_panics() {
        let store = FrameSlotStore::new(2);
        let token = store.current_frame();
        let _ = store.read(token);
    }

    #[test]
    #[should_panic(expected = "retired in publish order")]
    fn test_out_of_order_retire_panics() {
        let store = FrameSlotStore::new(2);
        let first = store.current_frame();
        store.publish(first);
        let second = store.acquire_writable();
        store.publish(second);
        store.retire(second);
    }
}
