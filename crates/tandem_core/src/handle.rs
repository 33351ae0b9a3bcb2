//! # Render Object Handles
//!
//! Handles are allocated synchronously on the simulation thread, so a
//! creation call returns an id immediately while the render thread builds the
//! actual resource later. Each id is split into:
//! - An index into the render thread's object table
//! - A generation counter, bumped on release, so a reused index never
//!   addresses a newer, unrelated object through a stale id

use std::fmt;

/// Opaque identifier for a render-thread-owned drawable.
///
/// - Lower 32 bits: table index
/// - Upper 32 bits: generation
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct RenderObjectId(u64);

impl RenderObjectId {
    /// Creates an id from index and generation.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the table index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Null/invalid id.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this id is null.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for RenderObjectId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for RenderObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "RenderObjectId(null)")
        } else {
            write!(f, "RenderObjectId({}v{})", self.index(), self.generation())
        }
    }
}

/// Simulation-side free list of render object ids.
///
/// The render thread never touches this. It mirrors the same index/generation
/// pairs in its own table because it applies create/destroy commands in the
/// exact order they were allocated/released here.
///
/// # Thread Safety
///
/// Not thread-safe. Owned by the simulation thread.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    /// Current generation per index.
    generations: Vec<u32>,
    /// Liveness per index.
    live: Vec<bool>,
    /// Indices available for reuse, LIFO.
    free_list: Vec<u32>,
    /// Number of live ids.
    live_count: usize,
}

impl HandleAllocator {
    /// Creates an empty allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh id. O(1).
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX - 1` indices are ever in use at once.
    pub fn allocate(&mut self) -> RenderObjectId {
        let index = if let Some(index) = self.free_list.pop() {
            index
        } else {
            let index = u32::try_from(self.generations.len())
                .ok()
                .filter(|&i| i != u32::MAX)
                .expect("render object index space exhausted");
            self.generations.push(0);
            self.live.push(false);
            index
        };

        let slot = index as usize;
        self.live[slot] = true;
        self.live_count += 1;

        RenderObjectId::new(index, self.generations[slot])
    }

    /// Releases an id. Its index may be handed out again with a new generation.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live. Releasing twice, or releasing an id from a
    /// previous generation, is a protocol violation.
    pub fn release(&mut self, id: RenderObjectId) {
        assert!(self.is_live(id), "protocol violation: release of non-live handle {id:?}");

        let slot = id.index() as usize;
        self.live[slot] = false;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free_list.push(id.index());
        self.live_count -= 1;
    }

    /// Whether `id` refers to a currently allocated object.
    #[must_use]
    pub fn is_live(&self, id: RenderObjectId) -> bool {
        if id.is_null() {
            return false;
        }
        let slot = id.index() as usize;
        self.live.get(slot).copied().unwrap_or(false) && self.generations[slot] == id.generation()
    }

    /// Number of live ids.
    #[inline]
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        let id = RenderObjectId::new(12345, 67890);
        assert_eq!(id.index(), 12345);
        assert_eq!(id.generation(), 67890);
        assert!(!id.is_null());
        assert!(RenderObjectId::default().is_null());
    }

    #[test]
    fn test_allocate_sequential() {
        let mut handles = HandleAllocator::new();
        let a = handles.allocate();
        let b = handles.allocate();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(handles.live_count(), 2);
    }

    #[test]
    fn test_reuse_bumps_generation() {
        let mut handles = HandleAllocator::new();
        let old = handles.allocate();
        handles.release(old);

        let new = handles.allocate();
        assert_eq!(new.index(), old.index()); // Same slot reused
        assert_ne!(new, old);
        assert!(!handles.is_live(old));
        assert!(handles.is_live(new));
    }

    #[test]
    #[should_panic(expected = "release of non-live handle")]
    fn test_double_release_panics() {
        let mut handles = HandleAllocator::new();
        let id = handles.allocate();
        handles.release(id);
        handles.release(id);
    }
}
