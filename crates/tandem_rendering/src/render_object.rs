//! # Render Object Table
//!
//! Slot-indexed storage for every drawable, owned by the render thread.
//!
//! Slots are addressed by the index half of a [`RenderObjectId`]; the
//! generation half must match the slot's current occupant. The simulation
//! allocates ids in the same order the table sees create/destroy commands, so
//! a mismatch can only come from a bug and is treated as one.

use tandem_core::{FrameToken, RenderObjectId};
use tandem_shared::Transform;

/// One drawable owned by the render thread.
#[derive(Debug)]
pub struct RenderObject<R> {
    id: RenderObjectId,
    resource: Option<R>,
    transform: Transform,
    /// Newest published frame that wrote this object's transform.
    published_frame: Option<u64>,
}

impl<R> RenderObject<R> {
    /// The object's id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> RenderObjectId {
        self.id
    }

    /// GPU resource; `None` if building it failed.
    #[inline]
    #[must_use]
    pub fn resource(&self) -> Option<&R> {
        self.resource.as_ref()
    }

    /// Mutable GPU resource.
    #[inline]
    pub fn resource_mut(&mut self) -> Option<&mut R> {
        self.resource.as_mut()
    }

    /// Most recent transform.
    #[inline]
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Newest published frame number that moved this object.
    #[inline]
    #[must_use]
    pub fn published_frame(&self) -> Option<u64> {
        self.published_frame
    }
}

/// The render thread's object table.
///
/// # Thread Safety
///
/// Not thread-safe, and never needs to be: only the render thread has one.
#[derive(Debug)]
pub struct RenderObjectTable<R> {
    slots: Vec<Option<RenderObject<R>>>,
    live: usize,
}

impl<R> Default for RenderObjectTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> RenderObjectTable<R> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self { slots: Vec::new(), live: 0 }
    }

    /// Number of live objects.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Whether the table is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Inserts a new object at `id`'s slot.
    ///
    /// # Panics
    ///
    /// Panics if the slot is occupied: the simulation reused an index
    /// without destroying its previous occupant first.
    pub fn create(&mut self, id: RenderObjectId, resource: Option<R>) {
        assert!(!id.is_null(), "protocol violation: create with null handle");

        let index = id.index() as usize;
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }

        let slot = &mut self.slots[index];
        assert!(
            slot.is_none(),
            "protocol violation: create {id:?} over live {:?}",
            slot.as_ref().map(RenderObject::id)
        );

        *slot = Some(RenderObject {
            id,
            resource,
            transform: Transform::IDENTITY,
            published_frame: None,
        });
        self.live += 1;
    }

    /// Removes `id`, returning its resource (if it had one).
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live.
    pub fn destroy(&mut self, id: RenderObjectId) -> Option<R> {
        let Some(slot) = self
            .slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.as_ref().is_some_and(|object| object.id == id))
        else {
            panic!("protocol violation: destroy on unknown or stale handle {id:?}");
        };
        self.live -= 1;
        slot.take().and_then(|object| object.resource)
    }

    /// Object for `id` if it is live.
    #[must_use]
    pub fn get(&self, id: RenderObjectId) -> Option<&RenderObject<R>> {
        self.slots
            .get(id.index() as usize)?
            .as_ref()
            .filter(|object| object.id == id)
    }

    /// Mutable object for `id` if it is live.
    pub fn get_mut(&mut self, id: RenderObjectId) -> Option<&mut RenderObject<R>> {
        self.slots
            .get_mut(id.index() as usize)?
            .as_mut()
            .filter(|object| object.id == id)
    }

    /// Applies an immediate (out-of-snapshot) transform issued during
    /// writable frame `frame`.
    ///
    /// Ignored if a published frame at or after `frame` already moved the
    /// object. Returns the object if the transform was taken.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live.
    pub fn apply_immediate(
        &mut self,
        id: RenderObjectId,
        transform: Transform,
        frame: FrameToken,
    ) -> Option<&mut RenderObject<R>> {
        let Some(object) = self.get_mut(id) else {
            panic!("protocol violation: update on unknown or stale handle {id:?}");
        };

        if object.published_frame.is_some_and(|published| published >= frame.frame()) {
            return None;
        }
        object.transform = transform;
        Some(object)
    }

    /// Applies a transform from published frame `frame`.
    ///
    /// Returns `None` (and changes nothing) if `id` was destroyed before the
    /// frame was consumed; that write is simply stale.
    pub fn apply_published(
        &mut self,
        id: RenderObjectId,
        transform: Transform,
        frame: FrameToken,
    ) -> Option<&mut RenderObject<R>> {
        let object = self.get_mut(id)?;
        object.transform = transform;
        object.published_frame = Some(frame.frame());
        Some(object)
    }

    /// Live objects in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &RenderObject<R>> + '_ {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Removes every object, yielding ids and resources for release.
    pub fn drain(&mut self) -> impl Iterator<Item = (RenderObjectId, Option<R>)> + '_ {
        self.live = 0;
        self.slots.drain(..).flatten().map(|object| (object.id, object.resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_shared::Vec3;

    fn at(x: f32) -> Transform {
        Transform::from_position(Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn test_create_destroy() {
        let mut table: RenderObjectTable<u32> = RenderObjectTable::new();
        let id = RenderObjectId::new(3, 0);

        table.create(id, Some(7));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(id).and_then(RenderObject::resource), Some(&7));

        assert_eq!(table.destroy(id), Some(7));
        assert!(table.is_empty());
        assert!(table.get(id).is_none());
    }

    #[test]
    fn test_stale_generation_not_found() {
        let mut table: RenderObjectTable<()> = RenderObjectTable::new();
        let old = RenderObjectId::new(0, 0);
        let new = RenderObjectId::new(0, 1);

        table.create(old, Some(()));
        let _ = table.destroy(old);
        table.create(new, Some(()));

        assert!(table.get(old).is_none());
        assert!(table.apply_published(old, at(1.0), FrameToken::new(0, 0)).is_none());
        assert_eq!(table.get(new).unwrap().transform(), &Transform::IDENTITY);
    }

    #[test]
    fn test_published_beats_older_immediate() {
        let mut table: RenderObjectTable<()> = RenderObjectTable::new();
        let id = RenderObjectId::new(0, 0);
        table.create(id, None);

        assert!(table.apply_immediate(id, at(1.0), FrameToken::new(0, 0)).is_some());
        assert!(table.apply_published(id, at(2.0), FrameToken::new(1, 1)).is_some());

        // Immediate write from frame 1 is not newer than published frame 1
        assert!(table.apply_immediate(id, at(3.0), FrameToken::new(1, 1)).is_none());
        assert_eq!(table.get(id).unwrap().transform(), &at(2.0));

        assert!(table.apply_immediate(id, at(4.0), FrameToken::new(2, 2)).is_some());
        assert_eq!(table.get(id).unwrap().transform(), &at(4.0));
    }

    #[test]
    fn test_drain_releases_everything() {
        let mut table: RenderObjectTable<u8> = RenderObjectTable::new();
        for i in 0..4 {
            table.create(RenderObjectId::new(i, 0), Some(i as u8));
        }
        let drained: Vec<_> = table.drain().collect();
        assert_eq!(drained.len(), 4);
        assert!(table.is_empty());
    }

    #[test]
    #[should_panic(expected = "destroy on unknown or stale handle")]
    fn test_destroy_unknown_panics() {
        let mut table: RenderObjectTable<()> = RenderObjectTable::new();
        let _ = table.destroy(RenderObjectId::new(5, 0));
    }

    #[test]
    #[should_panic(expected = "over live")]
    fn test_create_over_live_panics() {
        let mut table: RenderObjectTable<()> = RenderObjectTable::new();
        table.create(RenderObjectId::new(0, 0), None);
        table.create(RenderObjectId::new(0, 1), None);
    }
}
