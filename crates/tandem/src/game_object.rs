//! # Game Objects
//!
//! Simulation-side entities. Each owns an authoritative position and the
//! handle of the render object that draws it. Moving one writes the new
//! transform into the current frame slot; the render thread sees it once the
//! frame is published.

use tandem_core::{FrameToken, RenderObjectId};
use tandem_rendering::RenderThread;
use tandem_shared::{GeometryDescriptor, Transform, Vec3};

/// Stable index of a game object in its [`GameObjects`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameObjectId(pub u32);

/// One simulated entity with a render-thread counterpart.
#[derive(Debug, Clone, PartialEq)]
pub struct GameObject {
    position: Vec3,
    render_object: RenderObjectId,
}

impl GameObject {
    /// Authoritative position.
    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Handle of the render object drawing this entity.
    #[inline]
    #[must_use]
    pub fn render_object(&self) -> RenderObjectId {
        self.render_object
    }
}

/// Arena of game objects in spawn order.
#[derive(Debug, Default)]
pub struct GameObjects {
    objects: Vec<GameObject>,
}

impl GameObjects {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns an object at `position` and queues its render object.
    ///
    /// The render handle is valid immediately. Initial placement is sent as an
    /// immediate transform so the object shows up in the right place even
    /// before its first frame write.
    pub fn spawn(&mut self, geometry: GeometryDescriptor, position: Vec3, render: &mut RenderThread) -> GameObjectId {
        let render_object = render.create_render_object(geometry);
        render.update_transform(render_object, Transform::from_position(position));

        let id = GameObjectId(self.objects.len() as u32);
        self.objects.push(GameObject { position, render_object });
        id
    }

    /// Object by id.
    #[must_use]
    pub fn get(&self, id: GameObjectId) -> Option<&GameObject> {
        self.objects.get(id.0 as usize)
    }

    /// Sets the authoritative position and records it in writable frame
    /// `frame`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was never spawned or `frame` is not the writable frame.
    pub fn set_position(&mut self, id: GameObjectId, position: Vec3, frame: FrameToken, render: &RenderThread) {
        let object = self
            .objects
            .get_mut(id.0 as usize)
            .unwrap_or_else(|| panic!("unknown game object {id:?}"));
        object.position = position;
        render.set_transform(object.render_object, Transform::from_position(position), frame);
    }

    /// Objects with their ids, in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = (GameObjectId, &GameObject)> + '_ {
        self.objects
            .iter()
            .enumerate()
            .map(|(index, object)| (GameObjectId(index as u32), object))
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Removes every object and queues destruction of its render object.
    pub fn despawn_all(&mut self, render: &mut RenderThread) {
        for object in self.objects.drain(..) {
            render.destroy_render_object(object.render_object);
        }
    }
}
