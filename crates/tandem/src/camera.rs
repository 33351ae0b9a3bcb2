//! Simulation-side camera.
//!
//! The render thread never reads this directly; the game publishes a
//! [`ViewState`] copy into each frame.

use tandem_shared::{Vec3, ViewState};

/// Free-flying camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    position: Vec3,
    forward: Vec3,
}

impl Default for Camera {
    /// Above and behind the origin, looking down at it.
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 6.0, -6.0), Vec3::new(0.0, -6.0, 6.0))
    }
}

impl Camera {
    /// Creates a camera at `position` looking along `view_dir` (normalized here).
    #[must_use]
    pub fn new(position: Vec3, view_dir: Vec3) -> Self {
        Self {
            position,
            forward: view_dir.normalized(),
        }
    }

    /// World position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Normalized view direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Moves the camera.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// `forward × world up`, normalized.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.forward.cross(Vec3::Y).normalized()
    }

    /// `right × forward`.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward)
    }

    /// Moves by `velocity` expressed in camera space: x along right, y along
    /// forward, z along up.
    pub fn translate_local(&mut self, velocity: Vec3) {
        let offset = self.right() * velocity.x + self.forward * velocity.y + self.up() * velocity.z;
        self.position += offset;
    }

    /// Copy handed to the render thread.
    #[must_use]
    pub fn view_state(&self) -> ViewState {
        ViewState {
            eye: self.position,
            forward: self.forward,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1e-5
    }

    #[test]
    fn test_default_placement() {
        let camera = Camera::default();
        assert_eq!(camera.position(), Vec3::new(0.0, 6.0, -6.0));
        assert!((camera.forward().length() - 1.0).abs() < 1e-6);
        assert!(close(camera.forward(), Vec3::new(0.0, -1.0, 1.0).normalized()));
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let camera = Camera::default();
        let (right, up, forward) = (camera.right(), camera.up(), camera.forward());
        assert!(right.dot(forward).abs() < 1e-6);
        assert!(up.dot(forward).abs() < 1e-6);
        assert!(right.dot(up).abs() < 1e-6);
        assert!((up.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_translate_forward() {
        let mut camera = Camera::default();
        let start = camera.position();
        camera.translate_local(Vec3::new(0.0, 2.0, 0.0));
        assert!(close(camera.position(), start + camera.forward() * 2.0));
    }
}
