//! Geometry descriptors consumed by the render thread.
//!
//! A descriptor is moved into a creation command and dropped as soon as the
//! render thread has built its GPU resource from it.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Mesh vertex: position + color.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Linear RGBA color.
    pub color: [f32; 4],
}

impl Vertex {
    /// Creates a vertex.
    #[must_use]
    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

/// Shapes a backend may know how to build without vertex data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalShape {
    /// Unit cube centered on the origin.
    Cube,
    /// Unit quad in the XY plane.
    Quad,
}

/// Immutable description of something to draw.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GeometryDescriptor {
    /// A shape identified by tag only.
    Shape(CanonicalShape),
    /// Explicit indexed triangle list.
    Mesh {
        /// Vertex data.
        vertices: Vec<Vertex>,
        /// Triangle list indices into `vertices`.
        indices: Vec<u32>,
    },
}

impl GeometryDescriptor {
    /// Number of vertices carried by this descriptor (0 for tagged shapes).
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        match self {
            Self::Shape(_) => 0,
            Self::Mesh { vertices, .. } => vertices.len(),
        }
    }

    /// Number of indices carried by this descriptor (0 for tagged shapes).
    #[must_use]
    pub fn index_count(&self) -> usize {
        match self {
            Self::Shape(_) => 0,
            Self::Mesh { indices, .. } => indices.len(),
        }
    }

    /// Checks that a mesh is a non-empty triangle list with in-range indices.
    ///
    /// Tagged shapes are always valid.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        match self {
            Self::Shape(_) => true,
            Self::Mesh { vertices, indices } => {
                !indices.is_empty()
                    && indices.len() % 3 == 0
                    && indices.iter().all(|&i| (i as usize) < vertices.len())
            }
        }
    }
}

/// Built-in meshes.
pub struct DefaultGeometry;

impl DefaultGeometry {
    /// Unit cube (edge length 1) as an explicit mesh, one color per corner.
    #[must_use]
    pub fn cube() -> GeometryDescriptor {
        const H: f32 = 0.5;
        let corners: [[f32; 3]; 8] = [
            [-H, -H, -H],
            [-H, H, -H],
            [H, H, -H],
            [H, -H, -H],
            [-H, -H, H],
            [-H, H, H],
            [H, H, H],
            [H, -H, H],
        ];
        let vertices = corners
            .iter()
            .map(|&p| Vertex::new(p, [p[0] + H, p[1] + H, p[2] + H, 1.0]))
            .collect();

        #[rustfmt::skip]
        let indices = vec![
            // front
            0, 1, 2, 0, 2, 3,
            // back
            4, 6, 5, 4, 7, 6,
            // left
            4, 5, 1, 4, 1, 0,
            // right
            3, 2, 6, 3, 6, 7,
            // top
            1, 5, 6, 1, 6, 2,
            // bottom
            4, 0, 3, 4, 3, 7,
        ];

        GeometryDescriptor::Mesh { vertices, indices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cube() {
        let cube = DefaultGeometry::cube();
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.index_count(), 36);
        assert!(cube.is_well_formed());
    }

    #[test]
    fn test_malformed_mesh() {
        let mesh = GeometryDescriptor::Mesh {
            vertices: vec![Vertex::default(); 3],
            indices: vec![0, 1, 3],
        };
        assert!(!mesh.is_well_formed());
        assert!(GeometryDescriptor::Shape(CanonicalShape::Quad).is_well_formed());
    }
}
