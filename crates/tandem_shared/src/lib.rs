//! # TANDEM Shared
//!
//! Value types handed from the simulation thread to the render thread.
//!
//! Nothing in this crate knows about threads. A [`Transform`] written by the
//! simulation is copied into a frame slot; a [`GeometryDescriptor`] rides
//! inside a creation command and is consumed once by the render thread.

#![deny(unsafe_code)]

pub mod constants;
pub mod geometry;
pub mod math;

pub use constants::{
    DEFAULT_CAMERA_SPEED, DEFAULT_COMMAND_CAPACITY, DEFAULT_FRAMES_IN_FLIGHT, MAX_COMMAND_CAPACITY, MAX_DELTA_TIME,
    MAX_FRAMES_IN_FLIGHT,
};
pub use geometry::{CanonicalShape, DefaultGeometry, GeometryDescriptor, Vertex};
pub use math::{Quaternion, Transform, Vec3, ViewState};
