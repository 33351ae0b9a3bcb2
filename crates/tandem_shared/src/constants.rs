//! Tuning constants shared by configuration defaults.

/// Frames the simulation may run ahead of the render thread.
///
/// With 2 frames in flight the store holds 3 slots (triple buffering).
pub const DEFAULT_FRAMES_IN_FLIGHT: usize = 2;

/// Command queue capacity. Sized so steady-state ticks never block on it.
pub const DEFAULT_COMMAND_CAPACITY: usize = 4096;

/// Camera speed in world units per second.
pub const DEFAULT_CAMERA_SPEED: f32 = 2.0;

/// Upper bound on a single tick's delta time, in seconds.
///
/// Prevents a giant step after the process was paused in a debugger.
pub const MAX_DELTA_TIME: f32 = 0.1;

/// Largest accepted frame depth. Each frame in flight costs one slot.
pub const MAX_FRAMES_IN_FLIGHT: usize = 8;

/// Largest accepted command queue capacity.
pub const MAX_COMMAND_CAPACITY: usize = 1 << 20;
