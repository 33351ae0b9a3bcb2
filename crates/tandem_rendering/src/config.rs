//! Render thread configuration.

use serde::{Deserialize, Serialize};
use tandem_shared::{DEFAULT_COMMAND_CAPACITY, DEFAULT_FRAMES_IN_FLIGHT};

/// Construction-time knobs for [`RenderThread`](crate::RenderThread).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Published frames the simulation may run ahead before blocking.
    pub frames_in_flight: usize,
    /// Command queue capacity.
    pub command_capacity: usize,
    /// OS thread name.
    pub thread_name: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frames_in_flight: DEFAULT_FRAMES_IN_FLIGHT,
            command_capacity: DEFAULT_COMMAND_CAPACITY,
            thread_name: "tandem-render".to_owned(),
        }
    }
}
