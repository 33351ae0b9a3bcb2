//! # TANDEM
//!
//! A simulation loop driving a dedicated render thread.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────── simulation thread ────────────────┐   ┌──── render thread ────┐
//! │                                                   │   │                       │
//! │  Game ──> GameObjects ──> RenderThread handle ────┼──>│  RenderWorker         │
//! │   │                        │   │                  │   │   ├─ object table     │
//! │   ├─ GameTimer             │   └─ FrameSlotStore <┼───┼── ├─ read / retire    │
//! │   ├─ Camera                │                      │   │   └─ RenderBackend    │
//! │   └─ InputSource           └─ command queue ──────┼──>│                       │
//! └───────────────────────────────────────────────────┘   └───────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `game`: Tick orchestration
//! - `game_object`: Simulated entities with render handles
//! - `camera`, `input`, `timer`: Per-tick inputs to the simulation
//! - `config`: TOML configuration

#![deny(unsafe_code)]

pub mod camera;
pub mod config;
pub mod error;
pub mod game;
pub mod game_object;
pub mod input;
pub mod timer;

// Re-export the layers
pub use tandem_core as core;
pub use tandem_rendering as rendering;
pub use tandem_shared as shared;

pub use camera::Camera;
pub use config::{ConfigError, ConfigResult, ControlConfig, GameConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
pub use error::{GameError, GameResult};
pub use game::{Game, SHOWCASE_OBJECTS, SHOWCASE_SPEED};
pub use game_object::{GameObject, GameObjectId, GameObjects};
pub use input::{InputSource, Key, NoInput, ScriptedInput};
pub use timer::GameTimer;
