//! # Game Error Types

use thiserror::Error;

use tandem_rendering::RenderError;

use crate::config::ConfigError;

/// Failures while setting up or tearing down the game.
#[derive(Error, Debug)]
pub enum GameError {
    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The render thread failed to start or stop.
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
