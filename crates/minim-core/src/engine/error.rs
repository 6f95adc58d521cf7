use crate::core::scene::{SceneError, StreamCreationError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MinimizationError {
    #[error("Failed to launch minimization engine '{program}': {source}", program = program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write engine input file '{path}': {source}", path = path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create run scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("Live update stream could not be created: {0}")]
    Stream(#[from] StreamCreationError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("Internal pipeline error: {0}")]
    Internal(String),
}
