use thiserror::Error;

use crate::types::PlayerId;

/// Errors that can occur during playback bridge operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// A player with the given ID already exists in the registry
    #[error("Player {0:?} already exists")]
    DuplicateId(PlayerId),

    /// Player with the given ID was not found
    #[error("Player {0:?} not found")]
    PlayerNotFound(PlayerId),

    /// The player has been disposed and no longer owns an engine
    #[error("Player {0:?} is disposed")]
    Disposed(PlayerId),

    /// The player is not in a state where it can be attached to a view
    #[error("Player {0:?} is not ready")]
    NotReady(PlayerId),
}

/// Convenience alias for bridge operation results
pub type Result<T> = std::result::Result<T, PlaybackError>;
