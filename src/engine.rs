use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::source::Source;
use crate::types::{PlayerId, SeekRequest, Volume};

/// State-change notifications emitted by the engine's observer callbacks.
///
/// These arrive asynchronously and may interleave with commands; the shim
/// translates them into [`PlayerEvent`](crate::events::PlayerEvent)s.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineNotification {
    /// The current item became ready to play
    Loaded {
        /// Total media duration
        duration: Duration,
        /// Position at load time
        position: Duration,
    },

    /// Playback rate changed (0.0 paused, > 0.0 playing)
    RateChanged {
        /// New playback rate
        rate: f64,
    },

    /// Periodic playback position update
    Progress {
        /// Current position
        position: Duration,
        /// Total media duration
        duration: Duration,
    },

    /// The current item played to its end
    EndOfMedia,

    /// The current item failed to load or play
    Failed {
        /// Engine-defined error code
        code: i64,
        /// Human-readable error description
        message: String,
    },

    /// Buffering state or progress changed
    Buffering {
        /// Buffered position in seconds when known
        progress: Option<f64>,
    },

    /// Playback stalled waiting for data
    Stalled,

    /// A previously issued seek completed
    SeekCompleted {
        /// Position after the seek
        position: Duration,
        /// Position the seek targeted
        target: Duration,
    },

    /// Timed metadata embedded in the stream changed
    TimedMetadata,

    /// The audio output route changed away from the current device
    RouteChanged,
}

/// Opaque native media engine owning decode, render, and buffering.
///
/// One engine per player. Commands are fire-and-forget from the shim's
/// perspective: engine failures are reported asynchronously through
/// [`notifications`](PlayerEngine::notifications), never as command errors.
#[async_trait]
pub trait PlayerEngine: Send + Sync {
    /// Load (or replace) the current media item from a source descriptor
    async fn load(&self, source: &Source);

    /// Resume playback
    async fn play(&self);

    /// Pause playback
    async fn pause(&self);

    /// Set the playback volume
    async fn set_volume(&self, volume: Volume);

    /// Seek towards a target position
    async fn seek(&self, request: SeekRequest);

    /// Drop the current media item and stop playback
    async fn clear(&self);

    /// Subscribe to the engine's state-change notifications
    fn notifications(&self) -> broadcast::Receiver<EngineNotification>;
}

/// Constructs one engine per player id.
///
/// The platform bridge supplies the real engine; tests supply mocks.
pub trait EngineFactory: Send + Sync {
    /// Create a fresh engine for the given player
    fn create_engine(&self, player_id: &PlayerId) -> Arc<dyn PlayerEngine>;
}
