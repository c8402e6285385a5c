use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::types::PlayerId;

/// Events relayed to the host runtime.
///
/// Events are relayed in the order the engine emits its notifications; no
/// further ordering or delivery guarantee is made.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// A media item finished loading and is ready to play
    Load {
        /// Player that loaded the item
        player_id: PlayerId,
        /// Total media duration
        duration: Duration,
        /// Position at load time
        position: Duration,
    },

    /// Periodic playback position update
    Progress {
        /// Player reporting progress
        player_id: PlayerId,
        /// Current position
        position: Duration,
        /// Total media duration
        duration: Duration,
    },

    /// Playback started or resumed
    Play {
        /// Player that started playing
        player_id: PlayerId,
    },

    /// Playback paused
    Pause {
        /// Player that paused
        player_id: PlayerId,
    },

    /// The media played to its end and playback terminated
    End {
        /// Player that reached the end
        player_id: PlayerId,
    },

    /// The media played to its end and restarted because looping is on
    Restarted {
        /// Player that restarted
        player_id: PlayerId,
    },

    /// The engine reported a failure
    Error {
        /// Player the failure belongs to
        player_id: PlayerId,
        /// Engine-defined error code
        code: i64,
        /// Human-readable error description
        message: String,
    },

    /// Buffering state or progress changed
    Buffering {
        /// Player that is buffering
        player_id: PlayerId,
        /// Buffered position in seconds when known
        progress: Option<f64>,
    },

    /// Playback stalled waiting for data
    Stalled {
        /// Player that stalled
        player_id: PlayerId,
    },

    /// A seek completed
    Seek {
        /// Player that finished seeking
        player_id: PlayerId,
        /// Position after the seek
        position: Duration,
        /// Position the seek targeted
        target: Duration,
    },

    /// Timed metadata embedded in the stream changed
    TimedMetadata {
        /// Player whose stream carried the metadata
        player_id: PlayerId,
    },

    /// Audio output became unavailable (headphones unplugged, route override)
    BecameNoisy {
        /// Player affected by the route change
        player_id: PlayerId,
    },

    /// The player was disposed; terminal, no further events follow for this id
    Disposed {
        /// Player that was disposed
        player_id: PlayerId,
    },
}

impl PlayerEvent {
    /// The player this event belongs to
    pub fn player_id(&self) -> &PlayerId {
        match self {
            Self::Load { player_id, .. }
            | Self::Progress { player_id, .. }
            | Self::Play { player_id }
            | Self::Pause { player_id }
            | Self::End { player_id }
            | Self::Restarted { player_id }
            | Self::Error { player_id, .. }
            | Self::Buffering { player_id, .. }
            | Self::Stalled { player_id }
            | Self::Seek { player_id, .. }
            | Self::TimedMetadata { player_id }
            | Self::BecameNoisy { player_id }
            | Self::Disposed { player_id } => player_id,
        }
    }
}

/// Fan-out channel carrying player events to the host runtime.
///
/// Relaying never blocks and tolerates having no subscribers; slow
/// subscribers observe lag through the broadcast channel semantics.
#[derive(Clone)]
pub struct EventRelay {
    tx: Arc<broadcast::Sender<PlayerEvent>>,
}

impl EventRelay {
    /// Create a relay with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx: Arc::new(tx) }
    }

    /// Forward an event to all current subscribers
    pub fn relay(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }

    /// Subscribe to all player events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventRelay {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl std::fmt::Debug for EventRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRelay")
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}
