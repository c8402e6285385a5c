use std::sync::Arc;

use async_stream::stream;
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, instrument, warn};

use crate::engine::EngineFactory;
use crate::error::{PlaybackError, Result};
use crate::events::{EventRelay, PlayerEvent};
use crate::player::Player;
use crate::registry::PlayerRegistry;
use crate::source::Source;
use crate::types::{PlayerId, SeekRequest, Volume};

/// Bridge entry point exposing the per-player command surface.
///
/// Owns the process-wide registry and the event relay; the platform bridge
/// supplies an [`EngineFactory`] so each created player gets its own native
/// engine. Commands are expected to be issued serially per player id; events
/// flow back asynchronously through [`events`](PlaybackService::events).
#[derive(Clone)]
pub struct PlaybackService {
    engines: Arc<dyn EngineFactory>,
    registry: PlayerRegistry,
    relay: EventRelay,
}

impl PlaybackService {
    /// Create a service backed by the given engine factory
    pub fn new(engines: Arc<dyn EngineFactory>) -> Self {
        Self {
            engines,
            registry: PlayerRegistry::new(),
            relay: EventRelay::default(),
        }
    }

    /// Create a new player under the given id.
    ///
    /// # Errors
    /// Returns [`PlaybackError::DuplicateId`] if the id is already in use.
    #[instrument(skip(self))]
    pub async fn create_player(&self, player_id: PlayerId) -> Result<Arc<Player>> {
        if self.registry.contains(&player_id).await {
            return Err(PlaybackError::DuplicateId(player_id));
        }

        let engine = self.engines.create_engine(&player_id);
        let player = Player::new(player_id, engine, self.relay.clone()).await;

        // Insert re-checks under the write lock; two concurrent creates for
        // the same id can both pass the early check.
        if let Err(err) = self.registry.insert(Arc::clone(&player)).await {
            warn!("Create failed: {err}");
            player.dispose().await;
            return Err(err);
        }

        Ok(player)
    }

    /// Look up a player by id.
    ///
    /// # Errors
    /// Returns [`PlaybackError::PlayerNotFound`] for ids never created or
    /// already disposed.
    pub async fn player(&self, player_id: &PlayerId) -> Result<Arc<Player>> {
        self.registry.get(player_id).await
    }

    /// Ids of all live players
    pub async fn players(&self) -> Vec<PlayerId> {
        self.registry.ids().await
    }

    /// Replace a player's source descriptor.
    ///
    /// # Errors
    /// Returns [`PlaybackError::PlayerNotFound`] if the id is unknown.
    pub async fn set_source(
        &self,
        player_id: &PlayerId,
        source: Source,
    ) -> Result<()> {
        self.player(player_id).await?.set_source(source).await;
        Ok(())
    }

    /// Resume playback.
    ///
    /// # Errors
    /// Returns [`PlaybackError::PlayerNotFound`] if the id is unknown.
    pub async fn play(&self, player_id: &PlayerId) -> Result<()> {
        self.player(player_id).await?.play().await;
        Ok(())
    }

    /// Pause playback.
    ///
    /// # Errors
    /// Returns [`PlaybackError::PlayerNotFound`] if the id is unknown.
    pub async fn pause(&self, player_id: &PlayerId) -> Result<()> {
        self.player(player_id).await?.pause().await;
        Ok(())
    }

    /// Set a player's volume.
    ///
    /// # Errors
    /// Returns [`PlaybackError::PlayerNotFound`] if the id is unknown.
    pub async fn set_volume(
        &self,
        player_id: &PlayerId,
        volume: Volume,
    ) -> Result<()> {
        self.player(player_id).await?.set_volume(volume).await;
        Ok(())
    }

    /// Enable or disable looping for a player.
    ///
    /// # Errors
    /// Returns [`PlaybackError::PlayerNotFound`] if the id is unknown.
    pub async fn set_loop(&self, player_id: &PlayerId, enabled: bool) -> Result<()> {
        self.player(player_id).await?.set_loop(enabled);
        Ok(())
    }

    /// Forward a seek request to a player.
    ///
    /// # Errors
    /// Returns [`PlaybackError::PlayerNotFound`] if the id is unknown.
    pub async fn seek(
        &self,
        player_id: &PlayerId,
        request: SeekRequest,
    ) -> Result<()> {
        self.player(player_id).await?.seek(request).await;
        Ok(())
    }

    /// Dispose a player and drop it from the registry.
    ///
    /// Idempotent: disposing an unknown or already disposed id is a no-op.
    /// Relays a terminal [`PlayerEvent::Disposed`] so per-player event
    /// streams can wind down.
    #[instrument(skip(self))]
    pub async fn dispose_player(&self, player_id: &PlayerId) {
        let Some(player) = self.registry.remove(player_id).await else {
            debug!("Dispose ignored, player not registered");
            return;
        };

        player.dispose().await;
        self.relay.relay(PlayerEvent::Disposed {
            player_id: player_id.clone(),
        });
    }

    /// Subscribe to events from all players
    pub fn events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.relay.subscribe()
    }

    /// Stream of events for one player.
    ///
    /// Events for other players are filtered out. The stream yields the
    /// player's terminal [`PlayerEvent::Disposed`] and then ends; it also
    /// ends if the relay closes. Lagged subscribers skip missed events and
    /// keep going.
    pub fn player_events(&self, player_id: PlayerId) -> impl Stream<Item = PlayerEvent> + Send {
        let mut events = self.relay.subscribe();

        stream! {
            loop {
                match events.recv().await {
                    Ok(event) if event.player_id() == &player_id => {
                        let disposed = matches!(event, PlayerEvent::Disposed { .. });
                        yield event;
                        if disposed {
                            break;
                        }
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(missed)) => {
                        warn!("Event stream for {player_id} lagged, missed {missed}");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }
}

impl std::fmt::Debug for PlaybackService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackService")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
