use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{PlaybackError, Result};
use crate::player::Player;
use crate::types::PlayerId;

/// Process-wide mapping from player id to its shim.
///
/// The registry exclusively owns each player; everything else holds either
/// the `Arc` it hands out or a weak render-layer reference. Create/remove
/// are mutually exclusive under the lock, so concurrent creates cannot race
/// a duplicate id in.
#[derive(Clone, Default)]
pub struct PlayerRegistry {
    players: Arc<RwLock<HashMap<PlayerId, Arc<Player>>>>,
}

impl PlayerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly created player.
    ///
    /// # Errors
    /// Returns [`PlaybackError::DuplicateId`] if the id is already present.
    pub async fn insert(&self, player: Arc<Player>) -> Result<()> {
        let mut players = self.players.write().await;
        if players.contains_key(player.id()) {
            return Err(PlaybackError::DuplicateId(player.id().clone()));
        }

        debug!("Registering player {}", player.id());
        players.insert(player.id().clone(), player);
        Ok(())
    }

    /// Look up a player by id.
    ///
    /// # Errors
    /// Returns [`PlaybackError::PlayerNotFound`] for ids never created or
    /// already removed.
    pub async fn get(&self, player_id: &PlayerId) -> Result<Arc<Player>> {
        let players = self.players.read().await;
        players
            .get(player_id)
            .cloned()
            .ok_or_else(|| PlaybackError::PlayerNotFound(player_id.clone()))
    }

    /// Remove a player, returning it if it was present.
    ///
    /// Idempotent: removing an absent id is a no-op, which keeps double
    /// dispose safe.
    pub async fn remove(&self, player_id: &PlayerId) -> Option<Arc<Player>> {
        let mut players = self.players.write().await;
        let removed = players.remove(player_id);
        if removed.is_some() {
            debug!("Removed player {player_id}");
        }
        removed
    }

    /// Whether a player id is currently registered
    pub async fn contains(&self, player_id: &PlayerId) -> bool {
        self.players.read().await.contains_key(player_id)
    }

    /// Snapshot of all registered player ids
    pub async fn ids(&self) -> Vec<PlayerId> {
        self.players.read().await.keys().cloned().collect()
    }
}

impl std::fmt::Debug for PlayerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerRegistry").finish_non_exhaustive()
    }
}
