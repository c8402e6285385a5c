use std::sync::{Arc, Weak};

use tokio::sync::Mutex;

use crate::engine::PlayerEngine;
use crate::error::{PlaybackError, Result};
use crate::player::Player;
use crate::types::PlayerId;

/// Non-owning handle to a player's render surface.
///
/// Holds a weak engine reference, so an attached layer never extends the
/// player's lifetime; once the player is disposed the layer goes dark.
#[derive(Clone)]
pub struct RenderLayer {
    player_id: PlayerId,
    engine: Weak<dyn PlayerEngine>,
}

impl RenderLayer {
    pub(crate) fn new(player_id: PlayerId, engine: Weak<dyn PlayerEngine>) -> Self {
        Self { player_id, engine }
    }

    /// Player this layer renders for
    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    /// Upgrade to the engine if it is still alive
    pub fn engine(&self) -> Option<Arc<dyn PlayerEngine>> {
        self.engine.upgrade()
    }

    /// Whether the underlying engine is still alive
    pub fn is_live(&self) -> bool {
        self.engine.strong_count() > 0
    }
}

impl std::fmt::Debug for RenderLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderLayer")
            .field("player_id", &self.player_id)
            .field("live", &self.is_live())
            .finish()
    }
}

/// Display-surface binding installing a player's render layer into a view.
///
/// The binding's lifetime is independent of the player: attaching stores a
/// weak layer reference only, and detaching never touches the player.
#[derive(Debug, Default)]
pub struct ViewBinding {
    layer: Mutex<Option<RenderLayer>>,
}

impl ViewBinding {
    /// Create an unattached binding
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the player's render layer into this view.
    ///
    /// Replaces any previously attached layer.
    ///
    /// # Errors
    /// Returns [`PlaybackError::NotReady`] if the player is disposed.
    pub async fn attach(&self, player: &Player) -> Result<()> {
        let layer = player
            .render_layer()
            .await
            .map_err(|_| PlaybackError::NotReady(player.id().clone()))?;

        *self.layer.lock().await = Some(layer);
        Ok(())
    }

    /// Remove the render layer reference. Idempotent; the player itself is
    /// untouched.
    pub async fn detach(&self) {
        *self.layer.lock().await = None;
    }

    /// Currently attached layer, if any
    pub async fn layer(&self) -> Option<RenderLayer> {
        self.layer.lock().await.clone()
    }

    /// Whether a layer is currently attached
    pub async fn is_attached(&self) -> bool {
        self.layer.lock().await.is_some()
    }
}
