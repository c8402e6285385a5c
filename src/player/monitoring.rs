use std::sync::{Arc, Weak};

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::engine::EngineNotification;
use crate::types::PlayerId;

use super::Player;

/// Pumps engine notifications into the player shim.
///
/// Holds only a weak reference; the pump exits when the player is dropped,
/// disposed, or the engine closes its notification channel.
pub(crate) struct PlayerMonitor;

impl PlayerMonitor {
    pub(crate) fn start(
        player: &Arc<Player>,
        notifications: broadcast::Receiver<EngineNotification>,
    ) -> JoinHandle<()> {
        let player_id = player.id().clone();
        let weak = Arc::downgrade(player);

        tokio::spawn(async move {
            Self::pump(player_id, weak, notifications).await;
        })
    }

    async fn pump(
        player_id: PlayerId,
        player: Weak<Player>,
        mut notifications: broadcast::Receiver<EngineNotification>,
    ) {
        debug!("Starting notification pump for player {player_id}");

        loop {
            match notifications.recv().await {
                Ok(notification) => {
                    let Some(player) = player.upgrade() else {
                        debug!("Player {player_id} dropped, stopping pump");
                        break;
                    };

                    if player.is_disposed() {
                        debug!("Player {player_id} disposed, stopping pump");
                        break;
                    }

                    player.handle_notification(notification).await;
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!("Notification pump for {player_id} lagged, missed {missed}");
                }
                Err(RecvError::Closed) => break,
            }
        }

        debug!("Notification pump ended for player {player_id}");
    }
}
