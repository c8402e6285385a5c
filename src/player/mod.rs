mod monitoring;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::Stream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::engine::{EngineNotification, PlayerEngine};
use crate::error::{PlaybackError, Result};
use crate::events::{EventRelay, PlayerEvent};
use crate::observers::{ObserverCategory, ObserverSet};
use crate::property::Property;
use crate::source::Source;
use crate::types::{PlayerId, SeekRequest, Volume};
use crate::view::RenderLayer;

use monitoring::PlayerMonitor;

/// Per-id playback shim wrapping one native engine.
///
/// Owns the engine reference and the current source descriptor, tracks
/// observer registrations, and relays engine notifications to the host as
/// [`PlayerEvent`]s. All lifecycle operations become silent no-ops once the
/// player is disposed.
pub struct Player {
    id: PlayerId,
    engine: Mutex<Option<Arc<dyn PlayerEngine>>>,
    source: Mutex<Option<Source>>,
    volume: Property<Volume>,
    loop_enabled: Property<bool>,
    paused: Property<bool>,
    disposed: AtomicBool,
    observers: Mutex<ObserverSet>,
    relay: EventRelay,
    monitor: Mutex<Option<JoinHandle<()>>>,
}

impl Player {
    /// Create a shim around a freshly constructed engine and start its
    /// notification pump.
    pub(crate) async fn new(
        id: PlayerId,
        engine: Arc<dyn PlayerEngine>,
        relay: EventRelay,
    ) -> Arc<Self> {
        let notifications = engine.notifications();

        let mut observers = ObserverSet::default();
        observers.register(ObserverCategory::Handle);

        let player = Arc::new(Self {
            id,
            engine: Mutex::new(Some(engine)),
            source: Mutex::new(None),
            volume: Property::new(Volume::new(1.0)),
            loop_enabled: Property::new(false),
            paused: Property::new(true),
            disposed: AtomicBool::new(false),
            observers: Mutex::new(observers),
            relay,
            monitor: Mutex::new(None),
        });

        let pump = PlayerMonitor::start(&player, notifications);
        *player.monitor.lock().await = Some(pump);

        player
    }

    /// Unique id assigned at creation
    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    /// Whether this player has been disposed
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Whether the player is currently paused
    pub fn paused(&self) -> bool {
        self.paused.get()
    }

    /// Watch the paused state, starting from the current value
    pub fn watch_paused(&self) -> impl Stream<Item = bool> + Send {
        self.paused.watch()
    }

    /// Whether looping is enabled
    pub fn loop_enabled(&self) -> bool {
        self.loop_enabled.get()
    }

    /// Current volume
    pub fn volume(&self) -> Volume {
        self.volume.get()
    }

    /// Current source descriptor, if one was set
    pub async fn current_source(&self) -> Option<Source> {
        self.source.lock().await.clone()
    }

    /// Whether a given observer category is currently registered
    pub async fn is_observer_registered(&self, category: ObserverCategory) -> bool {
        self.observers.lock().await.is_registered(category)
    }

    /// Whether any observer category is currently registered
    pub async fn observers_active(&self) -> bool {
        self.observers.lock().await.any_registered()
    }

    /// Non-owning handle to this player's render layer, for view attachment.
    ///
    /// # Errors
    /// Returns [`PlaybackError::Disposed`] once the player has been disposed.
    pub async fn render_layer(&self) -> Result<RenderLayer> {
        let engine = self.engine.lock().await;
        match engine.as_ref() {
            Some(engine) if !self.is_disposed() => {
                Ok(RenderLayer::new(self.id.clone(), Arc::downgrade(engine)))
            }
            _ => Err(PlaybackError::Disposed(self.id.clone())),
        }
    }

    async fn engine(&self) -> Option<Arc<dyn PlayerEngine>> {
        if self.is_disposed() {
            return None;
        }
        self.engine.lock().await.clone()
    }

    /// Replace the current source and re-issue the engine load.
    ///
    /// New sources start paused unless the descriptor asks for autoplay.
    /// Malformed descriptors are logged and ignored, mirroring the
    /// permissive native behavior.
    #[instrument(skip(self, source), fields(player_id = %self.id))]
    pub async fn set_source(&self, source: Source) {
        let Some(engine) = self.engine().await else {
            debug!("set_source ignored, player disposed");
            return;
        };

        if !source.is_valid() {
            warn!("Ignoring malformed source descriptor");
            return;
        }

        {
            let mut observers = self.observers.lock().await;
            if !observers.is_registered(ObserverCategory::Item) {
                observers.register(ObserverCategory::Item);
            }
        }

        engine.load(&source).await;

        if let Some(volume) = source.volume {
            self.volume.set(volume);
            engine.set_volume(volume).await;
        }

        if source.autoplay {
            self.paused.set(false);
            engine.play().await;
        } else {
            self.paused.set(true);
            engine.pause().await;
        }

        *self.source.lock().await = Some(source);
    }

    /// Resume playback
    #[instrument(skip(self), fields(player_id = %self.id))]
    pub async fn play(&self) {
        let Some(engine) = self.engine().await else {
            debug!("play ignored, player disposed");
            return;
        };

        self.paused.set(false);
        engine.play().await;
    }

    /// Pause playback
    #[instrument(skip(self), fields(player_id = %self.id))]
    pub async fn pause(&self) {
        let Some(engine) = self.engine().await else {
            debug!("pause ignored, player disposed");
            return;
        };

        self.paused.set(true);
        engine.pause().await;
    }

    /// Set the playback volume, clamped to `[0.0, 1.0]`
    #[instrument(skip(self), fields(player_id = %self.id))]
    pub async fn set_volume(&self, volume: impl Into<Volume> + std::fmt::Debug) {
        let Some(engine) = self.engine().await else {
            debug!("set_volume ignored, player disposed");
            return;
        };

        let volume = volume.into();
        self.volume.set(volume);
        engine.set_volume(volume).await;
    }

    /// Enable or disable looping.
    ///
    /// Takes effect at the next end-of-media notification, not retroactively.
    pub fn set_loop(&self, enabled: bool) {
        if self.is_disposed() {
            debug!(player_id = %self.id, "set_loop ignored, player disposed");
            return;
        }
        self.loop_enabled.set(enabled);
    }

    /// Forward a seek request to the engine.
    ///
    /// No queuing: overlapping seeks are coalesced or superseded by the
    /// engine itself.
    #[instrument(skip(self), fields(player_id = %self.id))]
    pub async fn seek(&self, request: SeekRequest) {
        let Some(engine) = self.engine().await else {
            debug!("seek ignored, player disposed");
            return;
        };

        engine.seek(request).await;
    }

    /// Tear the player down: stop the notification pump, release the
    /// engine, and unregister every active observer category exactly once.
    ///
    /// Idempotent: a second call is a no-op. Safe to call while engine
    /// notifications are in flight; their results are ignored afterwards.
    #[instrument(skip(self), fields(player_id = %self.id))]
    pub async fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            debug!("dispose ignored, already disposed");
            return;
        }

        if let Some(pump) = self.monitor.lock().await.take() {
            pump.abort();
        }

        if let Some(engine) = self.engine.lock().await.take() {
            engine.pause().await;
            engine.clear().await;
        }

        let cleared = self.observers.lock().await.clear();
        debug!(?cleared, "Unregistered observer categories");

        *self.source.lock().await = None;
        self.paused.set(false);
        self.loop_enabled.set(false);
    }

    /// Translate one engine notification into host events and state updates.
    ///
    /// Called only by the notification pump. Notifications arriving after
    /// dispose are dropped.
    pub(crate) async fn handle_notification(&self, notification: EngineNotification) {
        if self.is_disposed() {
            debug!(player_id = %self.id, "Dropping notification after dispose");
            return;
        }

        match notification {
            EngineNotification::Loaded { duration, position } => {
                let mut observers = self.observers.lock().await;
                if !observers.is_registered(ObserverCategory::Notification) {
                    observers.register(ObserverCategory::Notification);
                }
                drop(observers);

                self.relay.relay(PlayerEvent::Load {
                    player_id: self.id.clone(),
                    duration,
                    position,
                });
            }
            EngineNotification::RateChanged { rate } => {
                if rate > 0.0 {
                    self.paused.set(false);
                    self.relay.relay(PlayerEvent::Play {
                        player_id: self.id.clone(),
                    });
                } else {
                    self.paused.set(true);
                    self.relay.relay(PlayerEvent::Pause {
                        player_id: self.id.clone(),
                    });
                }
            }
            EngineNotification::Progress { position, duration } => {
                self.relay.relay(PlayerEvent::Progress {
                    player_id: self.id.clone(),
                    position,
                    duration,
                });
            }
            EngineNotification::EndOfMedia => self.handle_end_of_media().await,
            EngineNotification::Failed { code, message } => {
                self.relay.relay(PlayerEvent::Error {
                    player_id: self.id.clone(),
                    code,
                    message,
                });
            }
            EngineNotification::Buffering { progress } => {
                self.relay.relay(PlayerEvent::Buffering {
                    player_id: self.id.clone(),
                    progress,
                });
            }
            EngineNotification::Stalled => {
                self.relay.relay(PlayerEvent::Stalled {
                    player_id: self.id.clone(),
                });
            }
            EngineNotification::SeekCompleted { position, target } => {
                self.relay.relay(PlayerEvent::Seek {
                    player_id: self.id.clone(),
                    position,
                    target,
                });
            }
            EngineNotification::TimedMetadata => {
                self.relay.relay(PlayerEvent::TimedMetadata {
                    player_id: self.id.clone(),
                });
            }
            EngineNotification::RouteChanged => {
                self.relay.relay(PlayerEvent::BecameNoisy {
                    player_id: self.id.clone(),
                });
            }
        }
    }

    /// Loop enabled: rewind and resume, reporting a restart. Loop disabled:
    /// playback terminates paused at the end.
    async fn handle_end_of_media(&self) {
        if self.loop_enabled.get() {
            if let Some(engine) = self.engine().await {
                engine.seek(SeekRequest::to(Duration::ZERO)).await;
                engine.play().await;
            }
            self.relay.relay(PlayerEvent::Restarted {
                player_id: self.id.clone(),
            });
        } else {
            self.paused.set(true);
            if let Some(engine) = self.engine().await {
                engine.pause().await;
            }
            self.relay.relay(PlayerEvent::End {
                player_id: self.id.clone(),
            });
        }
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("paused", &self.paused.get())
            .field("loop_enabled", &self.loop_enabled.get())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
