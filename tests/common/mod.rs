//! Shared mock engine for integration tests.

#![allow(clippy::unwrap_used)]
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;

use playback::{
    EngineFactory, EngineNotification, PlayerEngine, PlayerId, SeekRequest, Source, Volume,
};

/// Commands a player shim issued against its engine, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    Load(Source),
    Play,
    Pause,
    SetVolume(Volume),
    Seek(SeekRequest),
    Clear,
}

/// In-memory engine recording commands and injecting notifications.
pub struct MockEngine {
    commands: Mutex<Vec<EngineCommand>>,
    notifications: broadcast::Sender<EngineNotification>,
}

impl MockEngine {
    pub fn new() -> Arc<Self> {
        let (notifications, _) = broadcast::channel(64);
        Arc::new(Self {
            commands: Mutex::new(Vec::new()),
            notifications,
        })
    }

    /// Simulate a native engine callback.
    pub fn notify(&self, notification: EngineNotification) {
        let _ = self.notifications.send(notification);
    }

    /// Snapshot of every command issued so far.
    pub fn commands(&self) -> Vec<EngineCommand> {
        self.commands.lock().unwrap().clone()
    }

    fn record(&self, command: EngineCommand) {
        self.commands.lock().unwrap().push(command);
    }
}

#[async_trait]
impl PlayerEngine for MockEngine {
    async fn load(&self, source: &Source) {
        self.record(EngineCommand::Load(source.clone()));
    }

    async fn play(&self) {
        self.record(EngineCommand::Play);
    }

    async fn pause(&self) {
        self.record(EngineCommand::Pause);
    }

    async fn set_volume(&self, volume: Volume) {
        self.record(EngineCommand::SetVolume(volume));
    }

    async fn seek(&self, request: SeekRequest) {
        self.record(EngineCommand::Seek(request));
    }

    async fn clear(&self) {
        self.record(EngineCommand::Clear);
    }

    fn notifications(&self) -> broadcast::Receiver<EngineNotification> {
        self.notifications.subscribe()
    }
}

/// Factory handing out one mock engine per player id and keeping a handle
/// to each for later inspection.
#[derive(Default)]
pub struct MockEngineFactory {
    engines: Mutex<HashMap<PlayerId, Arc<MockEngine>>>,
}

impl MockEngineFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The engine created for a given player, if any.
    pub fn engine(&self, player_id: &PlayerId) -> Option<Arc<MockEngine>> {
        self.engines.lock().unwrap().get(player_id).cloned()
    }

    /// Drop the factory's handle to a player's engine.
    pub fn release_engine(&self, player_id: &PlayerId) {
        self.engines.lock().unwrap().remove(player_id);
    }
}

impl EngineFactory for MockEngineFactory {
    fn create_engine(&self, player_id: &PlayerId) -> Arc<dyn PlayerEngine> {
        let engine = MockEngine::new();
        self.engines
            .lock()
            .unwrap()
            .insert(player_id.clone(), Arc::clone(&engine));
        engine
    }
}
