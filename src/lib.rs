//! Playback - host-runtime bridge core for native video playback.
//!
//! This crate implements the runtime-facing half of a native playback
//! bridge: a process-wide player registry, a per-player lifecycle shim,
//! observer-subscription bookkeeping, and an asynchronous event relay. The
//! media engine itself (decode, render, buffering) stays behind the
//! [`PlayerEngine`] trait and is supplied by the platform bridge.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use playback::{EngineFactory, PlaybackService, PlayerId, Source};
//!
//! # async fn run(engines: Arc<dyn EngineFactory>) -> Result<(), playback::PlaybackError> {
//! let service = PlaybackService::new(engines);
//!
//! let id = PlayerId::new("p1");
//! service.create_player(id.clone()).await?;
//! service.set_source(&id, Source::new("https://cdn.example/a.mp4")).await?;
//! service.play(&id).await?;
//!
//! // Events from every player arrive on one subscription.
//! let events = service.events();
//! # Ok(())
//! # }
//! ```

/// External engine abstraction and its notification types.
pub mod engine;

/// Playback bridge error types.
pub mod error;

/// Host-facing player events and the relay carrying them.
pub mod events;

/// Observer subscription bookkeeping.
pub mod observers;

/// Per-player lifecycle shim.
pub mod player;

/// Watchable value cells for observable player state.
pub mod property;

/// Process-wide player registry.
pub mod registry;

/// Bridge entry point and command surface.
pub mod service;

/// Media source descriptors.
pub mod source;

/// Tracing subscriber setup for bridge hosts.
pub mod tracing_config;

/// Identifier and value types.
pub mod types;

/// Render-layer view bindings.
pub mod view;

pub use engine::{EngineFactory, EngineNotification, PlayerEngine};
pub use error::PlaybackError;
pub use events::{EventRelay, PlayerEvent};
pub use observers::ObserverCategory;
pub use player::Player;
pub use registry::PlayerRegistry;
pub use service::PlaybackService;
pub use source::Source;
pub use types::{PlayerId, SeekRequest, Volume};
pub use view::{RenderLayer, ViewBinding};
