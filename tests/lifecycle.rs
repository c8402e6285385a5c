//! Integration tests for registry and player lifecycle behavior.

#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use playback::{
    ObserverCategory, PlaybackError, PlaybackService, PlayerId, SeekRequest, Source, ViewBinding,
    Volume,
};

use common::{EngineCommand, MockEngineFactory};

fn setup_service() -> (PlaybackService, Arc<MockEngineFactory>) {
    let factory = MockEngineFactory::new();
    let service = PlaybackService::new(factory.clone());
    (service, factory)
}

mod registry_operations {
    use super::*;

    #[tokio::test]
    async fn create_registers_the_player() {
        let (service, _factory) = setup_service();
        let id = PlayerId::new("p1");

        let player = service.create_player(id.clone()).await.unwrap();
        assert_eq!(player.id(), &id);
        assert_eq!(service.players().await, vec![id]);
    }

    #[tokio::test]
    async fn duplicate_create_fails() {
        let (service, _factory) = setup_service();
        let id = PlayerId::new("p1");

        service.create_player(id.clone()).await.unwrap();
        let err = service.create_player(id.clone()).await.unwrap_err();
        assert_eq!(err, PlaybackError::DuplicateId(id));
    }

    #[tokio::test]
    async fn lookup_of_unknown_id_fails() {
        let (service, _factory) = setup_service();
        let id = PlayerId::new("ghost");

        let err = service.player(&id).await.unwrap_err();
        assert_eq!(err, PlaybackError::PlayerNotFound(id));
    }

    #[tokio::test]
    async fn lookup_after_dispose_fails() {
        let (service, _factory) = setup_service();
        let id = PlayerId::new("p1");

        service.create_player(id.clone()).await.unwrap();
        service.dispose_player(&id).await;

        let err = service.player(&id).await.unwrap_err();
        assert_eq!(err, PlaybackError::PlayerNotFound(id));
    }
}

mod dispose {
    use super::*;

    #[tokio::test]
    async fn double_dispose_never_errors() {
        let (service, _factory) = setup_service();
        let id = PlayerId::new("p1");

        service.create_player(id.clone()).await.unwrap();
        service.dispose_player(&id).await;
        assert!(service.players().await.is_empty());

        // Second call is a no-op, not an error.
        service.dispose_player(&id).await;
        assert!(service.players().await.is_empty());
    }

    #[tokio::test]
    async fn dispose_of_never_created_id_is_a_no_op() {
        let (service, _factory) = setup_service();
        service.dispose_player(&PlayerId::new("ghost")).await;
    }

    #[tokio::test]
    async fn dispose_pauses_and_clears_the_engine() {
        let (service, factory) = setup_service();
        let id = PlayerId::new("p1");

        let player = service.create_player(id.clone()).await.unwrap();
        service.dispose_player(&id).await;

        let engine = factory.engine(&id).unwrap();
        assert_eq!(
            engine.commands(),
            vec![EngineCommand::Pause, EngineCommand::Clear]
        );
        assert!(player.is_disposed());
    }

    #[tokio::test]
    async fn dispose_clears_every_observer_flag() {
        let (service, _factory) = setup_service();
        let id = PlayerId::new("p1");

        let player = service.create_player(id.clone()).await.unwrap();
        player.set_source(Source::new("a.mp4")).await;
        assert!(player.is_observer_registered(ObserverCategory::Handle).await);
        assert!(player.is_observer_registered(ObserverCategory::Item).await);

        player.dispose().await;
        assert!(!player.observers_active().await);

        // A second dispose leaves the flags untouched.
        player.dispose().await;
        assert!(!player.observers_active().await);
    }

    #[tokio::test]
    async fn dispose_resets_paused_and_loop_flags() {
        let (service, _factory) = setup_service();
        let id = PlayerId::new("p1");

        let player = service.create_player(id.clone()).await.unwrap();
        player.set_loop(true);
        service.dispose_player(&id).await;

        assert!(!player.paused());
        assert!(!player.loop_enabled());
        assert!(player.current_source().await.is_none());
    }

    #[tokio::test]
    async fn commands_after_dispose_are_silent_no_ops() {
        let (service, factory) = setup_service();
        let id = PlayerId::new("p1");

        let player = service.create_player(id.clone()).await.unwrap();
        player.dispose().await;

        let engine = factory.engine(&id).unwrap();
        let before = engine.commands();

        player.play().await;
        player.pause().await;
        player.set_source(Source::new("a.mp4")).await;
        player.set_volume(0.5).await;
        player.set_loop(true);
        player.seek(SeekRequest::to(Duration::from_secs(3))).await;

        assert_eq!(engine.commands(), before);
        assert!(!player.loop_enabled());
    }
}

mod source_handling {
    use super::*;

    #[tokio::test]
    async fn new_sources_start_paused() {
        let (service, factory) = setup_service();
        let id = PlayerId::new("p1");

        service.create_player(id.clone()).await.unwrap();
        let source = Source::new("https://cdn.example/a.mp4");
        service.set_source(&id, source.clone()).await.unwrap();

        let player = service.player(&id).await.unwrap();
        assert!(player.paused());
        assert_eq!(player.current_source().await, Some(source.clone()));

        let engine = factory.engine(&id).unwrap();
        assert_eq!(
            engine.commands(),
            vec![EngineCommand::Load(source), EngineCommand::Pause]
        );
    }

    #[tokio::test]
    async fn autoplay_sources_start_playing() {
        let (service, factory) = setup_service();
        let id = PlayerId::new("p1");

        service.create_player(id.clone()).await.unwrap();
        let mut source = Source::new("a.mp4");
        source.autoplay = true;
        service.set_source(&id, source.clone()).await.unwrap();

        let player = service.player(&id).await.unwrap();
        assert!(!player.paused());

        let engine = factory.engine(&id).unwrap();
        assert_eq!(
            engine.commands(),
            vec![EngineCommand::Load(source), EngineCommand::Play]
        );
    }

    #[tokio::test]
    async fn descriptor_volume_is_applied() {
        let (service, factory) = setup_service();
        let id = PlayerId::new("p1");

        service.create_player(id.clone()).await.unwrap();
        let mut source = Source::new("a.mp4");
        source.volume = Some(Volume::new(0.3));
        service.set_source(&id, source).await.unwrap();

        let player = service.player(&id).await.unwrap();
        assert_eq!(player.volume(), Volume::new(0.3));

        let engine = factory.engine(&id).unwrap();
        assert!(
            engine
                .commands()
                .contains(&EngineCommand::SetVolume(Volume::new(0.3)))
        );
    }

    #[tokio::test]
    async fn malformed_descriptor_is_ignored() {
        let (service, factory) = setup_service();
        let id = PlayerId::new("p1");

        let player = service.create_player(id.clone()).await.unwrap();
        player.set_source(Source::default()).await;

        let engine = factory.engine(&id).unwrap();
        assert!(engine.commands().is_empty());
        assert!(player.current_source().await.is_none());
        assert!(!player.is_observer_registered(ObserverCategory::Item).await);
    }
}

mod playback_commands {
    use super::*;

    #[tokio::test]
    async fn play_and_pause_track_paused_state() {
        let (service, factory) = setup_service();
        let id = PlayerId::new("p1");

        let player = service.create_player(id.clone()).await.unwrap();
        service.play(&id).await.unwrap();
        assert!(!player.paused());

        service.pause(&id).await.unwrap();
        assert!(player.paused());

        let engine = factory.engine(&id).unwrap();
        assert_eq!(
            engine.commands(),
            vec![EngineCommand::Play, EngineCommand::Pause]
        );
    }

    #[tokio::test]
    async fn volume_is_clamped_before_forwarding() {
        let (service, factory) = setup_service();
        let id = PlayerId::new("p1");

        let player = service.create_player(id.clone()).await.unwrap();
        player.set_volume(1.7).await;

        assert_eq!(player.volume(), Volume::new(1.0));
        let engine = factory.engine(&id).unwrap();
        assert_eq!(
            engine.commands(),
            vec![EngineCommand::SetVolume(Volume::new(1.0))]
        );
    }

    #[tokio::test]
    async fn seek_requests_are_forwarded_verbatim() {
        let (service, factory) = setup_service();
        let id = PlayerId::new("p1");

        service.create_player(id.clone()).await.unwrap();
        let request =
            SeekRequest::with_tolerance(Duration::from_secs(42), Duration::from_millis(100));
        service.seek(&id, request).await.unwrap();

        let engine = factory.engine(&id).unwrap();
        assert_eq!(engine.commands(), vec![EngineCommand::Seek(request)]);
    }

    #[tokio::test]
    async fn commands_on_unknown_ids_fail_not_found() {
        let (service, _factory) = setup_service();
        let id = PlayerId::new("ghost");

        assert!(matches!(
            service.play(&id).await,
            Err(PlaybackError::PlayerNotFound(_))
        ));
        assert!(matches!(
            service.set_source(&id, Source::new("a.mp4")).await,
            Err(PlaybackError::PlayerNotFound(_))
        ));
        assert!(matches!(
            service.set_loop(&id, true).await,
            Err(PlaybackError::PlayerNotFound(_))
        ));
    }
}

mod view_binding {
    use super::*;

    #[tokio::test]
    async fn attach_installs_the_render_layer() {
        let (service, _factory) = setup_service();
        let id = PlayerId::new("p1");

        let player = service.create_player(id.clone()).await.unwrap();
        let binding = ViewBinding::new();

        binding.attach(&player).await.unwrap();
        assert!(binding.is_attached().await);

        let layer = binding.layer().await.unwrap();
        assert_eq!(layer.player_id(), &id);
        assert!(layer.engine().is_some());
    }

    #[tokio::test]
    async fn attach_after_dispose_fails_not_ready() {
        let (service, _factory) = setup_service();
        let id = PlayerId::new("p1");

        let player = service.create_player(id.clone()).await.unwrap();
        service.dispose_player(&id).await;

        let binding = ViewBinding::new();
        let err = binding.attach(&player).await.unwrap_err();
        assert_eq!(err, PlaybackError::NotReady(id));
        assert!(!binding.is_attached().await);
    }

    #[tokio::test]
    async fn detach_is_idempotent() {
        let (service, _factory) = setup_service();
        let id = PlayerId::new("p1");

        let player = service.create_player(id).await.unwrap();
        let binding = ViewBinding::new();
        binding.attach(&player).await.unwrap();

        binding.detach().await;
        binding.detach().await;
        assert!(!binding.is_attached().await);

        // Detaching never touches the player itself.
        assert!(!player.is_disposed());
    }

    #[tokio::test]
    async fn binding_never_extends_the_engine_lifetime() {
        let (service, factory) = setup_service();
        let id = PlayerId::new("p1");

        let player = service.create_player(id.clone()).await.unwrap();
        let binding = ViewBinding::new();
        binding.attach(&player).await.unwrap();

        // Dispose drops the player's engine reference; once the factory
        // releases its inspection handle, the layer goes dark.
        service.dispose_player(&id).await;
        factory.release_engine(&id);

        let layer = binding.layer().await.unwrap();
        assert!(!layer.is_live());
        assert!(layer.engine().is_none());
    }
}
