//! Common test utilities, fixtures, and mocks
//! Shared by the integration suites; not every suite uses every helper.
#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

use std::sync::{Arc, Once};
use tracing::Level;

use rusty_jukebox::commands::music::audio_sources::{ExtractorRegistry, TrackMetadata};
use rusty_jukebox::commands::music::utils::music_manager::MusicPlayer;

use mocks::{FakeVoiceDriver, StaticExtractor, StaticResolver};

static INIT: Once = Once::new();

/// Initialize tracing for tests
pub fn init() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .init();
    });
}

/// A real `MusicPlayer` wired to in-memory search results and a fake voice driver.
pub fn player_with(
    results: Vec<(&str, Vec<TrackMetadata>)>,
    voice: Arc<FakeVoiceDriver>,
) -> Arc<MusicPlayer> {
    let resolver = Arc::new(StaticResolver::new(results.clone()));
    let mut sources = ExtractorRegistry::new(resolver, 5);
    sources.register(Arc::new(StaticExtractor::new(results)));
    Arc::new(MusicPlayer::new(sources, voice))
}
