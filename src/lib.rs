//! A Discord bot that plays songs in voice channels through a `/play` slash command.

use std::sync::LazyLock;

pub mod commands;
pub mod config;
pub mod events;

/// Error type handlers return; any failure that reaches the dispatcher becomes a generic reply.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Shared HTTP client for audio inputs.
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

pub use commands::dispatcher::{
    Dispatcher, InboundEvent, InteractionContext, InteractionResponder, OptionValue, Reply,
    ReplyEmbed,
};
pub use commands::music::audio_sources::{
    ExtractorRegistry, SearchEngine, SearchOptions, SearchResult, TrackMetadata, TrackSource,
};
pub use commands::music::utils::music_manager::{
    MusicError, MusicPlayer, MusicResult, PlaybackEngine, QueueOptions,
};
pub use commands::music::utils::queue_manager::{ConnectionState, PlaybackQueue, QueueMetadata};
pub use commands::music::utils::voice_driver::VoiceDriver;
pub use commands::registry::{CommandDescriptor, CommandRegistry, CommandSource};
