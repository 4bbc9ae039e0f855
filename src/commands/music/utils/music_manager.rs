use dashmap::DashMap;
use serenity::async_trait;
use serenity::model::id::GuildId;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::guild_locks::GuildLocks;
use super::queue_manager::{PlaybackQueue, QueueMetadata};
use super::voice_driver::VoiceDriver;
use crate::commands::music::audio_sources::{ExtractorRegistry, SearchOptions, SearchResult};

/// Errors that can occur during music operations
#[derive(Error, Debug)]
pub enum MusicError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("User is not in a voice channel")]
    UserNotInVoiceChannel,

    #[error("Audio source error: {0}")]
    AudioSourceError(String),

    #[error("Playback error: {0}")]
    PlaybackError(String),
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// Options for creating a guild's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueOptions {
    pub metadata: QueueMetadata,
}

/// Search plus per-guild queue ownership. At most one live queue exists per guild.
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    async fn search(&self, query: &str, options: SearchOptions) -> MusicResult<SearchResult>;

    /// Returns the guild's queue, creating it if there is none. Repeated calls return the
    /// same instance until the queue is deleted.
    async fn get_or_create_queue(
        &self,
        guild_id: GuildId,
        options: QueueOptions,
    ) -> Arc<PlaybackQueue>;

    fn get_queue(&self, guild_id: GuildId) -> Option<Arc<PlaybackQueue>>;

    /// Drops the guild's queue and leaves voice if it was connected.
    async fn delete_queue(&self, guild_id: GuildId);
}

/// Delete a guild's queue after the bot left voice, waiting for any in-flight play request
/// for that guild to finish first.
pub async fn release_guild(engine: &dyn PlaybackEngine, locks: &GuildLocks, guild_id: GuildId) {
    let _guard = locks.lock(guild_id).await;
    engine.delete_queue(guild_id).await;
}

/// The bot's playback engine: extractor-backed search and a map of guild queues.
pub struct MusicPlayer {
    sources: ExtractorRegistry,
    voice: Arc<dyn VoiceDriver>,
    queues: DashMap<GuildId, Arc<PlaybackQueue>>,
}

impl MusicPlayer {
    pub fn new(sources: ExtractorRegistry, voice: Arc<dyn VoiceDriver>) -> Self {
        Self {
            sources,
            voice,
            queues: DashMap::new(),
        }
    }

    pub fn queue_count(&self) -> usize {
        self.queues.len()
    }
}

#[async_trait]
impl PlaybackEngine for MusicPlayer {
    async fn search(&self, query: &str, options: SearchOptions) -> MusicResult<SearchResult> {
        self.sources.search(query, options).await
    }

    async fn get_or_create_queue(
        &self,
        guild_id: GuildId,
        options: QueueOptions,
    ) -> Arc<PlaybackQueue> {
        self.queues
            .entry(guild_id)
            .or_insert_with(|| {
                info!("Creating playback queue for guild {}", guild_id);
                Arc::new(PlaybackQueue::new(
                    guild_id,
                    options.metadata,
                    Arc::clone(&self.voice),
                ))
            })
            .clone()
    }

    fn get_queue(&self, guild_id: GuildId) -> Option<Arc<PlaybackQueue>> {
        self.queues.get(&guild_id).map(|queue| Arc::clone(&queue))
    }

    async fn delete_queue(&self, guild_id: GuildId) {
        // Remove first so the map guard is released before awaiting the teardown.
        let removed = self.queues.remove(&guild_id);
        match removed {
            Some((_, queue)) => {
                info!("Deleting playback queue for guild {}", guild_id);
                queue.teardown().await;
            }
            None => debug!("No playback queue to delete for guild {}", guild_id),
        }
    }
}
