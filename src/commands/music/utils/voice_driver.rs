use reqwest::Client;
use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use songbird::input::{HttpRequest, Input, YoutubeDl};
use songbird::{Event, Songbird, TrackEvent};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::info;

use super::event_handlers::TrackEndNotifier;
use super::music_manager::{MusicError, MusicResult};
use super::queue_manager::PlaybackQueue;
use crate::commands::music::audio_sources::{TrackMetadata, TrackSource};

/// The voice transport a queue drives: joining, leaving, and streaming one track at a time.
#[async_trait]
pub trait VoiceDriver: Send + Sync {
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()>;

    async fn leave(&self, guild_id: GuildId) -> MusicResult<()>;

    /// Start streaming `track`. The driver must call [`PlaybackQueue::advance`] once the
    /// track ends.
    async fn stream(&self, queue: Arc<PlaybackQueue>, track: TrackMetadata) -> MusicResult<()>;
}

/// Songbird-backed voice driver.
pub struct SongbirdDriver {
    manager: Arc<Songbird>,
    http: Client,
}

impl SongbirdDriver {
    pub fn new(manager: Arc<Songbird>, http: Client) -> Self {
        Self { manager, http }
    }

    fn input_for(&self, track: &TrackMetadata) -> MusicResult<Input> {
        let url = track.url.clone().ok_or_else(|| {
            MusicError::AudioSourceError(format!("Track '{}' has no URL", track.title))
        })?;

        Ok(match track.source {
            TrackSource::YoutubeDl => YoutubeDl::new(self.http.clone(), url).into(),
            TrackSource::Http => HttpRequest::new(self.http.clone(), url).into(),
        })
    }
}

#[async_trait]
impl VoiceDriver for SongbirdDriver {
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()> {
        self.manager
            .join(guild_id, channel_id)
            .await
            .map(|_| ())
            .map_err(|e| MusicError::JoinError(e.to_string()))
    }

    async fn leave(&self, guild_id: GuildId) -> MusicResult<()> {
        if self.manager.get(guild_id).is_none() {
            return Err(MusicError::NotConnected);
        }

        self.manager
            .remove(guild_id)
            .await
            .map_err(|e| MusicError::JoinError(format!("Failed to leave voice channel: {}", e)))
    }

    async fn stream(&self, queue: Arc<PlaybackQueue>, track: TrackMetadata) -> MusicResult<()> {
        let call = self
            .manager
            .get(queue.guild_id())
            .ok_or(MusicError::NotConnected)?;
        let input = self.input_for(&track)?;

        let handle = call.lock().await.play_input(input);
        info!("Streaming '{}' in guild {}", track.title, queue.guild_id());

        let fired = Arc::new(AtomicBool::new(false));
        for event in [TrackEvent::End, TrackEvent::Error] {
            handle
                .add_event(
                    Event::Track(event),
                    TrackEndNotifier {
                        queue: Arc::clone(&queue),
                        track_title: track.title.clone(),
                        fired: Arc::clone(&fired),
                    },
                )
                .map_err(|e| MusicError::PlaybackError(e.to_string()))?;
        }

        Ok(())
    }
}
