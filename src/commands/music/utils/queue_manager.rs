use serenity::model::id::{ChannelId, GuildId};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::music_manager::{MusicError, MusicResult};
use super::voice_driver::VoiceDriver;
use crate::commands::music::audio_sources::TrackMetadata;

/// State of a queue's voice connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Data attached to a queue when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueMetadata {
    /// Text channel the play request came from.
    pub text_channel: ChannelId,
}

struct QueueState {
    connection: ConnectionState,
    voice_channel: Option<ChannelId>,
    playing: bool,
    tracks: Vec<TrackMetadata>,
    // Index into `tracks` of the current (or next, when idle) track.
    cursor: usize,
}

/// A guild's playback queue. Tracks are only ever appended; playback walks a cursor.
pub struct PlaybackQueue {
    guild_id: GuildId,
    metadata: QueueMetadata,
    voice: Arc<dyn VoiceDriver>,
    state: Mutex<QueueState>,
}

impl PlaybackQueue {
    pub fn new(guild_id: GuildId, metadata: QueueMetadata, voice: Arc<dyn VoiceDriver>) -> Self {
        Self {
            guild_id,
            metadata,
            voice,
            state: Mutex::new(QueueState {
                connection: ConnectionState::Disconnected,
                voice_channel: None,
                playing: false,
                tracks: Vec::new(),
                cursor: 0,
            }),
        }
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn metadata(&self) -> QueueMetadata {
        self.metadata
    }

    pub async fn connection_state(&self) -> ConnectionState {
        self.state.lock().await.connection
    }

    pub async fn is_connected(&self) -> bool {
        self.connection_state().await == ConnectionState::Connected
    }

    pub async fn voice_channel(&self) -> Option<ChannelId> {
        self.state.lock().await.voice_channel
    }

    pub async fn is_playing(&self) -> bool {
        self.state.lock().await.playing
    }

    /// Every track ever added, in order.
    pub async fn tracks(&self) -> Vec<TrackMetadata> {
        self.state.lock().await.tracks.clone()
    }

    /// The track being streamed right now, if any.
    pub async fn current(&self) -> Option<TrackMetadata> {
        let state = self.state.lock().await;
        if state.playing {
            state.tracks.get(state.cursor).cloned()
        } else {
            None
        }
    }

    /// Join a voice channel. On failure the queue is left `Disconnected`.
    pub async fn connect(&self, channel_id: ChannelId) -> MusicResult<()> {
        self.state.lock().await.connection = ConnectionState::Connecting;
        info!(
            "Joining voice channel {} in guild {}",
            channel_id, self.guild_id
        );

        let joined = self.voice.join(self.guild_id, channel_id).await;

        let mut state = self.state.lock().await;
        match joined {
            Ok(()) => {
                state.connection = ConnectionState::Connected;
                state.voice_channel = Some(channel_id);
                Ok(())
            }
            Err(e) => {
                error!(
                    "Failed to join voice channel {} for guild {}: {}",
                    channel_id, self.guild_id, e
                );
                state.connection = ConnectionState::Disconnected;
                state.voice_channel = None;
                Err(e)
            }
        }
    }

    /// Append a track and return its index in [`tracks`](Self::tracks).
    pub async fn add_track(&self, track: TrackMetadata) -> usize {
        let mut state = self.state.lock().await;
        debug!("Adding '{}' to queue for guild {}", track.title, self.guild_id);
        state.tracks.push(track);
        state.tracks.len() - 1
    }

    /// 1-based position of the track at `index` among the tracks not yet finished.
    pub async fn position_of(&self, index: usize) -> usize {
        index.saturating_sub(self.state.lock().await.cursor) + 1
    }

    /// Start streaming from the cursor, skipping tracks that fail to start. Returns the
    /// index of the track now streaming, or `None` if already playing or nothing was left.
    pub async fn play(self: &Arc<Self>) -> MusicResult<Option<usize>> {
        {
            let mut state = self.state.lock().await;
            if state.playing {
                return Ok(None);
            }
            if state.connection != ConnectionState::Connected {
                return Err(MusicError::NotConnected);
            }
            state.playing = true;
        }

        self.stream_from_cursor().await
    }

    /// Called when the current track finishes. Moves on to the next playable track or
    /// stops when the queue is exhausted.
    pub async fn advance(self: &Arc<Self>) {
        {
            let mut state = self.state.lock().await;
            if !state.playing {
                return;
            }
            state.cursor += 1;
        }

        if let Err(e) = self.stream_from_cursor().await {
            warn!("Playback stopped for guild {}: {}", self.guild_id, e);
        }
    }

    // Expects `playing` to be set. Clears it once no track at or after the cursor streams;
    // the last stream error is returned in that case.
    async fn stream_from_cursor(self: &Arc<Self>) -> MusicResult<Option<usize>> {
        let mut last_error = None;

        loop {
            let (index, track) = {
                let mut state = self.state.lock().await;
                let next = match state.connection {
                    ConnectionState::Connected => state.tracks.get(state.cursor).cloned(),
                    _ => None,
                };
                match next {
                    Some(track) => (state.cursor, track),
                    None => {
                        info!("Queue finished for guild {}", self.guild_id);
                        state.playing = false;
                        return match last_error {
                            Some(e) => Err(e),
                            None => Ok(None),
                        };
                    }
                }
            };

            match self.voice.stream(Arc::clone(self), track.clone()).await {
                Ok(()) => return Ok(Some(index)),
                Err(e) => {
                    warn!("Skipping '{}' for guild {}: {}", track.title, self.guild_id, e);
                    self.state.lock().await.cursor += 1;
                    last_error = Some(e);
                }
            }
        }
    }

    /// Leave voice and mark the queue stopped and disconnected.
    pub async fn teardown(&self) {
        let was_connected = {
            let mut state = self.state.lock().await;
            let was_connected = state.connection != ConnectionState::Disconnected;
            state.connection = ConnectionState::Disconnected;
            state.voice_channel = None;
            state.playing = false;
            was_connected
        };

        if was_connected {
            if let Err(e) = self.voice.leave(self.guild_id).await {
                debug!("Leaving voice for guild {} failed: {}", self.guild_id, e);
            }
        }
    }
}
