//! Mock implementations for the bot's external collaborators

use async_trait::async_trait;
use mockall::mock;
use serenity::model::id::{ChannelId, GuildId, UserId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusty_jukebox::Error;
use rusty_jukebox::commands::dispatcher::{InteractionResponder, Reply};
use rusty_jukebox::commands::music::audio_sources::{
    AudioSourceResult, Extractor, QueryResolver, SearchOptions, SearchResult, TrackMetadata,
};
use rusty_jukebox::commands::music::utils::music_manager::{
    MusicError, MusicResult, PlaybackEngine, QueueOptions,
};
use rusty_jukebox::commands::music::utils::queue_manager::PlaybackQueue;
use rusty_jukebox::commands::music::utils::voice_driver::VoiceDriver;

mock! {
    pub Engine {}

    #[async_trait]
    impl PlaybackEngine for Engine {
        async fn search(&self, query: &str, options: SearchOptions) -> MusicResult<SearchResult>;
        async fn get_or_create_queue(&self, guild_id: GuildId, options: QueueOptions) -> Arc<PlaybackQueue>;
        fn get_queue(&self, guild_id: GuildId) -> Option<Arc<PlaybackQueue>>;
        async fn delete_queue(&self, guild_id: GuildId);
    }
}

/// Records every voice operation instead of talking to Discord.
#[derive(Default)]
pub struct FakeVoiceDriver {
    pub fail_join: bool,
    /// Titles whose stream always fails to start.
    pub broken_titles: Vec<String>,
    pub join_delay: Option<Duration>,
    pub joins: Mutex<Vec<(GuildId, ChannelId)>>,
    pub leaves: Mutex<Vec<GuildId>>,
    pub streamed: Mutex<Vec<String>>,
}

impl FakeVoiceDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_join() -> Arc<Self> {
        Arc::new(Self {
            fail_join: true,
            ..Default::default()
        })
    }

    pub fn failing_stream(titles: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            broken_titles: titles.iter().map(|title| title.to_string()).collect(),
            ..Default::default()
        })
    }

    pub fn slow_join(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            join_delay: Some(delay),
            ..Default::default()
        })
    }

    pub fn join_count(&self) -> usize {
        self.joins.lock().unwrap().len()
    }

    pub fn streamed_titles(&self) -> Vec<String> {
        self.streamed.lock().unwrap().clone()
    }
}

#[async_trait]
impl VoiceDriver for FakeVoiceDriver {
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()> {
        self.joins.lock().unwrap().push((guild_id, channel_id));
        if let Some(delay) = self.join_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_join {
            return Err(MusicError::JoinError("missing permissions".to_string()));
        }
        Ok(())
    }

    async fn leave(&self, guild_id: GuildId) -> MusicResult<()> {
        self.leaves.lock().unwrap().push(guild_id);
        Ok(())
    }

    async fn stream(&self, _queue: Arc<PlaybackQueue>, track: TrackMetadata) -> MusicResult<()> {
        if self.broken_titles.contains(&track.title) {
            return Err(MusicError::PlaybackError("decoder exploded".to_string()));
        }
        self.streamed.lock().unwrap().push(track.title);
        Ok(())
    }
}

/// Free-text search over a fixed table.
pub struct StaticResolver {
    results: Vec<(String, Vec<TrackMetadata>)>,
}

impl StaticResolver {
    pub fn new(results: Vec<(&str, Vec<TrackMetadata>)>) -> Self {
        Self {
            results: results
                .into_iter()
                .map(|(query, tracks)| (query.to_string(), tracks))
                .collect(),
        }
    }

    fn lookup(&self, query: &str, requested_by: UserId) -> SearchResult {
        let tracks = self
            .results
            .iter()
            .find(|(key, _)| key == query)
            .map(|(_, tracks)| tracks.clone())
            .unwrap_or_default();
        SearchResult::new(
            tracks
                .into_iter()
                .map(|track| track.requested_by(requested_by))
                .collect(),
        )
    }
}

#[async_trait]
impl QueryResolver for StaticResolver {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        requested_by: UserId,
    ) -> AudioSourceResult<SearchResult> {
        let mut result = self.lookup(query, requested_by);
        result.tracks.truncate(limit);
        Ok(result)
    }
}

/// Extractor for the URLs present in the fixed table.
pub struct StaticExtractor {
    inner: StaticResolver,
}

impl StaticExtractor {
    pub fn new(results: Vec<(&str, Vec<TrackMetadata>)>) -> Self {
        Self {
            inner: StaticResolver::new(results),
        }
    }
}

#[async_trait]
impl Extractor for StaticExtractor {
    fn name(&self) -> &'static str {
        "static"
    }

    fn validate(&self, url: &str) -> bool {
        self.inner.results.iter().any(|(key, _)| key == url)
    }

    async fn extract(&self, url: &str, requested_by: UserId) -> AudioSourceResult<SearchResult> {
        Ok(self.inner.lookup(url, requested_by))
    }
}

/// What a responder was asked to send.
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Defer,
    Reply(Reply),
    FollowUp(Reply),
}

/// Enforces Discord's one-initial-response rule and records everything sent.
#[derive(Default)]
pub struct RecordingResponder {
    pub fail_replies: bool,
    responded: AtomicBool,
    sent: Mutex<Vec<Sent>>,
}

impl RecordingResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_replies: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn initial(&self, sent: Sent) -> Result<(), Error> {
        if self.responded.swap(true, Ordering::SeqCst) {
            return Err("interaction has already been acknowledged".into());
        }
        self.sent.lock().unwrap().push(sent);
        Ok(())
    }
}

#[async_trait]
impl InteractionResponder for RecordingResponder {
    fn has_responded(&self) -> bool {
        self.responded.load(Ordering::SeqCst)
    }

    async fn defer(&self) -> Result<(), Error> {
        self.initial(Sent::Defer)
    }

    async fn reply(&self, reply: Reply) -> Result<(), Error> {
        if self.fail_replies {
            return Err("discord is down".into());
        }
        self.initial(Sent::Reply(reply))
    }

    async fn follow_up(&self, reply: Reply) -> Result<(), Error> {
        if !self.has_responded() {
            return Err("follow-up before the initial response".into());
        }
        self.sent.lock().unwrap().push(Sent::FollowUp(reply));
        Ok(())
    }
}
