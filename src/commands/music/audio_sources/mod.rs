//! This module defines the structure and traits for resolving a user's query into playable
//! tracks. URLs are handed to the first registered [`Extractor`] that recognises them and
//! free text goes to a [`QueryResolver`] (YouTube search by default).

/// Submodule implementing the `Extractor` trait for plain audio file URLs.
pub(crate) mod direct;
/// Submodule defining the `TrackMetadata` struct used across audio sources.
pub mod track_metadata;
/// Submodule implementing `Extractor` and `QueryResolver` for YouTube via `yt-dlp`.
pub(crate) mod youtube;

use crate::commands::music::utils::music_manager::MusicError;
use serenity::async_trait;
use serenity::model::id::UserId;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

pub use direct::DirectUrlApi;
pub use track_metadata::{TrackMetadata, TrackSource};
pub use youtube::YoutubeApi;

/// A specialized `Result` type for operations within the `audio_sources` module.
pub type AudioSourceResult<T> = Result<T, MusicError>;

/// Zero or more candidate tracks for a query. Ranking is left to whoever produced the
/// result; the first entry is the one that gets played.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    pub tracks: Vec<TrackMetadata>,
}

impl SearchResult {
    pub fn new(tracks: Vec<TrackMetadata>) -> Self {
        Self { tracks }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn first(&self) -> Option<&TrackMetadata> {
        self.tracks.first()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Which search path a query takes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchEngine {
    /// URLs go to extractors, everything else to the query resolver.
    #[default]
    Auto,
    /// Always treat the query as free text.
    YoutubeSearch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub requested_by: UserId,
    pub engine: SearchEngine,
}

/// A pluggable source that understands one family of URLs.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Checks if the given URL is recognised by this extractor.
    fn validate(&self, url: &str) -> bool;

    /// Fetches metadata for the track(s) behind the URL.
    async fn extract(&self, url: &str, requested_by: UserId) -> AudioSourceResult<SearchResult>;
}

/// Turns free text into ranked candidates.
#[async_trait]
pub trait QueryResolver: Send + Sync {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        requested_by: UserId,
    ) -> AudioSourceResult<SearchResult>;
}

/// Ordered set of extractors plus the free-text resolver.
pub struct ExtractorRegistry {
    extractors: Vec<Arc<dyn Extractor>>,
    resolver: Arc<dyn QueryResolver>,
    search_limit: usize,
}

impl ExtractorRegistry {
    pub fn new(resolver: Arc<dyn QueryResolver>, search_limit: usize) -> Self {
        Self {
            extractors: Vec::new(),
            resolver,
            search_limit: search_limit.max(1),
        }
    }

    /// The stock setup: YouTube links and search through `yt-dlp`, then direct audio files.
    pub fn youtube(ytdlp_path: impl Into<String>, search_limit: usize) -> Self {
        let youtube = Arc::new(YoutubeApi::new(ytdlp_path));
        let mut registry = Self::new(youtube.clone(), search_limit);
        registry.register(youtube);
        registry.register(Arc::new(DirectUrlApi));
        registry
    }

    /// Extractors are consulted in registration order.
    pub fn register(&mut self, extractor: Arc<dyn Extractor>) {
        debug!("Registered extractor {}", extractor.name());
        self.extractors.push(extractor);
    }

    /// First extractor whose `validate` accepts the URL. Later matches are never consulted.
    pub fn extractor_for(&self, url: &str) -> Option<&Arc<dyn Extractor>> {
        self.extractors.iter().find(|extractor| extractor.validate(url))
    }

    pub async fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> AudioSourceResult<SearchResult> {
        if options.engine == SearchEngine::Auto && is_url(query) {
            return match self.extractor_for(query) {
                Some(extractor) => {
                    info!("Resolving {} with the {} extractor", query, extractor.name());
                    extractor.extract(query, options.requested_by).await
                }
                None => {
                    warn!("No extractor accepts URL {}", query);
                    Ok(SearchResult::empty())
                }
            };
        }

        info!("Searching for: {}", query);
        self.resolver
            .search(query, self.search_limit, options.requested_by)
            .await
    }
}

/// Performs a basic check if the input string can be parsed as an http(s) URL.
/// Does not validate if the URL is actually reachable or supported by any extractor.
pub fn is_url(input: &str) -> bool {
    Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}
