//! Defines the `TrackMetadata` struct, a unified representation of track information
//! from the various audio sources, and the parsing of `yt-dlp` JSON output into it.

use serde::Deserialize;
use serenity::model::id::UserId;
use std::time::Duration;
use tracing::warn;

/// How the voice driver should open a track's audio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrackSource {
    /// Resolved through `yt-dlp` at playback time.
    #[default]
    YoutubeDl,
    /// A plain HTTP(S) audio file.
    Http,
}

/// Unified representation of metadata for a playable track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMetadata {
    /// The title of the track.
    pub title: String,
    /// The URL the audio is fetched from, if available.
    pub url: Option<String>,
    /// Uploader, channel or artist.
    pub author: Option<String>,
    /// The duration of the track, if available.
    pub duration: Option<Duration>,
    /// URL to a thumbnail image for the track, if available.
    pub thumbnail: Option<String>,
    /// The user who requested the track.
    pub requested_by: Option<UserId>,
    pub source: TrackSource,
}

impl Default for TrackMetadata {
    fn default() -> Self {
        Self {
            title: "Unknown Track".to_string(),
            url: None,
            author: None,
            duration: None,
            thumbnail: None,
            requested_by: None,
            source: TrackSource::default(),
        }
    }
}

impl TrackMetadata {
    /// Stamp the requesting user onto the metadata.
    pub fn requested_by(mut self, user_id: UserId) -> Self {
        self.requested_by = Some(user_id);
        self
    }
}

/// The subset of a `yt-dlp --dump-json` line we care about. Full extractions carry
/// `webpage_url`/`thumbnail`/`uploader`, flat playlist entries carry `url`/`thumbnails`/`channel`.
#[derive(Debug, Deserialize)]
struct YtDlpEntry {
    title: Option<String>,
    webpage_url: Option<String>,
    url: Option<String>,
    duration: Option<f64>,
    uploader: Option<String>,
    channel: Option<String>,
    thumbnail: Option<String>,
    #[serde(default)]
    thumbnails: Vec<YtDlpThumbnail>,
}

#[derive(Debug, Deserialize)]
struct YtDlpThumbnail {
    url: String,
}

impl From<YtDlpEntry> for TrackMetadata {
    fn from(entry: YtDlpEntry) -> Self {
        // The last thumbnail in a flat entry is the largest one.
        let thumbnail = entry
            .thumbnail
            .or_else(|| entry.thumbnails.into_iter().last().map(|t| t.url));

        TrackMetadata {
            title: entry.title.unwrap_or_else(|| "Unknown Title".to_string()),
            url: entry.webpage_url.or(entry.url),
            author: entry.uploader.or(entry.channel),
            duration: entry
                .duration
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(Duration::from_secs_f64),
            thumbnail,
            requested_by: None,
            source: TrackSource::YoutubeDl,
        }
    }
}

/// Parse `yt-dlp` JSON-lines output. Lines that are not valid entries are skipped.
pub fn parse_ytdlp_output(stdout: &str) -> Vec<TrackMetadata> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str::<YtDlpEntry>(line) {
            Ok(entry) => Some(TrackMetadata::from(entry)),
            Err(e) => {
                warn!("Skipping unparseable yt-dlp output line: {}", e);
                None
            }
        })
        .collect()
}
