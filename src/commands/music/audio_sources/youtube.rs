//! Implements the `Extractor` and `QueryResolver` traits for YouTube.
//! Uses the `yt-dlp` command-line tool for extracting information.

use super::{AudioSourceResult, Extractor, QueryResolver, SearchResult, track_metadata};
use crate::commands::music::utils::music_manager::MusicError;
use serenity::async_trait;
use serenity::model::id::UserId;
use tokio::process::Command;
use tracing::{debug, info, warn};
use url::Url;

/// YouTube lookups through a `yt-dlp` binary.
pub struct YoutubeApi {
    binary: String,
}

impl Default for YoutubeApi {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YoutubeApi {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Checks if the input string is a YouTube watch page or a youtu.be short link.
    pub fn is_youtube_url(query: &str) -> bool {
        let Ok(url) = Url::parse(query) else {
            return false;
        };

        match url.host_str() {
            Some("youtu.be") => url.path().len() > 1,
            Some("www.youtube.com" | "youtube.com" | "m.youtube.com" | "music.youtube.com") => {
                url.path().starts_with("/watch") && url.query_pairs().any(|(key, _)| key == "v")
            }
            _ => false,
        }
    }

    /// Run `yt-dlp` with the given arguments and return its stdout.
    async fn run(&self, args: &[&str]) -> AudioSourceResult<String> {
        debug!("Running {} {:?}", self.binary, args);
        let output = Command::new(&self.binary)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                MusicError::AudioSourceError(format!("Failed to execute {}: {}", self.binary, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("{} exited with {}: {}", self.binary, output.status, stderr.trim());
            // A failed search with partial output still gives us usable entries.
            if output.stdout.is_empty() {
                return Err(MusicError::AudioSourceError(format!(
                    "{} failed: {}",
                    self.binary,
                    stderr.trim()
                )));
            }
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Extractor for YoutubeApi {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn validate(&self, url: &str) -> bool {
        Self::is_youtube_url(url)
    }

    /// Fetches metadata for a single video. Playlist parameters in the URL are ignored.
    async fn extract(&self, url: &str, requested_by: UserId) -> AudioSourceResult<SearchResult> {
        info!("Extracting YouTube metadata for URL: {}", url);
        let stdout = self.run(&["-j", "--no-playlist", url]).await?;

        let tracks = track_metadata::parse_ytdlp_output(&stdout)
            .into_iter()
            .map(|track| track.requested_by(requested_by))
            .collect();

        Ok(SearchResult::new(tracks))
    }
}

#[async_trait]
impl QueryResolver for YoutubeApi {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        requested_by: UserId,
    ) -> AudioSourceResult<SearchResult> {
        let search_param = format!("ytsearch{}:{}", limit, query);
        let stdout = self.run(&["-j", "--flat-playlist", &search_param]).await?;

        let tracks: Vec<_> = track_metadata::parse_ytdlp_output(&stdout)
            .into_iter()
            // Flat entries without a URL cannot be played.
            .filter(|track| track.url.is_some())
            .map(|track| track.requested_by(requested_by))
            .collect();

        info!("Search for '{}' returned {} result(s)", query, tracks.len());
        Ok(SearchResult::new(tracks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("https://www.youtube.com/watch?v=dQw4w9WgXcQ", true ; "watch page")]
    #[test_case("https://youtube.com/watch?v=dQw4w9WgXcQ&list=PL123", true ; "watch page in playlist")]
    #[test_case("https://music.youtube.com/watch?v=dQw4w9WgXcQ", true ; "music")]
    #[test_case("https://youtu.be/dQw4w9WgXcQ", true ; "short link")]
    #[test_case("https://youtu.be/", false ; "short link without id")]
    #[test_case("https://www.youtube.com/@RickAstleyYT", false ; "channel")]
    #[test_case("https://www.youtube.com/watch", false ; "watch without id")]
    #[test_case("https://example.com/watch?v=abc", false ; "other host")]
    #[test_case("rick astley", false ; "free text")]
    fn recognises_youtube_urls(url: &str, expected: bool) {
        assert_eq!(YoutubeApi::is_youtube_url(url), expected);
    }

    #[tokio::test]
    async fn missing_binary_is_an_audio_source_error() {
        let api = YoutubeApi::new("definitely-not-a-real-yt-dlp-binary");

        let result = api.search("anything", 1, UserId::new(1)).await;

        assert!(matches!(result, Err(MusicError::AudioSourceError(_))));
    }
}
