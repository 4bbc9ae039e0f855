//! Plain audio files served over HTTP(S), streamed without going through `yt-dlp`.

use super::{AudioSourceResult, Extractor, SearchResult, TrackMetadata, TrackSource};
use serenity::async_trait;
use serenity::model::id::UserId;
use url::Url;

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "ogg", "opus", "flac", "wav", "m4a", "aac", "webm"];

pub struct DirectUrlApi;

impl DirectUrlApi {
    fn file_name(url: &Url) -> Option<&str> {
        url.path_segments()?.next_back().filter(|name| !name.is_empty())
    }
}

#[async_trait]
impl Extractor for DirectUrlApi {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn validate(&self, url: &str) -> bool {
        let Ok(url) = Url::parse(url) else {
            return false;
        };

        matches!(url.scheme(), "http" | "https")
            && Self::file_name(&url)
                .and_then(|name| name.rsplit_once('.'))
                .is_some_and(|(_, ext)| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
    }

    async fn extract(&self, url: &str, requested_by: UserId) -> AudioSourceResult<SearchResult> {
        let title = Url::parse(url)
            .ok()
            .as_ref()
            .and_then(Self::file_name)
            .map(str::to_string)
            .unwrap_or_else(|| url.to_string());

        Ok(SearchResult::new(vec![TrackMetadata {
            title,
            url: Some(url.to_string()),
            requested_by: Some(requested_by),
            source: TrackSource::Http,
            ..Default::default()
        }]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://cdn.example.com/music/song.mp3", true)]
    #[case("http://example.com/a/B.FLAC", true)]
    #[case("https://example.com/page.html", false)]
    #[case("https://example.com/", false)]
    #[case("ftp://example.com/song.mp3", false)]
    fn validates_audio_file_urls(#[case] url: &str, #[case] expected: bool) {
        assert_eq!(DirectUrlApi.validate(url), expected);
    }

    #[tokio::test]
    async fn titles_track_after_file_name() {
        let result = DirectUrlApi
            .extract("https://cdn.example.com/music/song.mp3", UserId::new(3))
            .await
            .unwrap();

        let track = result.first().unwrap();
        assert_eq!(track.title, "song.mp3");
        assert_eq!(track.source, TrackSource::Http);
        assert_eq!(track.requested_by, Some(UserId::new(3)));
    }
}
