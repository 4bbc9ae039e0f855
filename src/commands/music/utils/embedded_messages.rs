use serenity::all::CreateEmbed;

use super::format_duration;
use crate::commands::music::audio_sources::TrackMetadata;

/// Parse the metadata for the now playing and added to queue embeds
fn parse_metadata(metadata: &TrackMetadata) -> (String, String, String) {
    let title = metadata.title.clone();
    let url = metadata.url.clone().unwrap_or_else(|| "#".to_string());
    let duration_str = metadata
        .duration
        .map(format_duration)
        .unwrap_or_else(|| "Unknown duration".to_string());

    (title, url, duration_str)
}

fn with_track_details(mut embed: CreateEmbed, metadata: &TrackMetadata) -> CreateEmbed {
    if let Some(author) = &metadata.author {
        embed = embed.field("Author", author, true);
    }
    if let Some(user_id) = metadata.requested_by {
        embed = embed.field("Requested by", format!("<@{}>", user_id), true);
    }
    if let Some(thumbnail) = &metadata.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }
    embed
}

/// Create an embed for when a song is now playing
pub fn now_playing(metadata: &TrackMetadata) -> CreateEmbed {
    let (title, url, duration_str) = parse_metadata(metadata);

    let embed = CreateEmbed::new()
        .title("🎵 Now Playing")
        .description(format!("[{}]({})", title, url))
        .field("Duration", format!("`{}`", duration_str), true)
        .color(0x00ff00);

    with_track_details(embed, metadata)
}

/// Create an embed for when a song is added to the queue
pub fn added_to_queue(metadata: &TrackMetadata, position: usize) -> CreateEmbed {
    let (title, url, duration_str) = parse_metadata(metadata);

    let embed = CreateEmbed::new()
        .title("🎵 Added to Queue")
        .description(format!("[{}]({})", title, url))
        .field("Duration", format!("`{}`", duration_str), true)
        .field("Position", format!("`#{}`", position), true)
        .color(0x00ff00);

    with_track_details(embed, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn missing_fields_fall_back() {
        let (title, url, duration) = parse_metadata(&TrackMetadata::default());

        assert_eq!(title, "Unknown Track");
        assert_eq!(url, "#");
        assert_eq!(duration, "Unknown duration");
    }

    #[test]
    fn duration_is_formatted() {
        let metadata = TrackMetadata {
            title: "Song".to_string(),
            url: Some("https://youtu.be/x".to_string()),
            duration: Some(Duration::from_secs(213)),
            ..Default::default()
        };

        let (_, url, duration) = parse_metadata(&metadata);

        assert_eq!(url, "https://youtu.be/x");
        assert_eq!(duration, "3:33");
    }
}
