//! Sample data used across the integration suites

use serenity::model::id::{ChannelId, GuildId, UserId};
use std::collections::HashMap;
use std::time::Duration;

use rusty_jukebox::commands::dispatcher::{InteractionContext, OptionValue};
use rusty_jukebox::commands::music::audio_sources::TrackMetadata;

pub const SAMPLE_USER_ID: u64 = 123456789;
pub const SAMPLE_GUILD_ID: u64 = 555555555;
pub const SAMPLE_CHANNEL_ID: u64 = 987654321;
pub const SAMPLE_VOICE_CHANNEL_ID: u64 = 111111111;

pub const RICK_QUERY: &str = "Never Gonna Give You Up";
pub const RICK_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
pub const GIBBERISH_QUERY: &str = "asdkjasdkjasd";

pub fn guild() -> GuildId {
    GuildId::new(SAMPLE_GUILD_ID)
}

pub fn voice_channel() -> ChannelId {
    ChannelId::new(SAMPLE_VOICE_CHANNEL_ID)
}

pub fn track(title: &str) -> TrackMetadata {
    TrackMetadata {
        title: title.to_string(),
        url: Some(format!("https://www.youtube.com/watch?v={}", title.len())),
        author: Some("Rick Astley".to_string()),
        duration: Some(Duration::from_secs(213)),
        ..Default::default()
    }
}

pub fn rick() -> TrackMetadata {
    TrackMetadata {
        url: Some(RICK_URL.to_string()),
        ..track(RICK_QUERY)
    }
}

/// A `/play` invocation from the sample user in the sample guild.
pub fn play_context(query: &str, voice_channel_id: Option<ChannelId>) -> InteractionContext {
    command_context("play", vec![("query", OptionValue::String(query.to_string()))], voice_channel_id)
}

pub fn command_context(
    name: &str,
    options: Vec<(&str, OptionValue)>,
    voice_channel_id: Option<ChannelId>,
) -> InteractionContext {
    InteractionContext {
        command_name: name.to_string(),
        options: options
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect::<HashMap<_, _>>(),
        user_id: UserId::new(SAMPLE_USER_ID),
        user_name: "rickroller".to_string(),
        guild_id: Some(guild()),
        channel_id: ChannelId::new(SAMPLE_CHANNEL_ID),
        voice_channel_id,
    }
}
