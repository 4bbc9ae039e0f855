use serenity::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::Error;
use crate::commands::dispatcher::{InteractionContext, Reply, ReplyEmbed};
use crate::commands::music::audio_sources::{SearchEngine, SearchOptions};
use crate::commands::music::utils::{
    guild_locks::GuildLocks,
    music_manager::{MusicError, PlaybackEngine, QueueOptions},
    queue_manager::QueueMetadata,
};
use crate::commands::registry::{CommandEntry, CommandHandler, OptionSpec};

pub const NO_RESULTS: &str = "No results found!";
pub const COULD_NOT_JOIN: &str = "Could not join your voice channel!";
pub const MISSING_QUERY: &str = "Please give me a song name or URL to play!";

/// `/play query:<song name or URL>`
pub fn play(engine: Arc<dyn PlaybackEngine>, locks: GuildLocks) -> CommandEntry {
    CommandEntry {
        name: Some("play".to_string()),
        description: "Play a song from YouTube or a direct URL".to_string(),
        options: vec![OptionSpec::string("query", "The song name or URL").required()],
        handler: Some(Arc::new(Play::new(engine, locks))),
        // Searching can easily take longer than the interaction response window.
        defer: true,
    }
}

pub struct Play {
    engine: Arc<dyn PlaybackEngine>,
    locks: GuildLocks,
}

impl Play {
    pub fn new(engine: Arc<dyn PlaybackEngine>, locks: GuildLocks) -> Self {
        Self { engine, locks }
    }
}

#[async_trait]
impl CommandHandler for Play {
    async fn execute(&self, ctx: &InteractionContext) -> Result<Reply, Error> {
        handle_play(ctx, self.engine.as_ref(), &self.locks).await
    }
}

/// Search for the query, make sure the guild has a connected queue, enqueue the best match
/// and start playback if nothing is playing.
pub async fn handle_play(
    ctx: &InteractionContext,
    engine: &dyn PlaybackEngine,
    locks: &GuildLocks,
) -> Result<Reply, Error> {
    let guild_id = ctx.guild_id.ok_or(MusicError::NotInGuild)?;

    let Some(query) = ctx
        .string_option("query")
        .map(str::trim)
        .filter(|query| !query.is_empty())
    else {
        return Ok(Reply::text(MISSING_QUERY).ephemeral());
    };
    info!("Received play command with query: {}", query);

    let result = engine
        .search(
            query,
            SearchOptions {
                requested_by: ctx.user_id,
                engine: SearchEngine::Auto,
            },
        )
        .await?;

    let Some(track) = result.first().cloned() else {
        info!("No results for query: {}", query);
        return Ok(Reply::text(NO_RESULTS));
    };

    // Everything from here on touches the guild's queue.
    let _guard = locks.lock(guild_id).await;

    let queue = engine
        .get_or_create_queue(
            guild_id,
            QueueOptions {
                metadata: QueueMetadata {
                    text_channel: ctx.channel_id,
                },
            },
        )
        .await;

    if !queue.is_connected().await {
        let joined = match ctx.voice_channel_id {
            Some(channel_id) => queue.connect(channel_id).await,
            None => Err(MusicError::UserNotInVoiceChannel),
        };

        if let Err(e) = joined {
            warn!("Could not join voice in guild {}: {}", guild_id, e);
            engine.delete_queue(guild_id).await;
            return Ok(Reply::text(COULD_NOT_JOIN));
        }
    }

    let index = queue.add_track(track.clone()).await;
    info!("Added track to queue: {}", track.title);

    // Earlier tracks may still be waiting at the cursor, so only claim "Playing" when the
    // new track is the one that started.
    if !queue.is_playing().await && queue.play().await? == Some(index) {
        return Ok(Reply::text(format!("🎶 Playing **{}**", track.title))
            .with_embed(ReplyEmbed::NowPlaying(track)));
    }

    let position = queue.position_of(index).await;
    Ok(
        Reply::text(format!("🎶 Queued **{}** at position #{}", track.title, position))
            .with_embed(ReplyEmbed::Queued { track, position }),
    )
}
