use dotenv::dotenv;
use serenity::all::{Client, GatewayIntents};
use songbird::{SerenityInit, Songbird};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rusty_jukebox::HTTP_CLIENT;
use rusty_jukebox::commands::BuiltinCommands;
use rusty_jukebox::commands::dispatcher::Dispatcher;
use rusty_jukebox::commands::music::audio_sources::ExtractorRegistry;
use rusty_jukebox::commands::music::utils::guild_locks::GuildLocks;
use rusty_jukebox::commands::music::utils::music_manager::{MusicPlayer, PlaybackEngine};
use rusty_jukebox::commands::music::utils::voice_driver::SongbirdDriver;
use rusty_jukebox::commands::registry::CommandRegistry;
use rusty_jukebox::config::{BotConfig, DEFAULT_LOG_FILTER, StartupError};
use rusty_jukebox::events::Handler;

#[tokio::main]
async fn main() -> ExitCode {
    // Load before tracing so RUST_LOG can come from .env
    dotenv().ok();

    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            e.exit_code()
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let config = BotConfig::from_env()?;
    info!("Starting with {:?}", config);

    let songbird = Songbird::serenity();
    let voice = Arc::new(SongbirdDriver::new(Arc::clone(&songbird), HTTP_CLIENT.clone()));
    let sources = ExtractorRegistry::youtube(config.ytdlp_path.clone(), config.search_result_limit);
    let engine: Arc<dyn PlaybackEngine> = Arc::new(MusicPlayer::new(sources, voice));

    let locks = GuildLocks::new();
    let source = BuiltinCommands::new(
        config.enabled_commands.clone(),
        Arc::clone(&engine),
        locks.clone(),
    );
    let registry = CommandRegistry::load(&source)?;
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(registry)));

    // GUILDS and GUILD_VOICE_STATES are both non-privileged; the cache needs them to find
    // the caller's voice channel.
    let intents = GatewayIntents::non_privileged();

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(Handler::new(dispatcher, engine, locks))
        .register_songbird_with(songbird)
        .await?;

    client.start().await?;
    Ok(())
}
