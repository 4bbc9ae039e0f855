//! Process configuration, read from the environment (and `.env` via `dotenv`).

use std::env;
use std::process::ExitCode;
use thiserror::Error;

pub const DEFAULT_LOG_FILTER: &str = "rusty_jukebox=debug,warn";
const DEFAULT_YTDLP_PATH: &str = "yt-dlp";
const DEFAULT_SEARCH_RESULT_LIMIT: usize = 5;
const DEFAULT_ENABLED_COMMANDS: &str = "play";

/// Failures that stop the bot from starting.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Missing DISCORD_TOKEN")]
    MissingToken,

    #[error("No commands to load: ENABLED_COMMANDS is empty")]
    MissingCommandSource,

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("Discord client error: {0}")]
    Client(#[from] Box<serenity::Error>),
}

impl From<serenity::Error> for StartupError {
    fn from(value: serenity::Error) -> Self {
        StartupError::Client(Box::new(value))
    }
}

impl StartupError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            StartupError::MissingToken => ExitCode::from(2),
            StartupError::MissingCommandSource => ExitCode::from(3),
            StartupError::InvalidConfig(_) | StartupError::Client(_) => ExitCode::FAILURE,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub discord_token: String,
    pub enabled_commands: Vec<String>,
    pub ytdlp_path: String,
    pub search_result_limit: usize,
}

// Keep the token out of logs.
impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("discord_token", &"<redacted>")
            .field("enabled_commands", &self.enabled_commands)
            .field("ytdlp_path", &self.ytdlp_path)
            .field("search_result_limit", &self.search_result_limit)
            .finish()
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StartupError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let discord_token = get("DISCORD_TOKEN").ok_or(StartupError::MissingToken)?;

        let enabled_commands = lookup("ENABLED_COMMANDS")
            .unwrap_or_else(|| DEFAULT_ENABLED_COMMANDS.to_string())
            .split(',')
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();

        let ytdlp_path = get("YTDLP_PATH").unwrap_or_else(|| DEFAULT_YTDLP_PATH.to_string());

        let search_result_limit = match get("SEARCH_RESULT_LIMIT") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    return Err(StartupError::InvalidConfig(format!(
                        "SEARCH_RESULT_LIMIT must be a positive integer, got `{}`",
                        raw
                    )));
                }
            },
            None => DEFAULT_SEARCH_RESULT_LIMIT,
        };

        Ok(Self {
            discord_token,
            enabled_commands,
            ytdlp_path,
            search_result_limit,
        })
    }
}
