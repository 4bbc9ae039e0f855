//! This module aggregates the bot's commands and the machinery that routes interactions to them.

/// Routing of inbound interactions to command handlers.
pub mod dispatcher;
/// Music playback commands and the playback engine behind them.
pub mod music;
/// The command registry and its loading rules.
pub mod registry;

use std::sync::Arc;
use tracing::warn;

use crate::config::StartupError;
use music::utils::{guild_locks::GuildLocks, music_manager::PlaybackEngine};
use registry::{CommandEntry, CommandSource};

/// Names of every command compiled into the bot.
pub const BUILTIN_COMMANDS: &[&str] = &["play"];

/// The commands compiled into the binary, filtered by the configured list of enabled names.
pub struct BuiltinCommands {
    enabled: Vec<String>,
    engine: Arc<dyn PlaybackEngine>,
    locks: GuildLocks,
}

impl BuiltinCommands {
    pub fn new(enabled: Vec<String>, engine: Arc<dyn PlaybackEngine>, locks: GuildLocks) -> Self {
        Self {
            enabled,
            engine,
            locks,
        }
    }
}

impl CommandSource for BuiltinCommands {
    fn discover(&self) -> Result<Vec<CommandEntry>, StartupError> {
        if self.enabled.is_empty() {
            return Err(StartupError::MissingCommandSource);
        }

        Ok(self
            .enabled
            .iter()
            .map(|name| match name.as_str() {
                "play" => music::play::play(Arc::clone(&self.engine), self.locks.clone()),
                unknown => {
                    warn!(
                        "No built-in command named `{}` (available: {:?})",
                        unknown, BUILTIN_COMMANDS
                    );
                    // Without a handler the registry drops it during loading.
                    CommandEntry {
                        name: Some(unknown.to_string()),
                        ..Default::default()
                    }
                }
            })
            .collect())
    }
}
