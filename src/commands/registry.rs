//! The set of slash commands the bot serves, built once at startup and shared read-only.

use regex::Regex;
use serenity::all::{CommandOptionType, CreateCommand, CreateCommandOption};
use serenity::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};
use thiserror::Error;
use tracing::{info, warn};

use super::dispatcher::{InteractionContext, Reply};
use crate::Error;
use crate::config::StartupError;

/// Discord's rule for chat input command and option names.
static COMMAND_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-_\p{Ll}\p{Lo}\p{N}]{1,32}$").expect("valid regex"));

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Command `{0}` is already registered")]
    Duplicate(String),

    #[error("`{0}` is not a valid command name")]
    InvalidName(String),
}

/// The body of a command.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(&self, ctx: &InteractionContext) -> Result<Reply, Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl From<OptionKind> for CommandOptionType {
    fn from(kind: OptionKind) -> Self {
        match kind {
            OptionKind::String => CommandOptionType::String,
            OptionKind::Integer => CommandOptionType::Integer,
            OptionKind::Number => CommandOptionType::Number,
            OptionKind::Boolean => CommandOptionType::Boolean,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub kind: OptionKind,
}

impl OptionSpec {
    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: false,
            kind: OptionKind::String,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// A registered command. Immutable once it is in the registry.
#[derive(Clone)]
pub struct CommandDescriptor {
    pub name: String,
    pub description: String,
    pub options: Vec<OptionSpec>,
    pub handler: Arc<dyn CommandHandler>,
    /// Acknowledge the interaction before running the handler. Needed for anything that
    /// may take longer than Discord's three second response window.
    pub defer: bool,
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("options", &self.options)
            .field("defer", &self.defer)
            .finish_non_exhaustive()
    }
}

impl CommandDescriptor {
    /// The slash command definition published to Discord.
    pub fn to_create_command(&self) -> CreateCommand {
        self.options.iter().fold(
            CreateCommand::new(&self.name).description(&self.description),
            |command, option| {
                command.add_option(
                    CreateCommandOption::new(option.kind.into(), &option.name, &option.description)
                        .required(option.required),
                )
            },
        )
    }
}

/// A command as produced by a [`CommandSource`], before validation.
#[derive(Clone, Default)]
pub struct CommandEntry {
    pub name: Option<String>,
    pub description: String,
    pub options: Vec<OptionSpec>,
    pub handler: Option<Arc<dyn CommandHandler>>,
    pub defer: bool,
}

impl CommandEntry {
    fn into_descriptor(self) -> Result<CommandDescriptor, &'static str> {
        let name = self.name.ok_or("missing a name")?;
        let handler = self.handler.ok_or("missing a handler")?;
        Ok(CommandDescriptor {
            name,
            description: self.description,
            options: self.options,
            handler,
            defer: self.defer,
        })
    }
}

/// Where the registry's commands come from.
pub trait CommandSource {
    fn discover(&self) -> Result<Vec<CommandEntry>, StartupError>;
}

#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<CommandDescriptor>,
    by_name: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a source. Broken or duplicate entries are skipped with a
    /// warning; only a failing source is an error.
    pub fn load(source: &dyn CommandSource) -> Result<Self, StartupError> {
        let mut registry = Self::new();

        for (index, entry) in source.discover()?.into_iter().enumerate() {
            let label = entry
                .name
                .clone()
                .unwrap_or_else(|| format!("<entry #{}>", index));

            let descriptor = match entry.into_descriptor() {
                Ok(descriptor) => descriptor,
                Err(reason) => {
                    warn!("Skipping command {}: {}", label, reason);
                    continue;
                }
            };

            if let Err(e) = registry.register(descriptor) {
                warn!("Skipping command {}: {}", label, e);
            }
        }

        info!(
            "Loaded {} command(s): {:?}",
            registry.len(),
            registry.all().map(|c| c.name.as_str()).collect::<Vec<_>>()
        );
        Ok(registry)
    }

    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        if !COMMAND_NAME.is_match(&descriptor.name) {
            return Err(RegistryError::InvalidName(descriptor.name));
        }
        if self.by_name.contains_key(&descriptor.name) {
            return Err(RegistryError::Duplicate(descriptor.name));
        }

        self.by_name
            .insert(descriptor.name.clone(), self.commands.len());
        self.commands.push(descriptor);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandDescriptor> {
        self.by_name.get(name).map(|&index| &self.commands[index])
    }

    /// Every command in registration order.
    pub fn all(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
