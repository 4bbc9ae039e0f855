//! Routes inbound command interactions to their registered handlers and is the single place
//! where handler failures are turned into a reply for the user.

use futures::FutureExt;
use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId, UserId};
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::registry::{CommandDescriptor, CommandRegistry};
use crate::Error;
use crate::commands::music::audio_sources::TrackMetadata;

pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong while running that command.";

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Unknown command `{0}`")]
    UnknownCommand(String),

    #[error("Command `{command}` failed: {source}")]
    Handler { command: String, source: Error },

    #[error("Command `{command}` panicked: {message}")]
    Panicked { command: String, message: String },
}

/// A typed option value supplied with a command invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
}

/// One user invocation of a command. Lives for the duration of a single dispatch.
#[derive(Debug, Clone)]
pub struct InteractionContext {
    pub command_name: String,
    pub options: HashMap<String, OptionValue>,
    pub user_id: UserId,
    pub user_name: String,
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    /// The invoking user's current voice channel, if they are in one.
    pub voice_channel_id: Option<ChannelId>,
}

impl InteractionContext {
    pub fn string_option(&self, name: &str) -> Option<&str> {
        match self.options.get(name) {
            Some(OptionValue::String(value)) => Some(value),
            _ => None,
        }
    }
}

/// Rich content attached to a reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyEmbed {
    NowPlaying(TrackMetadata),
    Queued { track: TrackMetadata, position: usize },
}

/// What a handler wants said back to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub content: String,
    pub embed: Option<ReplyEmbed>,
    pub ephemeral: bool,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            embed: None,
            ephemeral: false,
        }
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    pub fn with_embed(mut self, embed: ReplyEmbed) -> Self {
        self.embed = Some(embed);
        self
    }
}

/// The platform side of one interaction. Discord allows exactly one initial response
/// (a reply or a deferral); everything after that has to be a follow-up.
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    fn has_responded(&self) -> bool;

    async fn defer(&self) -> Result<(), Error>;

    async fn reply(&self, reply: Reply) -> Result<(), Error>;

    async fn follow_up(&self, reply: Reply) -> Result<(), Error>;
}

/// An inbound platform event, reduced to what the dispatcher cares about.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    Command(InteractionContext),
    /// Components, autocomplete, modals and anything else that is not a slash command.
    Unsupported(String),
}

pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub async fn on_interaction(&self, event: InboundEvent, responder: &dyn InteractionResponder) {
        let ctx = match event {
            InboundEvent::Command(ctx) => ctx,
            InboundEvent::Unsupported(kind) => {
                debug!("Ignoring {} interaction", kind);
                return;
            }
        };

        let Some(descriptor) = self.registry.lookup(&ctx.command_name) else {
            warn!("{}", DispatchError::UnknownCommand(ctx.command_name.clone()));
            return;
        };

        info!(
            "Received '{}' command from {} ({}) in guild {:?}",
            ctx.command_name, ctx.user_name, ctx.user_id, ctx.guild_id
        );

        let reply = match self.invoke(descriptor, &ctx, responder).await {
            Ok(reply) => {
                info!("Successfully resolved '{}' command.", ctx.command_name);
                reply
            }
            Err(e) => {
                error!("{}", e);
                Reply::text(GENERIC_ERROR_MESSAGE).ephemeral()
            }
        };

        if let Err(e) = Self::send(responder, reply).await {
            error!("Failed to respond to '{}': {}", ctx.command_name, e);
        }
    }

    async fn invoke(
        &self,
        descriptor: &CommandDescriptor,
        ctx: &InteractionContext,
        responder: &dyn InteractionResponder,
    ) -> Result<Reply, DispatchError> {
        let handler_error = |source: Error| DispatchError::Handler {
            command: descriptor.name.clone(),
            source,
        };

        if descriptor.defer {
            responder.defer().await.map_err(handler_error)?;
        }

        AssertUnwindSafe(descriptor.handler.execute(ctx))
            .catch_unwind()
            .await
            .map_err(|panic| DispatchError::Panicked {
                command: descriptor.name.clone(),
                message: panic_message(panic.as_ref()),
            })?
            .map_err(handler_error)
    }

    /// Send as the initial response if there has been none yet, otherwise as a follow-up.
    pub async fn send(responder: &dyn InteractionResponder, reply: Reply) -> Result<(), Error> {
        if responder.has_responded() {
            responder.follow_up(reply).await
        } else {
            responder.reply(reply).await
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
