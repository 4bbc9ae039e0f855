use serenity::all::{
    Command, CommandInteraction, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, Interaction, ResolvedValue,
};
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::gateway::Ready;
use serenity::model::voice::VoiceState;
use serenity::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info};

use crate::Error;
use crate::commands::dispatcher::{
    Dispatcher, InboundEvent, InteractionContext, InteractionResponder, OptionValue, Reply,
    ReplyEmbed,
};
use crate::commands::music::utils::{
    embedded_messages,
    guild_locks::GuildLocks,
    music_manager::{self, PlaybackEngine},
};

/// Serenity event handler: feeds interactions to the dispatcher, publishes the command set
/// on ready, and drops a guild's queue when the bot is disconnected from voice.
pub struct Handler {
    dispatcher: Arc<Dispatcher>,
    engine: Arc<dyn PlaybackEngine>,
    locks: GuildLocks,
}

impl Handler {
    /// `locks` must be the same set the play command holds.
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        engine: Arc<dyn PlaybackEngine>,
        locks: GuildLocks,
    ) -> Self {
        Self {
            dispatcher,
            engine,
            locks,
        }
    }
}

#[async_trait]
impl serenity::prelude::EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Logged in as {}", ready.user.name);

        let commands = self
            .dispatcher
            .registry()
            .all()
            .map(|descriptor| descriptor.to_create_command())
            .collect();

        match Command::set_global_commands(&ctx.http, commands).await {
            Ok(published) => info!("Registered {} global command(s)", published.len()),
            Err(e) => error!("Failed to register global commands: {}", e),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command) => {
                let event = InboundEvent::Command(interaction_context(&ctx, &command));
                let responder = SerenityResponder::new(ctx.http.clone(), command);
                self.dispatcher.on_interaction(event, &responder).await;
            }
            other => {
                let event = InboundEvent::Unsupported(format!("{:?}", other.kind()));
                self.dispatcher.on_interaction(event, &NoResponder).await;
            }
        }
    }

    async fn voice_state_update(&self, ctx: Context, _old: Option<VoiceState>, new: VoiceState) {
        if new.user_id != ctx.cache.current_user().id || new.channel_id.is_some() {
            return;
        }

        if let Some(guild_id) = new.guild_id {
            info!("Disconnected from voice in guild {}", guild_id);
            music_manager::release_guild(self.engine.as_ref(), &self.locks, guild_id).await;
        }
    }
}

/// Build the dispatcher's view of a slash command invocation.
fn interaction_context(ctx: &Context, command: &CommandInteraction) -> InteractionContext {
    let options: HashMap<String, OptionValue> = command
        .data
        .options()
        .into_iter()
        .filter_map(|option| {
            let value = match option.value {
                ResolvedValue::String(value) => OptionValue::String(value.to_string()),
                ResolvedValue::Integer(value) => OptionValue::Integer(value),
                ResolvedValue::Number(value) => OptionValue::Number(value),
                ResolvedValue::Boolean(value) => OptionValue::Boolean(value),
                _ => return None,
            };
            Some((option.name.to_string(), value))
        })
        .collect();

    let user_id = command.user.id;
    let voice_channel_id = command.guild_id.and_then(|guild_id| {
        let guild = ctx.cache.guild(guild_id)?;
        guild.voice_states.get(&user_id)?.channel_id
    });

    InteractionContext {
        command_name: command.data.name.clone(),
        options,
        user_id,
        user_name: command.user.name.clone(),
        guild_id: command.guild_id,
        channel_id: command.channel_id,
        voice_channel_id,
    }
}

/// Answers one slash command interaction, remembering whether the initial response is spent.
pub struct SerenityResponder {
    http: Arc<Http>,
    interaction: CommandInteraction,
    responded: AtomicBool,
}

impl SerenityResponder {
    pub fn new(http: Arc<Http>, interaction: CommandInteraction) -> Self {
        Self {
            http,
            interaction,
            responded: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl InteractionResponder for SerenityResponder {
    fn has_responded(&self) -> bool {
        self.responded.load(Ordering::SeqCst)
    }

    async fn defer(&self) -> Result<(), Error> {
        self.interaction.defer(&*self.http).await?;
        self.responded.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn reply(&self, reply: Reply) -> Result<(), Error> {
        let mut message = CreateInteractionResponseMessage::new()
            .content(&reply.content)
            .ephemeral(reply.ephemeral);
        if let Some(embed) = &reply.embed {
            message = message.embed(reply_embed(embed));
        }

        self.interaction
            .create_response(&*self.http, CreateInteractionResponse::Message(message))
            .await?;
        self.responded.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn follow_up(&self, reply: Reply) -> Result<(), Error> {
        let mut message = CreateInteractionResponseFollowup::new()
            .content(&reply.content)
            .ephemeral(reply.ephemeral);
        if let Some(embed) = &reply.embed {
            message = message.embed(reply_embed(embed));
        }

        self.interaction
            .create_followup(&*self.http, message)
            .await?;
        Ok(())
    }
}

fn reply_embed(embed: &ReplyEmbed) -> serenity::all::CreateEmbed {
    match embed {
        ReplyEmbed::NowPlaying(track) => embedded_messages::now_playing(track),
        ReplyEmbed::Queued { track, position } => embedded_messages::added_to_queue(track, *position),
    }
}

/// Stand-in for interactions the bot never answers.
struct NoResponder;

#[async_trait]
impl InteractionResponder for NoResponder {
    fn has_responded(&self) -> bool {
        false
    }

    async fn defer(&self) -> Result<(), Error> {
        Ok(())
    }

    async fn reply(&self, _reply: Reply) -> Result<(), Error> {
        debug!("Dropping reply to an unsupported interaction");
        Ok(())
    }

    async fn follow_up(&self, _reply: Reply) -> Result<(), Error> {
        debug!("Dropping follow-up to an unsupported interaction");
        Ok(())
    }
}
