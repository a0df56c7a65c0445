//! serenity glue.
//!
//! [`SerenityPlatform`] turns [`Reply`] values into serenity builders and
//! calls the HTTP API. [`GatewayHandler`] receives gateway events, converts
//! them into [`RawEvent`]s and hands each one to the dispatcher in its own
//! task, so the gateway loop never waits on a handler.

use super::dispatcher::Dispatcher;
use crate::errors::{Error, Result};
use crate::events::{ComponentEvent, MessageEvent, RawEvent, ReadyEvent, SlashEvent};
use crate::objects::{ArgValue, Args, Button, ButtonStyle, Embed, Message, ParamKind, Reply, Sender};
use crate::platform::{MessageRef, Origin, Platform};
use crate::registry::Command;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Discord allows at most this many buttons in one action row.
const BUTTONS_PER_ROW: usize = 5;

/// [`Platform`] backed by serenity's HTTP client.
#[derive(Debug, Clone)]
pub struct SerenityPlatform {
    http: Arc<serenity::Http>,
}

impl SerenityPlatform {
    /// Creates a platform authenticated with `token`.
    #[must_use]
    pub fn new(token: &str) -> Self {
        Self {
            http: Arc::new(serenity::Http::new(token)),
        }
    }

    /// The HTTP client, shared with the gateway handler.
    #[must_use]
    pub fn http(&self) -> Arc<serenity::Http> {
        Arc::clone(&self.http)
    }
}

#[async_trait]
impl Platform for SerenityPlatform {
    async fn respond(&self, origin: &Origin, reply: &Reply, followup: bool) -> Result<MessageRef> {
        match origin {
            Origin::Message {
                channel_id,
                message_id,
            } => {
                let channel = serenity::ChannelId::new(*channel_id);
                let builder = message_builder(reply)
                    .reference_message((channel, serenity::MessageId::new(*message_id)));
                let sent = channel.send_message(&*self.http, builder).await?;
                Ok(MessageRef::Channel {
                    channel_id: *channel_id,
                    message_id: sent.id.get(),
                })
            }
            Origin::Interaction { token, .. } if followup => {
                let sent = self
                    .http
                    .create_followup_message(token, &followup_builder(reply), vec![])
                    .await?;
                Ok(MessageRef::Followup {
                    token: token.clone(),
                    message_id: sent.id.get(),
                })
            }
            Origin::Interaction {
                interaction_id,
                token,
                ..
            } => {
                let response = serenity::CreateInteractionResponse::Message(response_builder(reply));
                self.http
                    .create_interaction_response(
                        serenity::InteractionId::new(*interaction_id),
                        token,
                        &response,
                        vec![],
                    )
                    .await?;
                Ok(MessageRef::OriginalResponse {
                    token: token.clone(),
                })
            }
        }
    }

    async fn defer(&self, origin: &Origin, hidden: bool) -> Result<()> {
        let Origin::Interaction {
            interaction_id,
            token,
            ..
        } = origin
        else {
            return Ok(());
        };
        let response = serenity::CreateInteractionResponse::Defer(
            serenity::CreateInteractionResponseMessage::new().ephemeral(hidden),
        );
        self.http
            .create_interaction_response(
                serenity::InteractionId::new(*interaction_id),
                token,
                &response,
                vec![],
            )
            .await?;
        Ok(())
    }

    async fn send(&self, channel_id: u64, reply: &Reply) -> Result<MessageRef> {
        let sent = serenity::ChannelId::new(channel_id)
            .send_message(&*self.http, message_builder(reply))
            .await?;
        Ok(MessageRef::Channel {
            channel_id,
            message_id: sent.id.get(),
        })
    }

    async fn delete(&self, message: &MessageRef) -> Result<()> {
        match message {
            MessageRef::Channel {
                channel_id,
                message_id,
            } => {
                self.http
                    .delete_message(
                        serenity::ChannelId::new(*channel_id),
                        serenity::MessageId::new(*message_id),
                        None,
                    )
                    .await?;
            }
            MessageRef::OriginalResponse { token } => {
                self.http.delete_original_interaction_response(token).await?;
            }
            MessageRef::Followup { token, message_id } => {
                self.http
                    .delete_followup_message(token, serenity::MessageId::new(*message_id))
                    .await?;
            }
        }
        Ok(())
    }

    async fn fetch_user(&self, user_id: u64) -> Result<Sender> {
        let user = serenity::UserId::new(user_id).to_user(&*self.http).await?;
        Ok(sender_from(&user))
    }
}

fn message_builder(reply: &Reply) -> serenity::CreateMessage {
    let mut builder = serenity::CreateMessage::new()
        .embeds(reply.embeds.iter().map(embed_builder).collect())
        .components(action_rows(&reply.buttons));
    if let Some(content) = &reply.content {
        builder = builder.content(content);
    }
    builder
}

fn response_builder(reply: &Reply) -> serenity::CreateInteractionResponseMessage {
    let mut builder = serenity::CreateInteractionResponseMessage::new()
        .embeds(reply.embeds.iter().map(embed_builder).collect())
        .components(action_rows(&reply.buttons))
        .ephemeral(reply.hidden);
    if let Some(content) = &reply.content {
        builder = builder.content(content);
    }
    builder
}

fn followup_builder(reply: &Reply) -> serenity::CreateInteractionResponseFollowup {
    let mut builder = serenity::CreateInteractionResponseFollowup::new()
        .embeds(reply.embeds.iter().map(embed_builder).collect())
        .components(action_rows(&reply.buttons))
        .ephemeral(reply.hidden);
    if let Some(content) = &reply.content {
        builder = builder.content(content);
    }
    builder
}

fn embed_builder(embed: &Embed) -> serenity::CreateEmbed {
    let mut builder = serenity::CreateEmbed::new();
    if let Some(title) = &embed.title {
        builder = builder.title(title);
    }
    if let Some(description) = &embed.description {
        builder = builder.description(description);
    }
    if let Some(color) = embed.color {
        builder = builder.colour(color.value());
    }
    for field in &embed.fields {
        builder = builder.field(&field.name, &field.value, field.inline);
    }
    if let Some(footer) = &embed.footer {
        builder = builder.footer(serenity::CreateEmbedFooter::new(footer));
    }
    if let Some(thumbnail) = &embed.thumbnail {
        builder = builder.thumbnail(thumbnail);
    }
    builder
}

const fn button_style(style: ButtonStyle) -> serenity::ButtonStyle {
    match style {
        ButtonStyle::Primary => serenity::ButtonStyle::Primary,
        ButtonStyle::Secondary => serenity::ButtonStyle::Secondary,
        ButtonStyle::Success => serenity::ButtonStyle::Success,
        ButtonStyle::Danger => serenity::ButtonStyle::Danger,
    }
}

fn action_rows(buttons: &[Button]) -> Vec<serenity::CreateActionRow> {
    buttons
        .chunks(BUTTONS_PER_ROW)
        .map(|row| {
            serenity::CreateActionRow::Buttons(
                row.iter()
                    .map(|button| {
                        serenity::CreateButton::new(&button.custom_id)
                            .label(&button.label)
                            .style(button_style(button.style))
                            .disabled(button.disabled)
                    })
                    .collect(),
            )
        })
        .collect()
}

fn sender_from(user: &serenity::User) -> Sender {
    let sender = Sender::new(user.id.get(), user.name.clone());
    match user.avatar_url() {
        Some(url) => sender.with_avatar(url),
        None => sender,
    }
}

const fn option_type(kind: ParamKind) -> serenity::CommandOptionType {
    match kind {
        ParamKind::String => serenity::CommandOptionType::String,
        ParamKind::Integer => serenity::CommandOptionType::Integer,
        ParamKind::Number => serenity::CommandOptionType::Number,
        ParamKind::Boolean => serenity::CommandOptionType::Boolean,
        ParamKind::User => serenity::CommandOptionType::User,
        ParamKind::Channel => serenity::CommandOptionType::Channel,
        ParamKind::Role => serenity::CommandOptionType::Role,
    }
}

/// Builds the slash menu entry for a registered command.
fn command_schema(command: &Command) -> serenity::CreateCommand {
    command.params.iter().fold(
        serenity::CreateCommand::new(&command.name).description(&command.description),
        |builder, param| {
            builder.add_option(
                serenity::CreateCommandOption::new(
                    option_type(param.kind),
                    &param.name,
                    &param.description,
                )
                .required(param.required),
            )
        },
    )
}

fn slash_args(command: &serenity::CommandInteraction) -> Args {
    let mut args = Args::new();
    for option in command.data.options() {
        let value = match option.value {
            serenity::ResolvedValue::String(s) => ArgValue::String(s.to_string()),
            serenity::ResolvedValue::Integer(i) => ArgValue::Integer(i),
            serenity::ResolvedValue::Number(n) => ArgValue::Number(n),
            serenity::ResolvedValue::Boolean(b) => ArgValue::Boolean(b),
            serenity::ResolvedValue::User(user, _) => ArgValue::User(sender_from(user)),
            serenity::ResolvedValue::Channel(channel) => ArgValue::Channel(channel.id.get()),
            serenity::ResolvedValue::Role(role) => ArgValue::Role(role.id.get()),
            _ => {
                debug!(option = option.name, "Skipping unsupported option type");
                continue;
            }
        };
        args.insert(option.name, value);
    }
    args
}

fn component_event(component: &serenity::ComponentInteraction) -> ComponentEvent {
    let carrier = &component.message;
    ComponentEvent {
        interaction_id: component.id.get(),
        token: component.token.clone(),
        channel_id: component.channel_id.get(),
        user: sender_from(&component.user),
        custom_id: component.data.custom_id.clone(),
        message: Some(Message {
            channel_id: carrier.channel_id.get(),
            id: carrier.id.get(),
            content: carrier.content.clone(),
            author: Some(sender_from(&carrier.author)),
        }),
    }
}

/// Receives gateway events and forwards them to a [`Dispatcher`].
pub struct GatewayHandler {
    dispatcher: Dispatcher,
    http: Arc<serenity::Http>,
}

impl GatewayHandler {
    /// `http` must be the client the dispatcher's platform replies through;
    /// it learns the application id on ready.
    #[must_use]
    pub const fn new(dispatcher: Dispatcher, http: Arc<serenity::Http>) -> Self {
        Self { dispatcher, http }
    }

    async fn register_slash_commands(&self, ctx: &serenity::Context) {
        let schemas: Vec<_> = self
            .dispatcher
            .registry()
            .slash_commands()
            .map(|command| command_schema(command))
            .collect();
        let count = schemas.len();
        match serenity::Command::set_global_commands(ctx, schemas).await {
            Ok(_) => info!("Registered {count} slash commands"),
            Err(e) => error!("Failed to register slash commands: {e}"),
        }
    }
}

#[async_trait]
impl serenity::EventHandler for GatewayHandler {
    async fn ready(&self, ctx: serenity::Context, ready: serenity::Ready) {
        self.http.set_application_id(ready.application.id);
        self.register_slash_commands(&ctx).await;
        self.dispatcher.spawn(RawEvent::Ready(ReadyEvent {
            user: sender_from(&ready.user),
            session_id: ready.session_id.clone(),
        }));
    }

    async fn message(&self, _ctx: serenity::Context, msg: serenity::Message) {
        self.dispatcher.spawn(RawEvent::Message(MessageEvent {
            channel_id: msg.channel_id.get(),
            message_id: msg.id.get(),
            author: sender_from(&msg.author),
            author_is_bot: msg.author.bot,
            content: msg.content,
        }));
    }

    async fn interaction_create(&self, _ctx: serenity::Context, interaction: serenity::Interaction) {
        let event = match &interaction {
            serenity::Interaction::Command(command) => RawEvent::Slash(SlashEvent {
                interaction_id: command.id.get(),
                token: command.token.clone(),
                channel_id: command.channel_id.get(),
                user: sender_from(&command.user),
                name: command.data.name.clone(),
                args: slash_args(command),
            }),
            serenity::Interaction::Component(component) => {
                RawEvent::Component(component_event(component))
            }
            other => {
                debug!(kind = ?other.kind(), "Ignoring interaction");
                return;
            }
        };
        self.dispatcher.spawn(event);
    }
}

/// Connects to the gateway and feeds events to `dispatcher` until the client stops.
pub async fn serve(token: &str, dispatcher: Dispatcher, http: Arc<serenity::Http>) -> Result<()> {
    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(token, intents)
        .event_handler(GatewayHandler::new(dispatcher, http))
        .await
        .inspect_err(|e| error!("Failed to build Discord client: {e}"))?;

    info!("Connecting to Discord");
    client.start().await.map_err(|e| {
        warn!("Discord client stopped: {e}");
        Error::from(e)
    })
}
