//! Slash-command dispatch for the gateway client

use serenity::{
    all::{
        CommandInteraction, Context, CreateInteractionResponse, CreateInteractionResponseMessage,
        EventHandler, Interaction, Ready, ResolvedValue, User,
    },
    async_trait,
};
use tracing::{error, info, warn};

use crate::{
    config::BotConfig,
    link::link_reply,
    presence::{DiscordUser, PresenceClient, listening_reply},
};

/// Name shown for a user: server nickname, then global display name, then username
pub fn display_name<'a>(nick: Option<&'a str>, global_name: Option<&'a str>, name: &'a str) -> &'a str {
    nick.or(global_name).unwrap_or(name)
}

fn discord_user(user: &User, nick: Option<&str>) -> DiscordUser {
    DiscordUser {
        id: user.id.get(),
        name: user.name.clone(),
        display_name: display_name(nick, user.global_name.as_deref(), &user.name).to_string(),
        avatar_url: user.face(),
    }
}

/// Handles `/listening` and `/link`
pub struct Handler {
    presence: PresenceClient,
    link_base: String,
}

impl Handler {
    pub fn new(presence: PresenceClient, link_base: impl Into<String>) -> Self {
        Self {
            presence,
            link_base: link_base.into(),
        }
    }

    /// Build the handler for a loaded configuration
    pub fn from_config(config: &BotConfig) -> anyhow::Result<Self> {
        Ok(Self::new(config.presence_client()?, config.link_base_url.clone()))
    }

    /// Reply to the command `name`; unknown commands get no reply
    pub async fn command_reply(
        &self,
        name: &str,
        requester: &DiscordUser,
        target: Option<&DiscordUser>,
    ) -> Option<CreateInteractionResponseMessage> {
        match name {
            "listening" => Some(listening_reply(&self.presence, requester, target).await),
            "link" => Some(link_reply(&self.link_base, requester)),
            other => {
                warn!("Ignoring unknown command /{}", other);
                None
            }
        }
    }

    async fn respond(&self, ctx: &Context, command: &CommandInteraction) {
        let nick = command.member.as_ref().and_then(|m| m.nick.as_deref());
        let requester = discord_user(&command.user, nick);
        let target = command
            .data
            .options()
            .into_iter()
            .find_map(|option| match option.value {
                ResolvedValue::User(user, member) => Some(discord_user(
                    user,
                    member.and_then(|m| m.nick.as_deref()),
                )),
                _ => None,
            });

        let Some(reply) = self
            .command_reply(&command.data.name, &requester, target.as_ref())
            .await
        else {
            return;
        };

        if let Err(e) = command
            .create_response(&ctx.http, CreateInteractionResponse::Message(reply))
            .await
        {
            error!("Failed to answer /{}: {}", command.data.name, e);
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Connected to Discord as {}", ready.user.name);
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            self.respond(&ctx, &command).await;
        }
    }
}
