//! Account-linking links

use serenity::{
    builder::{CreateEmbed, CreateInteractionResponseMessage},
    model::Colour,
};

use crate::presence::DiscordUser;

/// Web client URL that links `user` to a Muzeer account
pub fn link_url(link_base: &str, user: &DiscordUser) -> String {
    format!(
        "{}/profile?discordId={}&discordName={}",
        link_base.trim_end_matches('/'),
        user.id,
        urlencoding::encode(&user.name)
    )
}

/// `/link` reply; visible only to the requester
pub fn link_reply(link_base: &str, user: &DiscordUser) -> CreateInteractionResponseMessage {
    let embed = CreateEmbed::new()
        .title("🔗 Link your Muzeer Account")
        .color(Colour::from_rgb(59, 240, 209))
        .description(
            "Click the link below to securely connect your Discord account to Muzeer.",
        )
        .field(
            "Your Secure Link",
            format!("**[Click here to link accounts]({})**", link_url(link_base, user)),
            false,
        );

    CreateInteractionResponseMessage::new()
        .embed(embed)
        .ephemeral(true)
}
