//! Discord-facing presence bridge for Muzeer
//!
//! Turns the `/listening` and `/link` slash commands into rendered replies.
//! `/listening` asks the Muzeer API what a linked account is playing;
//! `/link` builds an account-linking URL locally and never touches the
//! network. [`Handler`] answers both commands on a serenity gateway client;
//! registering the commands with Discord happens outside this crate.

pub mod config;
pub mod error;
pub mod handler;
pub mod link;
pub mod presence;

pub use config::BotConfig;
pub use error::BotError;
pub use handler::Handler;
pub use link::{link_reply, link_url};
pub use presence::{DiscordUser, ListeningLookup, PresenceClient, listening_reply};
