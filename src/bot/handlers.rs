//! Command and message handlers.
//!
//! `handle_prompt` drives one conversation turn end to end: validate input,
//! send the placeholder, run the upstream pipeline, then resolve the
//! placeholder with exactly one terminal action.

use crate::bot::placeholder::Placeholder;
use crate::bot::texts;
use crate::config::{VariantMode, VariantProfile};
use crate::upstream::{MediaKind, MediaReply, Staged, TurnError, UpstreamClient};
use crate::validate::is_valid_url;
use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, ParseMode};
use teloxide::utils::command::BotCommands;
use tracing::{error, info};

/// Supported bot commands
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Welcome message
    #[command(description = "show the welcome message.")]
    Start,
    /// Usage help
    #[command(description = "how to use this bot.")]
    Help,
}

/// Process-wide context shared by all conversation turns.
/// Holds no mutable state; turns are independent.
pub struct BotContext {
    /// Deployment variant configuration
    pub profile: VariantProfile,
    /// Upstream API client
    pub upstream: UpstreamClient,
}

/// Handle `/start`.
///
/// # Errors
///
/// Propagates the Telegram send error.
pub async fn start(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, texts::WELCOME_HTML)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Handle `/help`.
///
/// # Errors
///
/// Propagates the Telegram send error.
pub async fn help(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, texts::HELP_MARKDOWN)
        .parse_mode(ParseMode::Markdown)
        .await?;
    Ok(())
}

/// Handle a plain text message: one full conversation turn.
///
/// Every failure is converted to a user-visible message here; nothing from a
/// single turn can take down the polling loop.
///
/// # Errors
///
/// Returns an error only when Telegram itself rejects the terminal
/// send/edit/delete; upstream failures are absorbed into the reply.
pub async fn handle_prompt(bot: Bot, msg: Message, ctx: Arc<BotContext>) -> Result<()> {
    let Some(text) = msg.text().map(ToString::to_string) else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    // Download variant refuses non-links before any network call is made.
    if ctx.profile.mode == VariantMode::Download && !is_valid_url(&text) {
        info!(input = %text, "rejected input that is not a link");
        bot.send_message(chat_id, texts::usage_hint(&ctx.profile))
            .await?;
        return Ok(());
    }

    let placeholder =
        Placeholder::send(&bot, chat_id, texts::placeholder_text(&ctx.profile)).await?;

    match run_turn(&bot, &ctx, &placeholder, &text).await {
        Ok(reply) => {
            let size = reply.bytes.len();
            if let Err(e) = deliver(&bot, chat_id, &ctx, reply, &text).await {
                let failure = TurnError::MediaDelivery(e.to_string());
                error!(input = %text, size, error = %e, "media delivery failed");
                placeholder.edit(&bot, &texts::failure_text(&failure)).await?;
            } else {
                placeholder.delete(&bot).await?;
                info!(input = %text, size, "media sent");
            }
        }
        Err(failure) => {
            error!(input = %text, error = %failure, "turn failed");
            placeholder.edit(&bot, &texts::failure_text(&failure)).await?;
        }
    }

    Ok(())
}

/// Dispatch, normalize and resolve; runs the second stage of the two-step
/// protocol after notifying the user via the placeholder.
async fn run_turn(
    bot: &Bot,
    ctx: &BotContext,
    placeholder: &Placeholder,
    text: &str,
) -> Result<MediaReply, TurnError> {
    match ctx.upstream.begin(text).await? {
        Staged::Ready(reply) => Ok(reply),
        Staged::Pending(pending) => {
            placeholder.update(bot, texts::DOWNLOADING_NOTICE).await;
            ctx.upstream.complete(pending).await
        }
    }
}

async fn deliver(
    bot: &Bot,
    chat_id: ChatId,
    ctx: &BotContext,
    reply: MediaReply,
    user_text: &str,
) -> Result<()> {
    let caption = texts::caption(&ctx.profile, reply.kind, user_text);
    match reply.kind {
        MediaKind::Video => {
            bot.send_video(chat_id, InputFile::memory(reply.bytes).file_name("video.mp4"))
                .caption(caption)
                .await?;
        }
        MediaKind::Photo => {
            bot.send_photo(chat_id, InputFile::memory(reply.bytes).file_name("photo.jpg"))
                .caption(caption)
                .await?;
        }
    }
    Ok(())
}
