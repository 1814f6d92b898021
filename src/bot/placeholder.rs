//! Placeholder message lifecycle.
//!
//! Each turn sends one "processing" message and must resolve it exactly once:
//! delete it when media goes out, or edit it into the failure text. `edit`
//! and `delete` consume the handle so a second terminal action cannot compile.

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId};
use tracing::warn;

/// Handle to the "processing…" message of one conversation turn.
#[derive(Debug)]
pub struct Placeholder {
    chat_id: ChatId,
    message_id: MessageId,
}

impl Placeholder {
    /// Send the placeholder and capture its handle.
    ///
    /// # Errors
    ///
    /// Propagates the Telegram send error; the turn cannot proceed without
    /// a placeholder to resolve.
    pub async fn send(bot: &Bot, chat_id: ChatId, text: &str) -> Result<Self> {
        let message = bot.send_message(chat_id, text).await?;
        Ok(Self {
            chat_id,
            message_id: message.id,
        })
    }

    /// Non-terminal progress edit (two-step interstitial). Failure to update
    /// progress is logged but does not abort the turn.
    pub async fn update(&self, bot: &Bot, text: &str) {
        if let Err(e) = bot
            .edit_message_text(self.chat_id, self.message_id, text)
            .await
        {
            warn!("Failed to update placeholder: {e}");
        }
    }

    /// Terminal action: edit the placeholder into its final text.
    ///
    /// # Errors
    ///
    /// Propagates the Telegram edit error.
    pub async fn edit(self, bot: &Bot, text: &str) -> Result<()> {
        bot.edit_message_text(self.chat_id, self.message_id, text)
            .await?;
        Ok(())
    }

    /// Terminal action: delete the placeholder after media was delivered.
    ///
    /// # Errors
    ///
    /// Propagates the Telegram delete error.
    pub async fn delete(self, bot: &Bot) -> Result<()> {
        bot.delete_message(self.chat_id, self.message_id).await?;
        Ok(())
    }
}
