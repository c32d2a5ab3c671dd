//! Update handlers
//!
//! Relays incoming media back into the chat with a tagging keyboard,
//! collects albums through the aggregator, and applies the tags the web
//! form sends back.

use crate::transport::{is_message_not_modified_error, BotApi, OutgoingMedia};
use crate::update::{IncomingMessage, Route};
use aggregator::{Aggregator, Item, SettleOutcome};
use anyhow::{Context, Result};
use rt_core::{web_app_url, BotConfig, WebAppData};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Text of the placeholder and keyboard messages
pub const MARKUP_TEXT: &str = "* * *";
/// Label of the web-app button
pub const TAG_BUTTON_TEXT: &str = "#tag";

/// Buffered album member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMedia {
    pub chat_id: i64,
    pub message_id: i64,
    pub file_id: String,
}

/// Routes updates to the relay flows
pub struct Handler<B> {
    bot: Arc<B>,
    config: Arc<BotConfig>,
    aggregator: Aggregator<GroupMedia>,
}

impl<B> Clone for Handler<B> {
    fn clone(&self) -> Self {
        Self {
            bot: Arc::clone(&self.bot),
            config: Arc::clone(&self.config),
            aggregator: self.aggregator.clone(),
        }
    }
}

impl<B: BotApi + 'static> Handler<B> {
    pub fn new(bot: Arc<B>, config: BotConfig, aggregator: Aggregator<GroupMedia>) -> Self {
        Self {
            bot,
            config: Arc::new(config),
            aggregator,
        }
    }

    pub fn aggregator(&self) -> &Aggregator<GroupMedia> {
        &self.aggregator
    }

    /// Handle one update
    ///
    /// Album members return as soon as they are buffered; the relay runs
    /// later on the aggregator's settle task.
    pub async fn dispatch(&self, msg: &IncomingMessage) -> Result<()> {
        match msg.route() {
            Route::Ping => self.handle_ping(msg).await,
            Route::WebAppData => self.handle_web_app_data(msg).await,
            Route::MediaGroupItem => {
                self.receive_group_item(msg)?;
                Ok(())
            }
            Route::SingleMedia => self.relay_single(msg).await,
            Route::Ignored => {
                debug!("Ignoring message {}", msg.message_id);
                Ok(())
            }
        }
    }

    /// Buffer an album member and arm its settle check
    pub fn receive_group_item(&self, msg: &IncomingMessage) -> Result<JoinHandle<SettleOutcome>> {
        let group_key = msg
            .media_group_id
            .clone()
            .context("message has no media group id")?;
        let (kind, file_id) = msg.media().context("message carries no media")?;

        info!("Receiving group {}, current file {}", group_key, file_id);
        let item = Item::new(
            group_key,
            msg.message_id,
            kind,
            GroupMedia {
                chat_id: msg.chat_id,
                message_id: msg.message_id,
                file_id: file_id.to_string(),
            },
        );

        let handler = self.clone();
        Ok(self
            .aggregator
            .report_arrival(item, move |key| async move { handler.relay_media_group(&key).await }))
    }

    /// Take a settled album out of the buffer and relay it
    ///
    /// The group leaves the buffer before any network call, whether or not
    /// the relay succeeds. A member arriving mid-relay starts a new group
    /// under the same key and is relayed by its own settle check.
    pub async fn relay_media_group(&self, group_key: &str) -> Result<()> {
        let items = self.aggregator.take(group_key);
        debug!("Took group {} ({} items)", group_key, items.len());
        self.relay_album(group_key, &items).await
    }

    async fn relay_album(&self, group_key: &str, items: &[Item<GroupMedia>]) -> Result<()> {
        let Some(first) = items.first() else {
            warn!("Group {} was empty when relaying", group_key);
            return Ok(());
        };
        let chat_id = first.payload.chat_id;

        info!("Responding with media group {}", group_key);
        let mut album = Vec::with_capacity(items.len());
        for item in items {
            if item.kind.allowed_in_album() {
                album.push(OutgoingMedia::new(item.kind, item.payload.file_id.clone()));
            } else {
                error!(
                    "Unhandled media type {} in group {} (message {})",
                    item.kind, group_key, item.payload.message_id
                );
            }
        }
        if album.is_empty() {
            anyhow::bail!("group {} has no media that can be sent as an album", group_key);
        }

        let sent = self
            .bot
            .send_media_group(chat_id, &album)
            .await
            .with_context(|| format!("failed to relay media group {}", group_key))?;
        info!("Media group {} sent as {:?}", group_key, sent);

        self.send_web_app_markup(chat_id, &sent)
            .await
            .with_context(|| format!("failed to send web app markup for group {}", group_key))?;

        // Every original goes, including members that were not relayed
        let originals: Vec<i64> = items.iter().map(|item| item.payload.message_id).collect();
        if let Err(e) = self.bot.delete_messages(chat_id, &originals).await {
            error!("Did not remove group {} originals: {:#}", group_key, e);
        } else {
            info!("Removed media group {} originals", group_key);
        }
        Ok(())
    }

    /// Relay a standalone photo, video or animation
    pub async fn relay_single(&self, msg: &IncomingMessage) -> Result<()> {
        let (kind, file_id) = msg.media().context("message carries no media")?;
        info!("Received {} {}", kind, msg.message_id);

        let sent = self
            .bot
            .send_media(msg.chat_id, &OutgoingMedia::new(kind, file_id))
            .await
            .with_context(|| format!("failed to reply with {}", kind))?;

        self.send_web_app_markup(msg.chat_id, &[sent])
            .await
            .context("failed to reply with web app markup")?;
        info!("{} reply success {}", kind, sent);

        if let Err(e) = self.bot.delete_message(msg.chat_id, msg.message_id).await {
            warn!("Failed to delete original message {}: {:#}", msg.message_id, e);
        }
        Ok(())
    }

    /// Attach the tagging keyboard for the relayed `media_ids`
    ///
    /// The keyboard URL must carry the id of the keyboard message itself,
    /// which is only known after sending. A placeholder is sent first and
    /// the keyboard is assumed to take the next id.
    pub async fn send_web_app_markup(&self, chat_id: i64, media_ids: &[i64]) -> Result<()> {
        info!("Sending web app markup for {:?}", media_ids);

        let placeholder = self
            .bot
            .send_message(chat_id, MARKUP_TEXT)
            .await
            .context("failed to send markup placeholder")?;

        let url = web_app_url(
            &self.config.web_app_url,
            &self.config.token,
            placeholder + 1,
            media_ids,
        );
        self.bot
            .send_web_app_keyboard(chat_id, MARKUP_TEXT, TAG_BUTTON_TEXT, &url)
            .await
            .context("failed to send web app keyboard")?;

        self.bot
            .delete_message(chat_id, placeholder)
            .await
            .context("failed to delete markup placeholder")?;

        info!("Web app markup sent for {:?}", media_ids);
        Ok(())
    }

    /// Apply tags picked in the web form
    pub async fn handle_web_app_data(&self, msg: &IncomingMessage) -> Result<()> {
        let raw = msg
            .web_app_data
            .as_deref()
            .context("message carries no web app data")?;
        info!("Received web app data {}: {}", msg.message_id, raw);

        let selection = WebAppData::parse(raw)
            .and_then(WebAppData::into_selection)
            .context("invalid web app data")?;

        let caption = selection.caption();
        match self
            .bot
            .edit_caption(msg.chat_id, selection.caption_target(), &caption)
            .await
        {
            Ok(()) => {}
            Err(e) if is_message_not_modified_error(&e) => {
                debug!("Caption of {} already up to date", selection.caption_target());
            }
            Err(e) => return Err(e.context("failed to edit caption")),
        }

        self.bot
            .copy_messages(self.config.receiver_id, msg.chat_id, &selection.media_ids)
            .await
            .context("failed to copy tagged media")?;

        self.bot
            .delete_messages(msg.chat_id, &[selection.markup_message_id, msg.message_id])
            .await
            .context("failed to delete web app messages")?;

        info!(
            "Web app data processed {} ({} tags)",
            msg.message_id,
            selection.tags.len()
        );
        Ok(())
    }

    /// Reply with the running version
    pub async fn handle_ping(&self, msg: &IncomingMessage) -> Result<()> {
        info!("Received ping command {}", msg.message_id);
        self.bot
            .send_message(msg.chat_id, &format!("pong (v{})", self.config.version))
            .await
            .context("failed to send pong")?;
        Ok(())
    }
}
