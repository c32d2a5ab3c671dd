//! Outgoing bot API seam
//!
//! Handlers talk to the messaging platform only through [`BotApi`], so the
//! wire protocol stays outside this crate. [`DryRunBot`] is a stand-in that
//! logs every call instead of performing it.

use anyhow::Result;
use async_trait::async_trait;
use rt_core::MediaKind;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::info;

/// Media to send, referenced by a platform file id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMedia {
    pub kind: MediaKind,
    pub file_id: String,
}

impl OutgoingMedia {
    pub fn new(kind: MediaKind, file_id: impl Into<String>) -> Self {
        Self {
            kind,
            file_id: file_id.into(),
        }
    }
}

/// Calls the handlers need from the messaging platform
///
/// Every method returns the ids the platform assigned to newly created
/// messages, where applicable.
#[async_trait]
pub trait BotApi: Send + Sync {
    /// Send one photo/video/animation
    async fn send_media(&self, chat_id: i64, media: &OutgoingMedia) -> Result<i64>;

    /// Send an album; ids come back in album order
    async fn send_media_group(&self, chat_id: i64, media: &[OutgoingMedia]) -> Result<Vec<i64>>;

    /// Send a plain text message
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64>;

    /// Send a message with a persistent keyboard holding one web-app button
    async fn send_web_app_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        button_text: &str,
        url: &str,
    ) -> Result<i64>;

    /// Delete one message
    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()>;

    /// Delete several messages at once
    async fn delete_messages(&self, chat_id: i64, message_ids: &[i64]) -> Result<()>;

    /// Replace the caption of a media message
    async fn edit_caption(&self, chat_id: i64, message_id: i64, caption: &str) -> Result<()>;

    /// Copy messages from one chat into another
    async fn copy_messages(
        &self,
        to_chat_id: i64,
        from_chat_id: i64,
        message_ids: &[i64],
    ) -> Result<Vec<i64>>;
}

/// True when the platform rejected an edit because nothing changed
pub fn is_message_not_modified_error(err: &anyhow::Error) -> bool {
    let msg = format!("{:#}", err);
    msg.contains("message is not modified") || msg.contains("exactly the same as a current content")
}

/// Transport that logs calls and fabricates message ids
pub struct DryRunBot {
    next_id: AtomicI64,
}

impl DryRunBot {
    /// Start allocating ids above `first_id`
    pub fn new(first_id: i64) -> Self {
        Self {
            next_id: AtomicI64::new(first_id),
        }
    }

    fn allocate(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for DryRunBot {
    fn default() -> Self {
        Self::new(1_000_000)
    }
}

#[async_trait]
impl BotApi for DryRunBot {
    async fn send_media(&self, chat_id: i64, media: &OutgoingMedia) -> Result<i64> {
        let id = self.allocate();
        info!("[dry-run] send {} {} to {} -> {}", media.kind, media.file_id, chat_id, id);
        Ok(id)
    }

    async fn send_media_group(&self, chat_id: i64, media: &[OutgoingMedia]) -> Result<Vec<i64>> {
        let ids: Vec<i64> = media.iter().map(|_| self.allocate()).collect();
        let files: Vec<&str> = media.iter().map(|m| m.file_id.as_str()).collect();
        info!("[dry-run] send album {:?} to {} -> {:?}", files, chat_id, ids);
        Ok(ids)
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64> {
        let id = self.allocate();
        info!("[dry-run] send message {:?} to {} -> {}", text, chat_id, id);
        Ok(id)
    }

    async fn send_web_app_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        button_text: &str,
        url: &str,
    ) -> Result<i64> {
        let id = self.allocate();
        info!(
            "[dry-run] send keyboard {:?} [{} -> {}] to {} -> {}",
            text, button_text, url, chat_id, id
        );
        Ok(id)
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()> {
        info!("[dry-run] delete message {} in {}", message_id, chat_id);
        Ok(())
    }

    async fn delete_messages(&self, chat_id: i64, message_ids: &[i64]) -> Result<()> {
        info!("[dry-run] delete messages {:?} in {}", message_ids, chat_id);
        Ok(())
    }

    async fn edit_caption(&self, chat_id: i64, message_id: i64, caption: &str) -> Result<()> {
        info!("[dry-run] edit caption of {} in {}: {:?}", message_id, chat_id, caption);
        Ok(())
    }

    async fn copy_messages(
        &self,
        to_chat_id: i64,
        from_chat_id: i64,
        message_ids: &[i64],
    ) -> Result<Vec<i64>> {
        let ids: Vec<i64> = message_ids.iter().map(|_| self.allocate()).collect();
        info!(
            "[dry-run] copy {:?} from {} to {} -> {:?}",
            message_ids, from_chat_id, to_chat_id, ids
        );
        Ok(ids)
    }
}
