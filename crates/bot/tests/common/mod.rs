//! Shared fixtures for handler tests

#![allow(dead_code)]

use aggregator::Aggregator;
use anyhow::Result;
use async_trait::async_trait;
use bot_lib::{BotApi, Handler, IncomingMessage, OutgoingMedia};
use parking_lot::Mutex;
use rt_core::BotConfig;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const CHAT: i64 = 1;
pub const RECEIVER: i64 = 777;
pub const TOKEN: &str = "123:SECRET";
pub const WEBAPP: &str = "https://tags.example.org";
pub const SETTLE: Duration = Duration::from_millis(500);

/// One call made against the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SendMedia { chat_id: i64, media: OutgoingMedia, id: i64 },
    SendMediaGroup { chat_id: i64, media: Vec<OutgoingMedia>, ids: Vec<i64> },
    SendMessage { chat_id: i64, text: String, id: i64 },
    SendKeyboard { chat_id: i64, text: String, button: String, url: String, id: i64 },
    DeleteMessage { chat_id: i64, message_id: i64 },
    DeleteMessages { chat_id: i64, message_ids: Vec<i64> },
    EditCaption { chat_id: i64, message_id: i64, caption: String },
    CopyMessages { to: i64, from: i64, message_ids: Vec<i64> },
}

/// Transport that records calls and hands out ids from 100
pub struct RecordingBot {
    next_id: AtomicI64,
    calls: Mutex<Vec<Call>>,
    edit_error: Mutex<Option<String>>,
    album_error: Mutex<Option<String>>,
    album_latency: Mutex<Option<Duration>>,
}

impl RecordingBot {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(100),
            calls: Mutex::new(Vec::new()),
            edit_error: Mutex::new(None),
            album_error: Mutex::new(None),
            album_latency: Mutex::new(None),
        }
    }

    /// Make every album send take `latency` before it completes
    pub fn slow_albums(&self, latency: Duration) {
        *self.album_latency.lock() = Some(latency);
    }

    pub fn fail_edits_with(&self, msg: &str) {
        *self.edit_error.lock() = Some(msg.to_string());
    }

    pub fn fail_albums_with(&self, msg: &str) {
        *self.album_error.lock() = Some(msg.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn allocate(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl BotApi for RecordingBot {
    async fn send_media(&self, chat_id: i64, media: &OutgoingMedia) -> Result<i64> {
        let id = self.allocate();
        self.record(Call::SendMedia { chat_id, media: media.clone(), id });
        Ok(id)
    }

    async fn send_media_group(&self, chat_id: i64, media: &[OutgoingMedia]) -> Result<Vec<i64>> {
        let latency = *self.album_latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(msg) = self.album_error.lock().clone() {
            anyhow::bail!(msg);
        }
        let ids: Vec<i64> = media.iter().map(|_| self.allocate()).collect();
        self.record(Call::SendMediaGroup {
            chat_id,
            media: media.to_vec(),
            ids: ids.clone(),
        });
        Ok(ids)
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64> {
        let id = self.allocate();
        self.record(Call::SendMessage { chat_id, text: text.to_string(), id });
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
        self.record(Call::SendKeyboard {
            chat_id,
            text: text.to_string(),
            button: button_text.to_string(),
            url: url.to_string(),
            id,
        });
        Ok(id)
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()> {
        self.record(Call::DeleteMessage { chat_id, message_id });
        Ok(())
    }

    async fn delete_messages(&self, chat_id: i64, message_ids: &[i64]) -> Result<()> {
        self.record(Call::DeleteMessages {
            chat_id,
            message_ids: message_ids.to_vec(),
        });
        Ok(())
    }

    async fn edit_caption(&self, chat_id: i64, message_id: i64, caption: &str) -> Result<()> {
        if let Some(msg) = self.edit_error.lock().clone() {
            anyhow::bail!(msg);
        }
        self.record(Call::EditCaption {
            chat_id,
            message_id,
            caption: caption.to_string(),
        });
        Ok(())
    }

    async fn copy_messages(&self, to: i64, from: i64, message_ids: &[i64]) -> Result<Vec<i64>> {
        let ids: Vec<i64> = message_ids.iter().map(|_| self.allocate()).collect();
        self.record(Call::CopyMessages {
            to,
            from,
            message_ids: message_ids.to_vec(),
        });
        Ok(ids)
    }
}

pub fn bot_config() -> BotConfig {
    BotConfig {
        version: env!("CARGO_PKG_VERSION").to_string(),
        token: TOKEN.to_string(),
        web_app_url: WEBAPP.to_string(),
        receiver_id: RECEIVER,
    }
}

pub fn handler() -> (Arc<RecordingBot>, Handler<RecordingBot>) {
    let bot = Arc::new(RecordingBot::new());
    let handler = Handler::new(Arc::clone(&bot), bot_config(), Aggregator::new(SETTLE));
    (bot, handler)
}

pub fn photo(message_id: i64, file_id: &str) -> IncomingMessage {
    IncomingMessage {
        message_id,
        chat_id: CHAT,
        photo: Some(file_id.to_string()),
        ..Default::default()
    }
}

pub fn video(message_id: i64, file_id: &str) -> IncomingMessage {
    IncomingMessage {
        message_id,
        chat_id: CHAT,
        video: Some(file_id.to_string()),
        ..Default::default()
    }
}

pub fn animation(message_id: i64, file_id: &str) -> IncomingMessage {
    IncomingMessage {
        message_id,
        chat_id: CHAT,
        animation: Some(file_id.to_string()),
        ..Default::default()
    }
}

pub fn in_group(mut msg: IncomingMessage, group: &str) -> IncomingMessage {
    msg.media_group_id = Some(group.to_string());
    msg
}

pub fn keyboard_url(keyboard_id: i64, media_ids: &str) -> String {
    format!("{}/{}?message-id={}&media-id={}", WEBAPP, TOKEN, keyboard_id, media_ids)
}
