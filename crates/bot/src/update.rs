//! Incoming update model
//!
//! A flattened view of the message fields the handlers care about.

use rt_core::MediaKind;
use serde::{Deserialize, Serialize};

/// One incoming chat message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub chat_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_group_id: Option<String>,
    /// File id of the largest photo size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
    /// Raw JSON sent back by the web form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_app_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// What a message should be handled as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Ping,
    WebAppData,
    MediaGroupItem,
    SingleMedia,
    Ignored,
}

impl IncomingMessage {
    /// Attached media, if any
    ///
    /// Animations are checked first: clients attach a document alongside
    /// them but never a photo or video.
    pub fn media(&self) -> Option<(MediaKind, &str)> {
        if let Some(id) = &self.animation {
            return Some((MediaKind::Animation, id));
        }
        if let Some(id) = &self.photo {
            return Some((MediaKind::Photo, id));
        }
        self.video.as_deref().map(|id| (MediaKind::Video, id))
    }

    /// True for `/ping` and `/ping@botname`
    pub fn is_ping(&self) -> bool {
        let Some(text) = self.text.as_deref() else {
            return false;
        };
        let command = text.split_whitespace().next().unwrap_or_default();
        command == "/ping" || command.starts_with("/ping@")
    }

    pub fn route(&self) -> Route {
        if self.is_ping() {
            Route::Ping
        } else if self.web_app_data.is_some() {
            Route::WebAppData
        } else if self.media().is_some() {
            if self.media_group_id.is_some() {
                Route::MediaGroupItem
            } else {
                Route::SingleMedia
            }
        } else {
            Route::Ignored
        }
    }
}
