//! Web-app payload model
//!
//! After media is relayed back to the admin, a keyboard button opens the
//! tagging form. The form posts its selection back to the bot as a JSON
//! string; this module turns that string into a validated [`TagSelection`].

use crate::ids::{join_ids, parse_id_list, IdListError};
use serde::Deserialize;
use thiserror::Error;

/// Errors while decoding the form payload
#[derive(Debug, Error)]
pub enum WebAppDataError {
    #[error("malformed web app payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("wrong tag entry format, expected [group, tag]: {0:?}")]
    MalformedEntry(Vec<String>),

    #[error("invalid media ids: {0}")]
    MediaIds(#[from] IdListError),

    #[error("payload references no media")]
    NoMedia,

    #[error("invalid markup message id: {0:?}")]
    MessageId(String),
}

/// Raw payload as posted by the form
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebAppData {
    /// Comma-separated ids of the relayed media messages
    pub media_ids: String,
    /// Id of the keyboard message to clean up
    pub message_id: String,
    /// Selected `[group, tag]` pairs
    #[serde(default)]
    pub data: Vec<Vec<String>>,
}

/// One tag picked in the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagUsage {
    pub group: String,
    pub tag: String,
}

/// Validated form selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSelection {
    /// Relayed media messages, first one carries the caption
    pub media_ids: Vec<i64>,
    /// Keyboard message that opened the form
    pub markup_message_id: i64,
    /// Tags in the order they were picked
    pub tags: Vec<TagUsage>,
}

impl WebAppData {
    /// Decode the JSON string the form sends
    pub fn parse(raw: &str) -> Result<Self, WebAppDataError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Validate into a [`TagSelection`]
    pub fn into_selection(self) -> Result<TagSelection, WebAppDataError> {
        let media_ids = parse_id_list(&self.media_ids)?;
        if media_ids.is_empty() {
            return Err(WebAppDataError::NoMedia);
        }

        let markup_message_id = self
            .message_id
            .trim()
            .parse::<i64>()
            .map_err(|_| WebAppDataError::MessageId(self.message_id.clone()))?;

        let mut tags = Vec::with_capacity(self.data.len());
        for entry in self.data {
            match <[String; 2]>::try_from(entry) {
                Ok([group, tag]) => tags.push(TagUsage { group, tag }),
                Err(entry) => return Err(WebAppDataError::MalformedEntry(entry)),
            }
        }

        Ok(TagSelection {
            media_ids,
            markup_message_id,
            tags,
        })
    }
}

impl TagSelection {
    /// Caption applied to the first media message: one tag per line
    pub fn caption(&self) -> String {
        self.tags
            .iter()
            .map(|usage| usage.tag.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Message carrying the caption (albums show the first caption only)
    pub fn caption_target(&self) -> i64 {
        self.media_ids[0]
    }
}

/// Build the URL the tagging button opens
///
/// The token doubles as the path secret the web app checks, and
/// `message-id` is the id the keyboard message itself will receive.
pub fn web_app_url(base: &str, token: &str, markup_message_id: i64, media_ids: &[i64]) -> String {
    format!(
        "{}/{}?message-id={}&media-id={}",
        base.trim_end_matches('/'),
        token,
        markup_message_id,
        join_ids(media_ids)
    )
}
