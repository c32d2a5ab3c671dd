//! Media kinds relayed by the bot

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of media attached to a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image
    Photo,
    /// Video clip
    Video,
    /// GIF or silent looping video
    Animation,
}

impl MediaKind {
    /// Stable lowercase name, as used in logs and payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Animation => "animation",
        }
    }

    /// Whether this kind may be part of an album
    ///
    /// Albums only accept photos and videos; animations are always
    /// delivered as standalone messages.
    pub fn allowed_in_album(&self) -> bool {
        matches!(self, MediaKind::Photo | MediaKind::Video)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_membership() {
        assert!(MediaKind::Photo.allowed_in_album());
        assert!(MediaKind::Video.allowed_in_album());
        assert!(!MediaKind::Animation.allowed_in_album());
    }

    #[test]
    fn test_serde_names() {
        let kind: MediaKind = serde_json::from_str("\"video\"").unwrap();
        assert_eq!(kind, MediaKind::Video);
        assert_eq!(serde_json::to_string(&MediaKind::Animation).unwrap(), "\"animation\"");
        assert_eq!(MediaKind::Photo.to_string(), "photo");
    }
}
