//! Ratatoskr Core - shared primitives for the media relay bot
//!
//! This crate provides the pieces every other crate leans on:
//! - Media kinds carried by incoming messages
//! - Comma-separated id list parsing
//! - Environment and TOML configuration
//! - Web-app payload model (tag selection sent back by the embedded form)

pub mod config;
pub mod ids;
pub mod media;
pub mod webapp;

// Re-export main types for convenience
pub use config::{example_config, AggregatorConfig, BotConfig, ConfigError};
pub use ids::{join_ids, parse_id_list, IdListError};
pub use media::MediaKind;
pub use webapp::{web_app_url, TagSelection, TagUsage, WebAppData, WebAppDataError};
