//! Upstream user lookup
//!
//! The service depends on Discord only through [`UserDirectory`], so request
//! handling can be exercised against an in-memory directory.

mod client;
mod models;

pub use client::DiscordClient;
pub use models::{AvatarDecorationData, DiscordUser};

use async_trait::async_trait;

use crate::identity::Snowflake;

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// Upstream answered with a non-success status
    #[error("Discord API error {status}")]
    Status { status: u16, body: String },
    #[error("request to Discord failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed user record: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("bot token contains characters not allowed in a header")]
    InvalidToken,
}

/// Source of user records keyed by identifier
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn fetch_user(&self, id: Snowflake) -> Result<DiscordUser, LookupError>;
}
