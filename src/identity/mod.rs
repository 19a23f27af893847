//! Identity derivation
//!
//! Pure functions over Discord identifiers: default-avatar selection, asset
//! URLs and the creation instant encoded in a snowflake. Nothing here does
//! I/O or holds state, so every function is safe to call from any task.

pub mod avatar;
pub mod snowflake;

pub use avatar::{
    default_avatar_index, resolve_avatar_url, AssetFormat, Cdn, DEFAULT_AVATAR_SIZE,
    DEFAULT_CDN_BASE, NO_DISCRIMINATOR,
};
pub use snowflake::{
    creation_date, creation_instant, format_locale, Snowflake, SnowflakeParseError,
    DISCORD_EPOCH_MS, TIMESTAMP_SHIFT,
};
