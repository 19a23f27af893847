//! Avatar and banner asset URLs
//!
//! Builds CDN URLs from an identifier and the optional asset hashes Discord
//! returns with a user record. Pure string construction, no I/O.

use super::snowflake::Snowflake;

/// Default CDN host for user assets.
pub const DEFAULT_CDN_BASE: &str = "https://cdn.discordapp.com";

/// Pixel size requested when the caller does not ask for one.
pub const DEFAULT_AVATAR_SIZE: u32 = 4096;

/// Discriminator value carried by accounts migrated off legacy tags.
pub const NO_DISCRIMINATOR: &str = "0";

/// Number of default avatars for migrated (discriminator `"0"`) accounts.
const MODERN_DEFAULT_AVATARS: u64 = 6;

/// Number of default avatars for legacy-tag accounts.
const LEGACY_DEFAULT_AVATARS: u64 = 5;

/// Prefix marking an animated asset hash.
const ANIMATED_PREFIX: &str = "a_";

/// Image format of a custom asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFormat {
    Png,
    Gif,
}

impl AssetFormat {
    /// `gif` for hashes starting with `a_`, `png` otherwise.
    pub fn from_hash(hash: &str) -> Self {
        if hash.starts_with(ANIMATED_PREFIX) {
            Self::Gif
        } else {
            Self::Png
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }
}

/// Index of the built-in avatar Discord assigns when no custom one is set.
///
/// Migrated accounts (discriminator `"0"`) derive it from the identifier's
/// timestamp bits, `(id >> 22) % 6`. Legacy accounts use `discriminator % 5`.
/// A discriminator that is not a decimal number is treated like `"0"`.
pub fn default_avatar_index(id: Snowflake, discriminator: &str) -> u64 {
    if discriminator != NO_DISCRIMINATOR {
        if let Ok(tag) = discriminator.parse::<u64>() {
            return tag % LEGACY_DEFAULT_AVATARS;
        }
    }
    id.timestamp() % MODERN_DEFAULT_AVATARS
}

/// URL builder bound to a CDN host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cdn {
    base: String,
}

impl Default for Cdn {
    fn default() -> Self {
        Self::new(DEFAULT_CDN_BASE)
    }
}

impl Cdn {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn default_avatar_url(&self, id: Snowflake, discriminator: &str) -> String {
        format!(
            "{}/embed/avatars/{}.png",
            self.base,
            default_avatar_index(id, discriminator)
        )
    }

    /// Custom avatar URL, or the default avatar when `avatar_hash` is absent
    /// or empty. Default avatars carry no size parameter.
    pub fn avatar_url(
        &self,
        id: Snowflake,
        avatar_hash: Option<&str>,
        size: u32,
        discriminator: &str,
    ) -> String {
        match avatar_hash.filter(|h| !h.is_empty()) {
            Some(hash) => self.user_asset_url("avatars", id, hash, size),
            None => self.default_avatar_url(id, discriminator),
        }
    }

    pub fn banner_url(&self, id: Snowflake, banner_hash: Option<&str>, size: u32) -> Option<String> {
        banner_hash
            .filter(|h| !h.is_empty())
            .map(|hash| self.user_asset_url("banners", id, hash, size))
    }

    pub fn avatar_decoration_url(&self, asset: &str) -> String {
        format!("{}/avatar-decoration-presets/{asset}.png", self.base)
    }

    fn user_asset_url(&self, kind: &str, id: Snowflake, hash: &str, size: u32) -> String {
        format!(
            "{}/{kind}/{id}/{hash}.{}?size={size}",
            self.base,
            AssetFormat::from_hash(hash).extension()
        )
    }
}

/// [`Cdn::avatar_url`] against the public Discord CDN.
pub fn resolve_avatar_url(
    id: Snowflake,
    avatar_hash: Option<&str>,
    size: u32,
    discriminator: &str,
) -> String {
    Cdn::default().avatar_url(id, avatar_hash, size, discriminator)
}
