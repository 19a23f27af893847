//! Upstream user record
//!
//! Mirrors the subset of Discord's user object the service reads. Every
//! field past `id` and `username` is optional and defaults on its own, so a
//! sparse or partially-null payload still decodes.

use serde::Deserialize;

use crate::identity::NO_DISCRIMINATOR;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub accent_color: Option<u32>,
    #[serde(default)]
    pub banner_color: Option<String>,
    #[serde(default)]
    pub bot: Option<bool>,
    #[serde(default)]
    pub system: Option<bool>,
    #[serde(default)]
    pub flags: Option<u64>,
    #[serde(default)]
    pub public_flags: Option<u64>,
    #[serde(default)]
    pub premium_type: Option<u8>,
    #[serde(default)]
    pub avatar_decoration_data: Option<AvatarDecorationData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AvatarDecorationData {
    pub asset: String,
}

impl DiscordUser {
    /// Discriminator, `"0"` when the record has none
    pub fn discriminator(&self) -> &str {
        self.discriminator.as_deref().unwrap_or(NO_DISCRIMINATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_record() {
        let user: DiscordUser = serde_json::from_str(
            r##"{
                "id": "175928847299117063",
                "username": "alice",
                "global_name": "Alice",
                "discriminator": "0",
                "avatar": "a_1269e74af4df7417b13759eae50c83dc",
                "banner": null,
                "accent_color": 16711680,
                "banner_color": "#ff0000",
                "bot": false,
                "flags": 64,
                "public_flags": 64,
                "premium_type": 2,
                "avatar_decoration_data": {"asset": "a_fed43ab12698df65902ba06727e20c0e", "sku_id": "1144058844004233369"},
                "clan": null
            }"##,
        )
        .unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(user.global_name.as_deref(), Some("Alice"));
        assert_eq!(user.banner, None);
        assert_eq!(user.accent_color, Some(16_711_680));
        assert_eq!(user.banner_color.as_deref(), Some("#ff0000"));
        assert_eq!(user.flags, Some(64));
        assert_eq!(user.premium_type, Some(2));
        assert_eq!(
            user.avatar_decoration_data.map(|d| d.asset).as_deref(),
            Some("a_fed43ab12698df65902ba06727e20c0e")
        );
    }

    #[test]
    fn test_decode_sparse_record() {
        let user: DiscordUser =
            serde_json::from_str(r#"{"id": "1", "username": "bot", "bot": null}"#).unwrap();
        assert_eq!(user.discriminator(), "0");
        assert_eq!(user.bot, None);
        assert_eq!(user.avatar, None);
        assert_eq!(user.avatar_decoration_data, None);
    }

    #[test]
    fn test_missing_username_is_rejected() {
        assert!(serde_json::from_str::<DiscordUser>(r#"{"id": "1"}"#).is_err());
    }
}
