//! Avatar profile record
//!
//! The JSON document returned by the avatar endpoint. Field names are part
//! of the public contract the frontend reads, including the one snake_case
//! holdover, `global_name`.

use serde::{Serialize, Serializer};

use crate::discord::DiscordUser;
use crate::identity::{creation_date, creation_instant, Cdn, Snowflake, SnowflakeParseError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarProfile {
    pub id: Snowflake,
    pub username: String,
    #[serde(rename = "global_name")]
    pub global_name: Option<String>,
    pub discriminator: String,
    pub avatar: String,
    pub avatar_decoration: Option<String>,
    pub banner: Option<String>,
    pub banner_url: Option<String>,
    pub accent_color: Option<u32>,
    pub banner_color: Option<String>,
    pub is_bot: bool,
    pub is_system: bool,
    pub flags: UserFlags,
    pub nitro_type: NitroType,
    /// Local-time rendering of the creation instant
    pub creation_date: String,
    /// Creation instant in Unix milliseconds
    pub created_at: i64,
}

/// Account flag bits. Zero serializes as `[]`, anything else as the integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserFlags(pub u64);

impl Serialize for UserFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 == 0 {
            serializer.collect_seq(std::iter::empty::<u64>())
        } else {
            serializer.serialize_u64(self.0)
        }
    }
}

/// Subscription tier derived from the user's `premium_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NitroType {
    pub value: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: Option<&'static str>,
}

impl NitroType {
    /// Reported when Discord does not disclose the tier, which is the usual
    /// case for lookups made with a bot token.
    pub const UNKNOWN: Self = Self {
        value: 0,
        name: "Unknown",
        description: "Unknown Nitro Type",
        icon: Some("icon-url-for-unknown"),
    };

    pub const fn from_premium_type(premium_type: Option<u8>) -> Self {
        let (value, name, description) = match premium_type {
            None => return Self::UNKNOWN,
            Some(0) => (0, "None", "No Nitro subscription"),
            Some(1) => (1, "Nitro Classic", "Nitro Classic subscription"),
            Some(2) => (2, "Nitro", "Nitro subscription"),
            Some(3) => (3, "Nitro Basic", "Nitro Basic subscription"),
            Some(value) => {
                return Self {
                    value,
                    ..Self::UNKNOWN
                }
            }
        };
        Self {
            value,
            name,
            description,
            icon: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl AvatarProfile {
    /// Shape an upstream record into the response document.
    ///
    /// Fails only if the upstream identifier is not a snowflake.
    pub fn from_user(user: DiscordUser, size: u32, cdn: &Cdn) -> Result<Self, SnowflakeParseError> {
        let id: Snowflake = user.id.parse()?;
        let discriminator = user.discriminator().to_string();

        Ok(Self {
            id,
            avatar: cdn.avatar_url(id, user.avatar.as_deref(), size, &discriminator),
            avatar_decoration: user
                .avatar_decoration_data
                .as_ref()
                .map(|d| cdn.avatar_decoration_url(&d.asset)),
            banner_url: cdn.banner_url(id, user.banner.as_deref(), size),
            banner: non_empty(user.banner),
            accent_color: user.accent_color.filter(|c| *c != 0),
            banner_color: non_empty(user.banner_color),
            is_bot: user.bot.unwrap_or(false),
            is_system: user.system.unwrap_or(false),
            flags: UserFlags(user.flags.or(user.public_flags).unwrap_or(0)),
            nitro_type: NitroType::from_premium_type(user.premium_type),
            creation_date: creation_date(id),
            created_at: creation_instant(id).timestamp_millis(),
            username: user.username,
            global_name: non_empty(user.global_name),
            discriminator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(value: serde_json::Value) -> DiscordUser {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_full_profile() {
        let profile = AvatarProfile::from_user(
            user(json!({
                "id": "175928847299117063",
                "username": "alice",
                "global_name": "Alice",
                "discriminator": "0",
                "avatar": "a_abc123",
                "banner": "b4nn3r",
                "accent_color": 255,
                "banner_color": "#0000ff",
                "system": true,
                "flags": 131_072,
                "premium_type": 2,
                "avatar_decoration_data": {"asset": "d3c0"}
            })),
            512,
            &Cdn::default(),
        )
        .unwrap();

        assert_eq!(
            profile.avatar,
            "https://cdn.discordapp.com/avatars/175928847299117063/a_abc123.gif?size=512"
        );
        assert_eq!(
            profile.banner_url.as_deref(),
            Some("https://cdn.discordapp.com/banners/175928847299117063/b4nn3r.png?size=512")
        );
        assert_eq!(
            profile.avatar_decoration.as_deref(),
            Some("https://cdn.discordapp.com/avatar-decoration-presets/d3c0.png")
        );
        assert!(profile.is_system);
        assert!(!profile.is_bot);
        assert_eq!(profile.nitro_type.name, "Nitro");
        assert_eq!(profile.created_at, 1_462_015_105_796);

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["id"], "175928847299117063");
        assert_eq!(value["global_name"], "Alice");
        assert_eq!(value["accentColor"], 255);
        assert_eq!(value["bannerColor"], "#0000ff");
        assert_eq!(value["isSystem"], true);
        assert_eq!(value["flags"], 131_072);
        assert_eq!(value["nitroType"]["value"], 2);
        assert!(value["creationDate"].is_string());
    }

    #[test]
    fn test_sparse_profile_defaults() {
        let profile = AvatarProfile::from_user(
            user(json!({
                "id": "175928847299117063",
                "username": "legacy",
                "global_name": "",
                "discriminator": "1337",
                "accent_color": 0,
                "flags": 0
            })),
            4096,
            &Cdn::default(),
        )
        .unwrap();

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["avatar"], "https://cdn.discordapp.com/embed/avatars/2.png");
        assert_eq!(value["global_name"], serde_json::Value::Null);
        assert_eq!(value["avatarDecoration"], serde_json::Value::Null);
        assert_eq!(value["banner"], serde_json::Value::Null);
        assert_eq!(value["bannerUrl"], serde_json::Value::Null);
        assert_eq!(value["accentColor"], serde_json::Value::Null);
        assert_eq!(value["isBot"], false);
        assert_eq!(value["isSystem"], false);
        assert_eq!(value["flags"], json!([]));
        assert_eq!(
            value["nitroType"],
            json!({
                "value": 0,
                "name": "Unknown",
                "description": "Unknown Nitro Type",
                "icon": "icon-url-for-unknown"
            })
        );
    }

    #[test]
    fn test_public_flags_fallback() {
        let profile = AvatarProfile::from_user(
            user(json!({"id": "1", "username": "u", "public_flags": 64})),
            4096,
            &Cdn::default(),
        )
        .unwrap();
        assert_eq!(profile.flags, UserFlags(64));
    }

    #[test]
    fn test_rejects_non_snowflake_id() {
        let result = AvatarProfile::from_user(
            user(json!({"id": "not-a-number", "username": "u"})),
            4096,
            &Cdn::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_nitro_types() {
        assert_eq!(NitroType::from_premium_type(None), NitroType::UNKNOWN);
        assert_eq!(NitroType::from_premium_type(Some(0)).name, "None");
        assert_eq!(NitroType::from_premium_type(Some(1)).name, "Nitro Classic");
        assert_eq!(NitroType::from_premium_type(Some(3)).value, 3);
        assert_eq!(NitroType::from_premium_type(Some(3)).icon, None);

        let odd = NitroType::from_premium_type(Some(9));
        assert_eq!(odd.value, 9);
        assert_eq!(odd.name, "Unknown");
    }
}
