//! Discord REST client
//!
//! One authenticated `GET /users/{id}` per lookup. No retries and no
//! caching: a non-success status is surfaced with its body untouched so the
//! handler can pass it through.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};

use super::models::DiscordUser;
use super::{LookupError, UserDirectory};
use crate::identity::Snowflake;

pub struct DiscordClient {
    http: reqwest::Client,
    api_base: String,
}

impl DiscordClient {
    /// Build a client that authenticates every request as `Bot <token>`.
    pub fn new(api_base: &str, token: &SecretString, user_agent: &str) -> Result<Self, LookupError> {
        let mut auth = HeaderValue::from_str(&format!("Bot {}", token.expose_secret()))
            .map_err(|_| LookupError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn user_url(&self, id: Snowflake) -> String {
        format!("{}/users/{id}", self.api_base)
    }
}

#[async_trait]
impl UserDirectory for DiscordClient {
    async fn fetch_user(&self, id: Snowflake) -> Result<DiscordUser, LookupError> {
        let response = self.http.get(self.user_url(id)).send().await?;
        let status = response.status();

        if !status.is_success() {
            // Body is diagnostic only; an unreadable one is reported as empty
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
