//! Avatar lookup endpoint
//!
//! `GET {api_prefix}{id}?size=N`: validate, fetch the user upstream, answer
//! with an [`AvatarProfile`]. Upstream failures keep their status and body.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use percent_encoding::percent_decode_str;
use serde_json::json;

use super::profile::AvatarProfile;
use super::router::RequestContext;
use crate::config::AppState;
use crate::discord::LookupError;
use crate::http;
use crate::identity::Snowflake;
use crate::logger;

/// Why a lookup produced no profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvatarError {
    InvalidId,
    InvalidSize,
    /// Upstream non-success, forwarded as-is
    Upstream { status: u16, body: String },
    Internal,
}

impl AvatarError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId | Self::InvalidSize => StatusCode::BAD_REQUEST,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> serde_json::Value {
        match self {
            Self::InvalidId => json!({ "error": "Invalid Discord ID" }),
            Self::InvalidSize => json!({ "error": "Invalid size" }),
            Self::Upstream { status, body } => json!({
                "error": format!("Discord API error {status}"),
                "details": body,
            }),
            Self::Internal => json!({ "error": "Internal server error" }),
        }
    }
}

/// Read `size` from a query string. Missing or empty means `default`;
/// anything else must be a positive integer.
pub fn parse_size(query: Option<&str>, default: u32) -> Result<u32, AvatarError> {
    let raw = query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .find_map(|pair| match pair.split_once('=') {
            Some(("size", value)) => Some(value),
            None if pair == "size" => Some(""),
            _ => None,
        });

    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => match value.parse::<u32>() {
            Ok(size) if size > 0 => Ok(size),
            _ => Err(AvatarError::InvalidSize),
        },
    }
}

/// Resolve the profile for `raw_id`, the still percent-encoded path segment
pub async fn lookup_avatar(
    state: &AppState,
    raw_id: &str,
    query: Option<&str>,
) -> Result<AvatarProfile, AvatarError> {
    let id: Snowflake = percent_decode_str(raw_id)
        .decode_utf8()
        .map_err(|_| AvatarError::InvalidId)?
        .parse()
        .map_err(|_| AvatarError::InvalidId)?;
    let size = parse_size(query, state.config.discord.default_size)?;

    let user = match state.directory.fetch_user(id).await {
        Ok(user) => user,
        Err(LookupError::Status { status, body }) => {
            logger::log_upstream_failure(raw_id, &format!("status {status}"));
            return Err(AvatarError::Upstream { status, body });
        }
        Err(e) => {
            logger::log_error(&format!("Lookup of {raw_id} failed: {e}"));
            return Err(AvatarError::Internal);
        }
    };

    AvatarProfile::from_user(user, size, &state.cdn).map_err(|e| {
        logger::log_error(&format!("Upstream returned an unusable id for {raw_id}: {e}"));
        AvatarError::Internal
    })
}

pub async fn serve_avatar(
    ctx: &RequestContext<'_>,
    state: &AppState,
    raw_id: &str,
) -> Response<Full<Bytes>> {
    match lookup_avatar(state, raw_id, ctx.query).await {
        Ok(profile) => {
            logger::log_debug(&format!("Resolved avatar for {raw_id}: {}", profile.avatar));
            http::build_json_response(StatusCode::OK, &profile, ctx.is_head)
        }
        Err(err) => http::build_json_response(err.status(), &err.body(), ctx.is_head),
    }
}
