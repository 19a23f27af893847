//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method and size checks, route
//! matching, common response headers and the access log line.

use crate::config::{AppState, RoutesConfig};
use crate::handler::{avatar, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::HeaderValue;
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// Where a path is dispatched
#[derive(Debug, PartialEq, Eq)]
pub enum Route<'a> {
    Health,
    /// Avatar lookup; carries the unvalidated identifier segment
    Avatar(&'a str),
    Static,
    NotFound,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    // Only GET and HEAD are routed, so the body is never read
    let (parts, _body) = req.into_parts();
    let mut response = dispatch(&parts, &state).await;
    apply_common_headers(&mut response, &state);

    if state.config.logging.access_log {
        log_access(&parts, &response, &state, peer_addr, started);
    }
    Ok(response)
}

async fn dispatch(req: &Parts, state: &AppState) -> Response<Full<Bytes>> {
    let method = &req.method;
    let uri = &req.uri;

    // 1. Check HTTP method
    if let Some(resp) = check_http_method(method, state.config.http.enable_cors) {
        return resp;
    }

    // 2. Check body size
    if let Some(resp) = check_body_size(&req.headers, state.config.http.max_body_size) {
        return resp;
    }

    logger::log_headers_count(req.headers.len(), state.config.logging.show_headers);

    let ctx = RequestContext {
        path: uri.path(),
        query: uri.query(),
        is_head: *method == Method::HEAD,
        if_none_match: req
            .headers
            .get("if-none-match")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
    };

    let routes = &state.config.routes;
    match match_route(ctx.path, routes) {
        Route::Health => health_response(ctx.path, state),
        Route::Avatar(raw_id) => avatar::serve_avatar(&ctx, state, raw_id).await,
        Route::Static => {
            static_files::serve_directory(&ctx, &routes.static_dir, &routes.index_files).await
        }
        Route::NotFound => http::build_404_response(),
    }
}

/// Match a request path against the configured routes
pub fn match_route<'a>(path: &'a str, routes: &RoutesConfig) -> Route<'a> {
    if routes.health.enabled
        && (path == routes.health.liveness_path || path == routes.health.readiness_path)
    {
        return Route::Health;
    }

    if let Some(rest) = path.strip_prefix(routes.api_prefix.as_str()) {
        // Exactly one segment after the prefix, as `/api/avatar/:id`
        return if rest.is_empty() || rest.contains('/') {
            Route::NotFound
        } else {
            Route::Avatar(rest)
        };
    }

    Route::Static
}

/// Readiness fails while draining so balancers stop routing here; liveness
/// stays green until the process exits.
fn health_response(path: &str, state: &AppState) -> Response<Full<Bytes>> {
    if state.is_shutting_down() && path == state.config.routes.health.readiness_path {
        http::build_health_response(StatusCode::SERVICE_UNAVAILABLE, "shutting down")
    } else {
        http::build_health_response(StatusCode::OK, "ok")
    }
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn apply_common_headers(response: &mut Response<Full<Bytes>>, state: &AppState) {
    let headers = response.headers_mut();
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        headers.insert("Server", server);
    }
    if state.config.http.enable_cors {
        headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    }
    // Keep-alive connections would otherwise hold the drain open
    if state.is_shutting_down() {
        headers.insert("Connection", HeaderValue::from_static("close"));
    }
}

fn log_access(
    req: &Parts,
    response: &Response<Full<Bytes>>,
    state: &AppState,
    peer_addr: SocketAddr,
    started: Instant,
) {
    let header = |name: &str| {
        req.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method.to_string(),
        req.uri.path().to_string(),
    );
    entry.query = req.uri.query().map(ToString::to_string);
    entry.http_version = match req.version {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample_config;
    use crate::handler::avatar::tests::{found, state_with};
    use http_body_util::{BodyExt, Empty};

    fn routes() -> RoutesConfig {
        sample_config().routes
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    #[test]
    fn test_match_route() {
        let routes = routes();
        assert_eq!(match_route("/healthz", &routes), Route::Health);
        assert_eq!(match_route("/readyz", &routes), Route::Health);
        assert_eq!(match_route("/api/avatar/123", &routes), Route::Avatar("123"));
        assert_eq!(match_route("/api/avatar/abc", &routes), Route::Avatar("abc"));
        assert_eq!(match_route("/api/avatar/", &routes), Route::NotFound);
        assert_eq!(match_route("/api/avatar/1/2", &routes), Route::NotFound);
        assert_eq!(match_route("/", &routes), Route::Static);
        assert_eq!(match_route("/style.css", &routes), Route::Static);
    }

    #[test]
    fn test_health_can_be_disabled() {
        let mut routes = routes();
        routes.health.enabled = false;
        assert_eq!(match_route("/healthz", &routes), Route::Static);
    }

    #[tokio::test]
    async fn test_avatar_request_end_to_end() {
        let (state, _) = state_with(found);
        let req = Request::get("/api/avatar/175928847299117063?size=64")
            .body(Empty::<Bytes>::new())
            .unwrap();

        let resp = handle_request(req, Arc::new(state), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Server"], "AvatarFetcher/1.0");

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            value["avatar"],
            "https://cdn.discordapp.com/avatars/175928847299117063/abc123.png?size=64"
        );
        assert_eq!(value["creationDate"].as_str().map(str::is_empty), Some(false));
    }

    #[tokio::test]
    async fn test_invalid_id_is_400() {
        let (state, _) = state_with(found);
        let req = Request::get("/api/avatar/12ab").body(Empty::<Bytes>::new()).unwrap();
        let resp = handle_request(req, Arc::new(state), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"error":"Invalid Discord ID"}"#);
    }

    #[tokio::test]
    async fn test_method_and_size_checks() {
        let (state, _) = state_with(found);
        let state = Arc::new(state);

        let req = Request::post("/api/avatar/1").body(Empty::<Bytes>::new()).unwrap();
        let resp = handle_request(req, Arc::clone(&state), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        let req = Request::options("/").body(Empty::<Bytes>::new()).unwrap();
        let resp = handle_request(req, Arc::clone(&state), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = Request::get("/")
            .header("content-length", "99999999")
            .body(Empty::<Bytes>::new())
            .unwrap();
        let resp = handle_request(req, state, peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_cors_header_when_enabled() {
        let (mut state, _) = state_with(found);
        state.config.http.enable_cors = true;
        let req = Request::get("/healthz").body(Empty::<Bytes>::new()).unwrap();
        let resp = handle_request(req, Arc::new(state), peer()).await.unwrap();
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
    }

    #[tokio::test]
    async fn test_percent_encoded_id_is_decoded() {
        let (state, _) = state_with(found);
        let req = Request::get("/api/avatar/%31%37%35928847299117063")
            .body(Empty::<Bytes>::new())
            .unwrap();
        let resp = handle_request(req, Arc::new(state), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["id"], "175928847299117063");
    }

    #[tokio::test]
    async fn test_draining_fails_readiness_and_closes() {
        let (state, _) = state_with(found);
        let state = Arc::new(state);

        let req = Request::get("/readyz").body(Empty::<Bytes>::new()).unwrap();
        let resp = handle_request(req, Arc::clone(&state), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(!resp.headers().contains_key("Connection"));

        state.request_shutdown();

        let req = Request::get("/readyz").body(Empty::<Bytes>::new()).unwrap();
        let resp = handle_request(req, Arc::clone(&state), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(resp.headers()["Connection"], "close");

        let req = Request::get("/healthz").body(Empty::<Bytes>::new()).unwrap();
        let resp = handle_request(req, state, peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
