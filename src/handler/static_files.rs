//! Static file serving module
//!
//! Serves the frontend bundle from `routes.static_dir`: directory index
//! files, MIME detection, `ETag` revalidation.

use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Serve the file at `ctx.path` from `static_dir`, or 404
pub async fn serve_directory(
    ctx: &RequestContext<'_>,
    static_dir: &str,
    index_files: &[String],
) -> Response<Full<Bytes>> {
    match load_from_directory(static_dir, ctx.path, index_files).await {
        Some((content, content_type)) => build_static_file_response(
            Bytes::from(content),
            content_type,
            ctx.if_none_match.as_deref(),
            ctx.is_head,
        ),
        None => http::build_404_response(),
    }
}

/// Load a file below `static_dir`, trying `index_files` for directories.
///
/// Returns `None` for missing files and for any path that would resolve
/// outside `static_dir`.
pub async fn load_from_directory(
    static_dir: &str,
    path: &str,
    index_files: &[String],
) -> Option<(Vec<u8>, &'static str)> {
    let relative = path.trim_start_matches('/');
    if Path::new(relative)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        logger::log_warning(&format!("Path traversal attempt blocked: {path}"));
        return None;
    }

    let root = match fs::canonicalize(static_dir).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{static_dir}': {e}"
            ));
            return None;
        }
    };

    let file_path = resolve_index(root.join(relative), index_files).await?;

    // Symlinks may still point elsewhere
    let canonical = fs::canonicalize(&file_path).await.ok()?;
    if !canonical.starts_with(&root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            canonical.display()
        ));
        return None;
    }

    let content = match fs::read(&canonical).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                canonical.display(),
                e
            ));
            return None;
        }
    };

    let content_type = mime::get_content_type(canonical.extension().and_then(|e| e.to_str()));
    Some((content, content_type))
}

/// Swap a directory for its first existing index file
async fn resolve_index(candidate: PathBuf, index_files: &[String]) -> Option<PathBuf> {
    let meta = fs::metadata(&candidate).await.ok()?;
    if meta.is_file() {
        return Some(candidate);
    }
    for index_file in index_files {
        let index_path = candidate.join(index_file);
        if fs::metadata(&index_path).await.is_ok_and(|m| m.is_file()) {
            return Some(index_path);
        }
    }
    None
}

fn build_static_file_response(
    data: Bytes,
    content_type: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&data);
    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }
    http::build_file_response(data, content_type, &etag, is_head)
}
