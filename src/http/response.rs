//! HTTP response building module
//!
//! Provides builders for various HTTP status code responses, decoupled from specific business logic.

use super::cache::ASSET_CACHE_CONTROL;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue};
use hyper::{Response, StatusCode};

/// CORS headers attached to every response
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "GET, HEAD, OPTIONS"),
    (
        "access-control-allow-headers",
        "Origin, X-Requested-With, Content-Type, Accept",
    ),
];

/// Validator and type headers shared by full and partial asset responses
#[derive(Debug, Clone, Copy)]
pub struct AssetHeaders<'a> {
    pub content_type: Option<&'a str>,
    pub etag: &'a str,
    pub last_modified: &'a str,
}

/// Attach the fixed CORS headers, replacing any existing values
pub fn apply_cors(headers: &mut HeaderMap) {
    for (name, value) in CORS_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header("ETag", etag)
        .header("Cache-Control", ASSET_CACHE_CONTROL)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: usize) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header("Content-Range", format!("bytes */{file_size}"))
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 302 redirect response
pub fn build_redirect_response(target: &str, with_body: bool) -> Response<Full<Bytes>> {
    build_redirect_response_with_code(target, StatusCode::FOUND, with_body)
}

/// Build redirect response with an explicit status code
///
/// GET and HEAD get a short HTML body linking to `target`; other methods get
/// headers only.
pub fn build_redirect_response_with_code(
    target: &str,
    status: StatusCode,
    with_body: bool,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(status).header("Location", target);
    let body = if with_body {
        builder = builder.header("Content-Type", "text/html; charset=utf-8");
        Bytes::from(redirect_body(target, status))
    } else {
        Bytes::new()
    };

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(status.as_str(), &e);
        Response::new(Full::new(Bytes::new()))
    })
}

fn redirect_body(target: &str, status: StatusCode) -> String {
    format!(
        "<a href=\"{}\">{}</a>.\n\n",
        escape_html(target),
        status.canonical_reason().unwrap_or("Redirect")
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build 412 Precondition Failed response with the asset's validators
pub fn build_412_response(headers: &AssetHeaders<'_>) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(StatusCode::PRECONDITION_FAILED);
    if let Some(content_type) = headers.content_type {
        builder = builder.header("Content-Type", content_type);
    }

    builder
        .header("ETag", headers.etag)
        .header("Cache-Control", ASSET_CACHE_CONTROL)
        .header("Last-Modified", headers.last_modified)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("412", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build liveness response
pub fn build_health_response(body: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            Response::new(Full::new(Bytes::from_static(body.as_bytes())))
        })
}

/// Build success response with cache control
pub fn build_cached_response(
    data: Bytes,
    headers: &AssetHeaders<'_>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    let mut builder = Response::builder().status(StatusCode::OK);
    if let Some(content_type) = headers.content_type {
        builder = builder.header("Content-Type", content_type);
    }

    builder
        .header("Content-Length", content_length)
        .header("Accept-Ranges", "bytes")
        .header("ETag", headers.etag)
        .header("Cache-Control", ASSET_CACHE_CONTROL)
        .header("Last-Modified", headers.last_modified)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 206 Partial Content response
///
/// `data` must already be the `start..=end` slice of the asset.
pub fn build_partial_response(
    data: Bytes,
    headers: &AssetHeaders<'_>,
    start: usize,
    end: usize,
    total_size: usize,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = end - start + 1;
    let body = if is_head { Bytes::new() } else { data };

    let mut builder = Response::builder().status(StatusCode::PARTIAL_CONTENT);
    if let Some(content_type) = headers.content_type {
        builder = builder.header("Content-Type", content_type);
    }

    builder
        .header("Content-Length", content_length)
        .header("Content-Range", format!("bytes {start}-{end}/{total_size}"))
        .header("Accept-Ranges", "bytes")
        .header("ETag", headers.etag)
        .header("Cache-Control", ASSET_CACHE_CONTROL)
        .header("Last-Modified", headers.last_modified)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("206", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 206 response carrying several ranges as `multipart/byteranges`
///
/// `body` is the assembled multipart payload; it already holds the per-part
/// `Content-Type` and `Content-Range` headers.
pub fn build_multipart_response(
    body: Bytes,
    boundary: &str,
    headers: &AssetHeaders<'_>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = body.len();
    let body = if is_head { Bytes::new() } else { body };

    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(
            "Content-Type",
            format!("multipart/byteranges; boundary={boundary}"),
        )
        .header("Content-Length", content_length)
        .header("Accept-Ranges", "bytes")
        .header("ETag", headers.etag)
        .header("Cache-Control", ASSET_CACHE_CONTROL)
        .header("Last-Modified", headers.last_modified)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("206", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
