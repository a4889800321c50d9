//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: CORS, preflight short-circuit,
//! path resolution and dispatch to the response negotiator.

use crate::config::AppState;
use crate::handler::negotiate::negotiate;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::{self, Resolution};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{
    HeaderMap, HeaderName, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_RANGE,
    IF_UNMODIFIED_SINCE, RANGE, REFERER, USER_AGENT,
};
use hyper::{Method, Request, Response, StatusCode, Version};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Body of the liveness endpoint
pub const HEALTH_BODY: &str = "healthy\n";

/// Request context encapsulating information needed for request processing
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    /// Percent-decoded request path
    pub path: &'a str,
    pub is_head: bool,
    /// GET or HEAD; other methods never get a 304 or a redirect body
    pub is_get_or_head: bool,
    pub if_match: Option<&'a str>,
    pub if_unmodified_since: Option<&'a str>,
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
    pub if_range: Option<&'a str>,
    pub range_header: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>, path: &'a str) -> Self {
        let headers = req.headers();
        let method = req.method();
        Self {
            path,
            is_head: method == Method::HEAD,
            is_get_or_head: method == Method::GET || method == Method::HEAD,
            if_match: header_str(headers, IF_MATCH),
            if_unmodified_since: header_str(headers, IF_UNMODIFIED_SINCE),
            if_none_match: header_str(headers, IF_NONE_MATCH),
            if_modified_since: header_str(headers, IF_MODIFIED_SINCE),
            if_range: header_str(headers, IF_RANGE),
            range_header: header_str(headers, RANGE),
        }
    }
}

/// Header value as text; empty values count as absent
fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Decode `%XX` escapes so lookups see the bundled file name
///
/// Invalid UTF-8 is replaced rather than rejected; such a path matches no
/// asset and falls through to the default redirect.
pub fn decode_path(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw).decode_utf8_lossy()
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let response = respond(&req, &state);

    if state.access_log_enabled() {
        let entry = access_entry(&req, &response, peer_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Produce the response for a request
///
/// Every outcome carries the CORS headers. OPTIONS is answered before path
/// resolution.
pub fn respond<B>(req: &Request<B>, state: &AppState) -> Response<Full<Bytes>> {
    let mut response = if req.method() == Method::OPTIONS {
        http::build_options_response()
    } else {
        let path = decode_path(req.uri().path());
        let ctx = RequestContext::from_request(req, &path);
        route_request(&ctx, state)
    };

    http::apply_cors(response.headers_mut());
    response
}

/// Route request based on the resolved path
fn route_request(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    match routing::resolve(ctx.path, &state.store) {
        Resolution::Health => http::build_health_response(HEALTH_BODY),
        Resolution::RedirectToDefault => {
            http::build_redirect_response(&state.default_target, ctx.is_get_or_head)
        }
        Resolution::PermanentRedirect(url) => http::build_redirect_response_with_code(
            url,
            StatusCode::MOVED_PERMANENTLY,
            ctx.is_get_or_head,
        ),
        Resolution::Asset(asset) => negotiate(asset, ctx),
        Resolution::NotFound => {
            logger::log_debug(&format!(
                "No asset for {}, redirecting to {}",
                ctx.path, state.default_target
            ));
            http::build_redirect_response(&state.default_target, ctx.is_get_or_head)
        }
    }
}

fn access_entry<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header_str(req.headers(), REFERER).map(ToString::to_string);
    entry.user_agent = header_str(req.headers(), USER_AGENT).map(ToString::to_string);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_context() {
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/versions.json?x=1")
            .header("If-None-Match", "\"abc\"")
            .header("Range", "bytes=0-9")
            .body(())
            .unwrap();
        let path = decode_path(req.uri().path());
        let ctx = RequestContext::from_request(&req, &path);
        assert_eq!(ctx.path, "/versions.json");
        assert!(ctx.is_head);
        assert!(ctx.is_get_or_head);
        assert_eq!(ctx.if_match, None);
        assert_eq!(ctx.if_none_match, Some("\"abc\""));
        assert_eq!(ctx.range_header, Some("bytes=0-9"));
        assert_eq!(ctx.if_modified_since, None);
        assert_eq!(ctx.if_range, None);
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/my%20logo.png"), "/my logo.png");
        assert_eq!(decode_path("/versions%2Ejson"), "/versions.json");
        assert_eq!(decode_path("/plain.json"), "/plain.json");
        // Malformed escapes are kept verbatim
        assert_eq!(decode_path("/100%zz"), "/100%zz");
        assert_eq!(decode_path("/bad%FF"), "/bad\u{FFFD}");
    }

    #[test]
    fn test_empty_header_is_absent() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/versions.json")
            .header("If-Match", "")
            .body(())
            .unwrap();
        let ctx = RequestContext::from_request(&req, "/versions.json");
        assert_eq!(ctx.if_match, None);
        assert!(!ctx.is_get_or_head);
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_2), "2");
    }
}
