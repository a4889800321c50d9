//! Response negotiation module
//!
//! Decides between not-modified, precondition-failed, full, partial and
//! unsatisfiable responses for a resolved asset, based on the request's
//! conditional and range headers.

use crate::assets::Asset;
use crate::handler::router::RequestContext;
use crate::http::cache::{self, TagComparison};
use crate::http::range::{self, RangeSelection};
use crate::http::response::{
    build_cached_response, build_multipart_response, build_partial_response, AssetHeaders,
};
use crate::http;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

/// Result of evaluating the conditional headers
#[derive(Debug, PartialEq, Eq)]
enum Precondition {
    Proceed,
    NotModified,
    Failed,
}

/// Build the response for `asset`
///
/// An `If-None-Match` equal to the `ETag` answers 304 straight away. The
/// remaining checks run in this order: `If-Match`, then
/// `If-Unmodified-Since` (only without `If-Match`), then `If-None-Match`
/// lists, then `If-Modified-Since` (only without `If-None-Match`). A failed
/// `If-Range` drops the Range header before ranges are selected.
pub fn negotiate(asset: &Asset, ctx: &RequestContext<'_>) -> Response<Full<Bytes>> {
    if cache::check_etag_match(ctx.if_none_match, &asset.etag) {
        return http::build_304_response(&asset.etag);
    }

    let last_modified = cache::format_http_date(&asset.bundled_at);
    let headers = AssetHeaders {
        content_type: asset.content_type,
        etag: &asset.etag,
        last_modified: &last_modified,
    };

    match check_preconditions(asset, ctx) {
        Precondition::NotModified => return http::build_304_response(&asset.etag),
        Precondition::Failed => return http::build_412_response(&headers),
        Precondition::Proceed => {}
    }

    let range_header = if !ctx.is_get_or_head
        || cache::if_range_allows(ctx.if_range, &asset.etag, &asset.bundled_at)
    {
        ctx.range_header
    } else {
        None
    };

    let total_size = asset.len();
    match range::select_ranges(range_header, total_size) {
        RangeSelection::Whole => {
            build_cached_response(asset.content.clone(), &headers, ctx.is_head)
        }
        RangeSelection::Spans(spans) => match spans.as_slice() {
            [span] => build_partial_response(
                asset.content.slice(span.first..=span.last),
                &headers,
                span.first,
                span.last,
                total_size,
                ctx.is_head,
            ),
            _ => {
                let boundary = multipart_boundary(&asset.etag);
                let body =
                    range::multipart_body(&asset.content, &spans, asset.content_type, &boundary);
                build_multipart_response(body, &boundary, &headers, ctx.is_head)
            }
        },
        RangeSelection::Unsatisfiable => http::build_416_response(total_size),
    }
}

fn check_preconditions(asset: &Asset, ctx: &RequestContext<'_>) -> Precondition {
    let etag = asset.etag.as_str();
    let last_modified = &asset.bundled_at;

    let write_guard_failed = match ctx.if_match {
        Some(list) => !cache::etag_list_matches(list, etag, TagComparison::Strong),
        None => cache::modified_since(ctx.if_unmodified_since, last_modified) == Some(true),
    };
    if write_guard_failed {
        return Precondition::Failed;
    }

    match ctx.if_none_match {
        Some(list) if cache::etag_list_matches(list, etag, TagComparison::Weak) => {
            if ctx.is_get_or_head {
                Precondition::NotModified
            } else {
                Precondition::Failed
            }
        }
        Some(_) => Precondition::Proceed,
        None if ctx.is_get_or_head
            && cache::modified_since(ctx.if_modified_since, last_modified) == Some(false) =>
        {
            Precondition::NotModified
        }
        None => Precondition::Proceed,
    }
}

/// Part separator derived from the content hash, stable for a given asset
fn multipart_boundary(etag: &str) -> String {
    etag.trim_matches('"').to_string()
}
