//! Byte range selection
//!
//! Turns a `Range` header into the spans of an asset to send, and lays out
//! `multipart/byteranges` payloads when more than one span is asked for.

use hyper::body::Bytes;

const BYTES_UNIT: &str = "bytes=";

/// Inclusive span of byte offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpan {
    pub first: usize,
    pub last: usize,
}

impl ByteSpan {
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> usize {
        self.last - self.first + 1
    }

    /// `Content-Range` value for this span of a `total`-byte asset
    pub fn content_range(&self, total: usize) -> String {
        format!("bytes {}-{}/{total}", self.first, self.last)
    }
}

/// What a `Range` header selects from an asset
#[derive(Debug, PartialEq, Eq)]
pub enum RangeSelection {
    /// Send the whole asset with 200
    Whole,
    /// Send these spans with 206, in request order
    Spans(Vec<ByteSpan>),
    /// Answer 416: the header is malformed or no span touches the content
    Unsatisfiable,
}

/// Outcome of one comma-separated range spec
enum Spec {
    Span(ByteSpan),
    /// Well-formed but starting at or past the end of the asset
    Disjoint,
}

struct Malformed;

/// Select the spans a `Range` header asks for
///
/// - Missing header or a list with no specs: [`RangeSelection::Whole`].
/// - A unit other than `bytes`, or any unparseable spec:
///   [`RangeSelection::Unsatisfiable`].
/// - Specs past the end are dropped; if nothing remains the result is
///   unsatisfiable.
/// - Spans adding up to more than the asset (overlap tricks) fall back to
///   the whole asset.
///
/// # Examples
/// ```
/// use versions_cdn::http::range::{select_ranges, ByteSpan, RangeSelection};
///
/// assert_eq!(
///     select_ranges(Some("bytes=0-9"), 100),
///     RangeSelection::Spans(vec![ByteSpan { first: 0, last: 9 }])
/// );
/// assert_eq!(select_ranges(Some("items=0-9"), 100), RangeSelection::Unsatisfiable);
/// assert_eq!(select_ranges(None, 100), RangeSelection::Whole);
/// ```
pub fn select_ranges(header: Option<&str>, total: usize) -> RangeSelection {
    let Some(header) = header.map(str::trim).filter(|h| !h.is_empty()) else {
        return RangeSelection::Whole;
    };
    let Some(specs) = header.strip_prefix(BYTES_UNIT) else {
        return RangeSelection::Unsatisfiable;
    };

    let mut spans = Vec::new();
    let mut saw_disjoint = false;
    for spec in specs.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match parse_spec(spec, total) {
            Ok(Spec::Span(span)) => spans.push(span),
            Ok(Spec::Disjoint) => saw_disjoint = true,
            Err(Malformed) => return RangeSelection::Unsatisfiable,
        }
    }

    if spans.is_empty() {
        return if saw_disjoint {
            RangeSelection::Unsatisfiable
        } else {
            RangeSelection::Whole
        };
    }

    let requested = spans
        .iter()
        .fold(0usize, |sum, span| sum.saturating_add(span.len()));
    if requested > total {
        return RangeSelection::Whole;
    }

    RangeSelection::Spans(spans)
}

/// Parse `first-last`, `first-` or `-suffix`
fn parse_spec(spec: &str, total: usize) -> Result<Spec, Malformed> {
    let (first, last) = spec.split_once('-').ok_or(Malformed)?;
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        let suffix = parse_offset(last)?.min(total);
        if suffix == 0 {
            return Ok(Spec::Disjoint);
        }
        return Ok(Spec::Span(ByteSpan {
            first: total - suffix,
            last: total - 1,
        }));
    }

    let first = parse_offset(first)?;
    if first >= total {
        return Ok(Spec::Disjoint);
    }
    if last.is_empty() {
        return Ok(Spec::Span(ByteSpan {
            first,
            last: total - 1,
        }));
    }

    let last = parse_offset(last)?;
    if last < first {
        return Err(Malformed);
    }
    Ok(Spec::Span(ByteSpan {
        first,
        last: last.min(total - 1),
    }))
}

fn parse_offset(text: &str) -> Result<usize, Malformed> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Malformed);
    }
    text.parse().map_err(|_| Malformed)
}

/// Lay out `spans` of `content` as a `multipart/byteranges` body
///
/// Each part carries its own `Content-Range`, plus `Content-Type` when the
/// asset has one.
pub fn multipart_body(
    content: &Bytes,
    spans: &[ByteSpan],
    content_type: Option<&str>,
    boundary: &str,
) -> Bytes {
    let total = content.len();
    let mut body = Vec::with_capacity(spans.iter().map(ByteSpan::len).sum::<usize>() + 128);

    for (index, span) in spans.iter().enumerate() {
        if index > 0 {
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(format!("Content-Range: {}\r\n", span.content_range(total)).as_bytes());
        if let Some(content_type) = content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&content[span.first..=span.last]);
    }
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Bytes::from(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(header: &str, total: usize) -> Vec<ByteSpan> {
        match select_ranges(Some(header), total) {
            RangeSelection::Spans(spans) => spans,
            other => panic!("{header}: expected spans, got {other:?}"),
        }
    }

    const fn span(first: usize, last: usize) -> ByteSpan {
        ByteSpan { first, last }
    }

    #[test]
    fn test_whole_without_header() {
        assert_eq!(select_ranges(None, 100), RangeSelection::Whole);
        assert_eq!(select_ranges(Some(""), 100), RangeSelection::Whole);
        assert_eq!(select_ranges(Some("bytes=,"), 100), RangeSelection::Whole);
    }

    #[test]
    fn test_single_forms() {
        assert_eq!(spans("bytes=0-9", 100), vec![span(0, 9)]);
        assert_eq!(spans("bytes=50-", 100), vec![span(50, 99)]);
        assert_eq!(spans("bytes=-20", 100), vec![span(80, 99)]);
        assert_eq!(spans("bytes= 5 - 6 ", 100), vec![span(5, 6)]);
        // End past the asset is clamped, suffix longer than the asset takes all of it
        assert_eq!(spans("bytes=90-500", 100), vec![span(90, 99)]);
        assert_eq!(spans("bytes=-500", 100), vec![span(0, 99)]);
        assert_eq!(span(90, 99).len(), 10);
        assert_eq!(span(90, 99).content_range(100), "bytes 90-99/100");
    }

    #[test]
    fn test_several_spans() {
        assert_eq!(
            spans("bytes=0-1,3-4, -2", 20),
            vec![span(0, 1), span(3, 4), span(18, 19)]
        );
        // Disjoint specs are dropped while others remain
        assert_eq!(spans("bytes=200-300,0-4", 20), vec![span(0, 4)]);
    }

    #[test]
    fn test_oversized_request_serves_whole() {
        assert_eq!(
            select_ranges(Some("bytes=0-9,0-9,0-9"), 20),
            RangeSelection::Whole
        );
    }

    #[test]
    fn test_unsatisfiable() {
        for header in [
            "bytes=100-",
            "bytes=200-300",
            "bytes=-0",
            "bytes=9-3",
            "bytes=a-b",
            "bytes=5",
            "bytes=--5",
            "bytes=+1-2",
            "bytes=0-1,x",
            "items=0-9",
            "0-9",
        ] {
            assert_eq!(
                select_ranges(Some(header), 100),
                RangeSelection::Unsatisfiable,
                "{header}"
            );
        }
    }

    #[test]
    fn test_empty_asset() {
        assert_eq!(
            select_ranges(Some("bytes=0-9"), 0),
            RangeSelection::Unsatisfiable
        );
        assert_eq!(
            select_ranges(Some("bytes=-5"), 0),
            RangeSelection::Unsatisfiable
        );
    }

    #[test]
    fn test_multipart_layout() {
        let content = Bytes::from_static(b"0123456789");
        let body = multipart_body(
            &content,
            &[span(0, 1), span(8, 9)],
            Some("application/json"),
            "XYZ",
        );
        assert_eq!(
            body,
            Bytes::from_static(
                b"--XYZ\r\nContent-Range: bytes 0-1/10\r\nContent-Type: application/json\r\n\r\n01\
                  \r\n--XYZ\r\nContent-Range: bytes 8-9/10\r\nContent-Type: application/json\r\n\r\n89\
                  \r\n--XYZ--\r\n"
            )
        );

        let untyped = multipart_body(&content, &[span(2, 2)], None, "B");
        assert_eq!(
            untyped,
            Bytes::from_static(b"--B\r\nContent-Range: bytes 2-2/10\r\n\r\n2\r\n--B--\r\n")
        );
    }
}
