//! MIME type detection module
//!
//! Returns the corresponding Content-Type based on file extension. Unknown
//! extensions yield `None` and the header is left out.

/// Get MIME Content-Type based on file extension (case-insensitive)
///
/// # Examples
/// ```
/// use versions_cdn::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some("json")), Some("application/json"));
/// assert_eq!(get_content_type(Some("JPG")), Some("image/jpeg"));
/// assert_eq!(get_content_type(Some("sh")), None);
/// ```
pub fn get_content_type(extension: Option<&str>) -> Option<&'static str> {
    let extension = extension?.to_ascii_lowercase();
    let content_type = match extension.as_str() {
        "json" => "application/json",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",

        _ => return None,
    };
    Some(content_type)
}

/// Content-Type for a public URL path, from its final extension
pub fn content_type_for_path(path: &str) -> Option<&'static str> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    get_content_type(file_name.rsplit_once('.').map(|(_, ext)| ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(get_content_type(Some("json")), Some("application/json"));
        assert_eq!(get_content_type(Some("png")), Some("image/png"));
        assert_eq!(get_content_type(Some("jpeg")), Some("image/jpeg"));
        assert_eq!(get_content_type(Some("svg")), Some("image/svg+xml"));
        assert_eq!(get_content_type(Some("ico")), Some("image/x-icon"));
        assert_eq!(get_content_type(Some("BMP")), Some("image/bmp"));
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(get_content_type(Some("xyz")), None);
        assert_eq!(get_content_type(Some("html")), None);
        assert_eq!(get_content_type(None), None);
    }

    #[test]
    fn test_content_type_for_path() {
        assert_eq!(
            content_type_for_path("/versions.json"),
            Some("application/json")
        );
        assert_eq!(
            content_type_for_path("/icons/Logo.WebP"),
            Some("image/webp")
        );
        assert_eq!(content_type_for_path("/upgrade.sh"), None);
        assert_eq!(content_type_for_path("/v1.2/README"), None);
        assert_eq!(content_type_for_path("/"), None);
    }
}
