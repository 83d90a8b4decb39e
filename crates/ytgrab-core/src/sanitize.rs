//! Filesystem-safe names for titles and channel names.

/// Characters that are illegal in a path segment on at least one platform.
const ILLEGAL_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Marker appended by the platform to truncated titles.
const ELLIPSIS: &str = "...";

/// Sanitize a title or author name for use as a path segment.
///
/// Removes `< > : " / \ | ? *`, drops a trailing `...` and trims surrounding
/// whitespace. The result is stable under repeated application.
#[must_use]
pub fn sanitize(text: &str) -> String {
    let cleaned: String = text.chars().filter(|c| !ILLEGAL_CHARS.contains(c)).collect();

    let mut trimmed = cleaned.trim();
    while let Some(stripped) = trimmed.strip_suffix(ELLIPSIS) {
        trimmed = stripped.trim();
    }

    trimmed.to_string()
}

/// Sanitize a video title and append the container extension.
#[must_use]
pub fn sanitize_file_name(title: &str, extension: &str) -> String {
    format!("{}.{extension}", sanitize(title))
}
