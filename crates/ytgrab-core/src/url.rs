//! `YouTube` URL recognizers.
//!
//! These are purely syntactic: none of them touch the network. Whether a
//! recognized channel or video actually exists is decided by the
//! [`VideoSource`](crate::source::VideoSource).

use regex::Regex;

/// Base of every canonical URL produced by this module.
pub const YOUTUBE_BASE: &str = "https://www.youtube.com";

/// The signed-in user's "Watch Later" list. It cannot be downloaded anonymously.
pub const WATCH_LATER_URL: &str = "https://www.youtube.com/playlist?list=WL";

/// Channel path patterns, tried in order. Group 1 is the URI style, group 2 the
/// identifier.
const CHANNEL_PATTERNS: [&str; 5] = [
    r"/(c)/([%\d\w_\-]+)",
    r"/(channel)/([%\w\d_\-]+)",
    r"/(u)/([%\d\w_\-]+)",
    r"/(user)/([%\w\d_\-]+)",
    r"/(@)([%\d\w_\-\.]+)",
];

/// Extract the 11-character video identifier from a URL.
///
/// Accepts `watch?v=<id>`, `youtu.be/<id>`, `/embed/<id>`, `/shorts/<id>` and
/// similar forms.
#[must_use]
pub fn extract_video_id(url: &str) -> Option<String> {
    let re = Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").ok()?;
    re.captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Whether the URL carries a playlist identifier (`list=`).
#[must_use]
pub fn has_playlist_marker(url: &str) -> bool {
    url.to_ascii_lowercase().contains("list=")
}

/// Extract the playlist identifier that follows `list=`.
#[must_use]
pub fn extract_playlist_id(url: &str) -> Option<String> {
    let url_lower = url.to_ascii_lowercase();
    let list_pos = url_lower.find("list=")?;
    let rest = &url[list_pos + 5..];

    // Extract until next & or # or end of string
    let end = rest.find(['&', '#']).unwrap_or(rest.len());
    let playlist_id = rest[..end].trim();

    if playlist_id.is_empty() {
        None
    } else {
        Some(playlist_id.to_string())
    }
}

/// Extract the channel path from a URL: `/c/<id>`, `/channel/<id>`,
/// `/u/<id>`, `/user/<id>` or `/@<handle>`.
#[must_use]
pub fn channel_name(url: &str) -> Option<String> {
    CHANNEL_PATTERNS.iter().find_map(|pattern| {
        let caps = Regex::new(pattern).ok()?.captures(url)?;
        let style = caps.get(1)?.as_str();
        let identifier = caps.get(2)?.as_str();
        Some(if style == "@" {
            format!("/@{identifier}")
        } else {
            format!("/{style}/{identifier}")
        })
    })
}

/// The canonical channel URL, with a trailing slash.
#[must_use]
pub fn channel_base_url(url: &str) -> Option<String> {
    channel_name(url).map(|name| format!("{YOUTUBE_BASE}{name}/"))
}

/// Whether the URL names a channel.
///
/// Only the URL pattern is checked; the channel may not exist.
#[must_use]
pub fn check_channel_or_playlist_url(url: &str) -> bool {
    channel_name(url).is_some()
}

/// Canonical playlist URL for a playlist identifier.
#[must_use]
pub fn playlist_url(playlist_id: &str) -> String {
    format!("{YOUTUBE_BASE}/playlist?list={playlist_id}")
}

/// Canonical watch URL for a video identifier.
#[must_use]
pub fn watch_url(video_id: &str) -> String {
    format!("{YOUTUBE_BASE}/watch?v={video_id}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod video_id_tests {
        use super::*;

        #[test]
        fn test_watch_url() {
            assert_eq!(
                extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
                Some("dQw4w9WgXcQ".to_string())
            );
        }

        #[test]
        fn test_short_url_with_query() {
            assert_eq!(
                extract_video_id("https://youtu.be/T5KBMhw87n8?feature=shared"),
                Some("T5KBMhw87n8".to_string())
            );
        }

        #[test]
        fn test_embed_and_shorts() {
            assert_eq!(
                extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
                Some("dQw4w9WgXcQ".to_string())
            );
            assert_eq!(
                extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"),
                Some("dQw4w9WgXcQ".to_string())
            );
        }

        #[test]
        fn test_no_video_id() {
            assert_eq!(extract_video_id(""), None);
            assert_eq!(extract_video_id("not a url"), None);
            assert_eq!(extract_video_id("https://www.youtube.com/@standjardanjar"), None);
        }
    }

    mod playlist_tests {
        use super::*;

        #[test]
        fn test_marker() {
            assert!(has_playlist_marker(
                "https://www.youtube.com/playlist?list=PLdQkToevBvCpDNl4Udlnhn13y8y1mTi5A"
            ));
            assert!(has_playlist_marker(
                "https://www.youtube.com/watch?v=abc&LIST=PLtest"
            ));
            assert!(!has_playlist_marker("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        }

        #[test]
        fn test_extract_id() {
            assert_eq!(
                extract_playlist_id("https://www.youtube.com/watch?v=abc&list=PLtest123&index=2"),
                Some("PLtest123".to_string())
            );
            assert_eq!(
                extract_playlist_id("https://www.youtube.com/playlist?list=PLtest123#section"),
                Some("PLtest123".to_string())
            );
            assert_eq!(extract_playlist_id("https://www.youtube.com/playlist?list="), None);
        }

        #[test]
        fn test_canonical_urls() {
            assert_eq!(
                playlist_url("PLtest"),
                "https://www.youtube.com/playlist?list=PLtest"
            );
            assert_eq!(playlist_url("WL"), WATCH_LATER_URL);
            assert_eq!(watch_url("abc"), "https://www.youtube.com/watch?v=abc");
        }
    }

    mod channel_tests {
        use super::*;

        #[test]
        fn test_handle() {
            assert_eq!(
                channel_name("https://www.youtube.com/@alyankovic/"),
                Some("/@alyankovic".to_string())
            );
            assert_eq!(
                channel_name("https://www.youtube.com/@some.name/videos"),
                Some("/@some.name".to_string())
            );
        }

        #[test]
        fn test_channel_id() {
            assert_eq!(
                channel_name("https://www.youtube.com/channel/UCDBrVr0ttWpoRY-_yZajp2Q"),
                Some("/channel/UCDBrVr0ttWpoRY-_yZajp2Q".to_string())
            );
        }

        #[test]
        fn test_legacy_styles() {
            assert_eq!(
                channel_name("https://www.youtube.com/c/SomeName/featured"),
                Some("/c/SomeName".to_string())
            );
            assert_eq!(
                channel_name("https://www.youtube.com/user/oldname"),
                Some("/user/oldname".to_string())
            );
            assert_eq!(
                channel_name("https://www.youtube.com/u/short"),
                Some("/u/short".to_string())
            );
        }

        #[test]
        fn test_not_a_channel() {
            assert_eq!(channel_name("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), None);
            assert_eq!(
                channel_name("https://www.youtube.com/playlist?list=PLtest"),
                None
            );
            assert_eq!(channel_name(""), None);
        }

        #[test]
        fn test_base_url() {
            assert_eq!(
                channel_base_url("https://www.youtube.com/@standjardanjar"),
                Some("https://www.youtube.com/@standjardanjar/".to_string())
            );
            assert_eq!(
                channel_base_url("https://youtube.com/channel/UC123/videos"),
                Some("https://www.youtube.com/channel/UC123/".to_string())
            );
        }

        #[test]
        fn test_check_channel_or_playlist_url() {
            assert!(check_channel_or_playlist_url("https://www.youtube.com/@alyankovic"));
            assert!(!check_channel_or_playlist_url(
                "https://youtu.be/T5KBMhw87n8"
            ));
        }
    }
}
