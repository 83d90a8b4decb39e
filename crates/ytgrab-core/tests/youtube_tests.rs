//! Tests against the live platform.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use ytgrab_core::{
    RESULTS_PER_PAGE, RustyYtdlSource, VideoSource, paginate, progressive_streams, search_videos,
};

#[test]
#[ignore = "requires network access - run with: cargo test --ignored -- --nocapture"]
fn test_resolve_video() {
    let source = RustyYtdlSource::new().expect("Should build source");

    let video = source
        .resolve_video("https://www.youtube.com/watch?v=FZ8BxMU3BYc")
        .unwrap_or_else(|e| panic!("Failed to resolve video: {e:?}"));

    println!("{} by {} ({} streams)", video.title, video.author, video.streams.len());
    assert_eq!(video.video_id, "FZ8BxMU3BYc");
    assert!(!progressive_streams(&video.streams).is_empty());
}

#[test]
#[ignore = "requires network access - run with: cargo test --ignored -- --nocapture"]
fn test_resolve_playlist() {
    let source = RustyYtdlSource::new().expect("Should build source");

    let playlist = source
        .resolve_playlist("https://www.youtube.com/playlist?list=PLw-VjHDlEOgvtnnnqWlTqByAtC7tXBg6D")
        .unwrap_or_else(|e| panic!("Failed to parse playlist: {e:?}"));

    println!("Playlist: {} ({} videos)", playlist.title, playlist.video_urls.len());
    for url in &playlist.video_urls {
        println!("  - {url}");
    }
    assert!(!playlist.video_urls.is_empty(), "Should find at least one video");
}

#[test]
#[ignore = "requires network access - run with: cargo test --ignored -- --nocapture"]
fn test_resolve_missing_channel() {
    let source = RustyYtdlSource::new().expect("Should build source");

    let err = source
        .resolve_channel("https://www.youtube.com/@this-channel-should-not-exist-0x7f3a/videos/")
        .unwrap_err();
    assert!(err.is_invalid_url(), "unexpected error: {err:?}");
}

#[test]
#[ignore = "requires network access - run with: cargo test --ignored -- --nocapture"]
fn test_search() {
    let source = RustyYtdlSource::new().expect("Should build source");

    let results = search_videos(&source, "rick astley never gonna give you up")
        .unwrap_or_else(|e| panic!("Search failed: {e:?}"));

    for page in paginate(&results, RESULTS_PER_PAGE) {
        for result in page {
            println!("{} - {} ({})", result.title, result.author, result.url);
        }
    }
    assert!(!results.is_empty(), "Should find at least one video");
}
