//! Video search: querying the source and paging through the results.

use tracing::{debug, info};

use crate::error::Result;
use crate::source::{SearchResult, VideoSource};

/// Results shown per page.
pub const RESULTS_PER_PAGE: usize = 3;

/// Search for videos matching `query`.
///
/// A blank query returns no results without contacting the source.
///
/// # Errors
///
/// Any error from the source, such as a failed results page fetch.
pub fn search_videos(source: &dyn VideoSource, query: &str) -> Result<Vec<SearchResult>> {
    let query = query.trim();
    if query.is_empty() {
        debug!("Empty search query, nothing to do");
        return Ok(Vec::new());
    }

    let results = source.search(query)?;
    info!("Search '{}' returned {} videos", query, results.len());
    Ok(results)
}

/// Split `results` into consecutive pages of at most `per_page` items.
///
/// Only the last page may be short. No results means no pages.
#[must_use]
pub fn paginate<T>(results: &[T], per_page: usize) -> Vec<&[T]> {
    results.chunks(per_page.max(1)).collect()
}

/// Split a duration in seconds into whole minutes and remaining seconds.
#[must_use]
pub const fn split_duration(seconds: u64) -> (u64, u64) {
    (seconds / 60, seconds % 60)
}

/// `m:ss`, or `?:??` when the length is unknown (live streams).
#[must_use]
pub fn format_duration(seconds: Option<u64>) -> String {
    seconds.map_or_else(
        || "?:??".to_string(),
        |secs| {
            let (minutes, secs) = split_duration(secs);
            format!("{minutes}:{secs:02}")
        },
    )
}

/// Parse a displayed length such as `4:13` or `1:02:03` into seconds.
#[must_use]
pub fn parse_duration_text(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    text.split(':').try_fold(0u64, |total, part| {
        let value = part.trim().parse::<u64>().ok()?;
        total.checked_mul(60)?.checked_add(value)
    })
}
