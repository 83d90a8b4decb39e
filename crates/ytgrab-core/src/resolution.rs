//! Picking the best stream under a resolution cap.

use crate::error::{DownloadError, Result};
use crate::source::StreamInfo;

/// Container format that downloads are restricted to.
pub const TARGET_CONTAINER: &str = "mp4";

/// Resolutions offered to users, in ascending order.
pub const SUPPORTED_RESOLUTIONS: [u32; 6] = [144, 240, 360, 480, 720, 1080];

/// Default resolution cap.
pub const DEFAULT_MAX_RESOLUTION: u32 = 720;

/// Parse a quality label of the form `<integer>p` (a trailing frame rate such
/// as `720p60` is ignored).
#[must_use]
pub fn parse_resolution(label: &str) -> Option<u32> {
    let digits_end = label
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(label.len());
    if digits_end == 0 || !label[digits_end..].starts_with('p') {
        return None;
    }
    label[..digits_end].parse().ok()
}

/// Keep only single-file streams (audio and video together) in the target
/// container, preserving their order.
pub fn progressive_streams<'a>(
    streams: impl IntoIterator<Item = &'a StreamInfo>,
) -> Vec<&'a StreamInfo> {
    streams
        .into_iter()
        .filter(|s| s.is_progressive() && s.container.eq_ignore_ascii_case(TARGET_CONTAINER))
        .collect()
}

/// Select the highest-resolution stream not exceeding `max_resolution`.
///
/// Streams are ordered by resolution ascending (stable, so among equal
/// resolutions the later input wins) before the cap is applied. When nothing
/// fits under the cap the lowest-resolution stream is returned. Streams
/// without a resolution are only ever picked as that fallback, and only when
/// no stream carries a resolution at all.
pub fn select_stream<'a>(
    streams: &[&'a StreamInfo],
    max_resolution: u32,
    title: &str,
) -> Result<&'a StreamInfo> {
    let mut ranked: Vec<(u32, &'a StreamInfo)> = streams
        .iter()
        .filter_map(|s| s.resolution().map(|r| (r, *s)))
        .collect();
    ranked.sort_by_key(|(resolution, _)| *resolution);

    let fallback = ranked
        .first()
        .map(|(_, s)| *s)
        .or_else(|| streams.first().copied())
        .ok_or_else(|| DownloadError::NoStreams {
            title: title.to_string(),
        })?;

    let best = ranked
        .iter()
        .filter(|(resolution, _)| *resolution <= max_resolution)
        .next_back()
        .map_or(fallback, |(_, s)| *s);

    Ok(best)
}
