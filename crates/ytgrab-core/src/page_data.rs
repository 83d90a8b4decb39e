//! Scraping helpers for the JSON blob embedded in `YouTube` pages.
//!
//! Channel and playlist pages ship their content as a `ytInitialData`
//! JavaScript assignment. [`extract_yt_initial_data`] lifts it out of the HTML
//! and [`find_values`] walks the resulting tree for a key at any depth.

use serde_json::Value;
use tracing::debug;

use crate::error::{DownloadError, Result};

/// Lazy depth-first search for every value stored under `key`.
///
/// Created by [`find_values`]. Objects and arrays are descended into,
/// including the values that matched.
#[derive(Debug, Clone)]
pub struct FindValues<'a> {
    key: &'a str,
    stack: Vec<&'a Value>,
    pending: Vec<&'a Value>,
}

impl<'a> Iterator for FindValues<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(found) = self.pending.pop() {
                return Some(found);
            }

            match self.stack.pop()? {
                Value::Object(map) => {
                    // Push in reverse so popping follows key order.
                    for (k, v) in map.iter().rev() {
                        if v.is_object() || v.is_array() {
                            self.stack.push(v);
                        }
                        if k == self.key {
                            self.pending.push(v);
                        }
                    }
                }
                Value::Array(items) => {
                    for v in items.iter().rev() {
                        if v.is_object() || v.is_array() {
                            self.stack.push(v);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

/// Find every value keyed `key` anywhere inside `root`.
#[must_use]
pub fn find_values<'a>(root: &'a Value, key: &'a str) -> FindValues<'a> {
    FindValues {
        key,
        stack: vec![root],
        pending: Vec::new(),
    }
}

/// Find every string value keyed `key`, deduplicated, in document order.
#[must_use]
pub fn find_unique_strings(root: &Value, key: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for value in find_values(root, key) {
        if let Some(s) = value.as_str()
            && !found.iter().any(|f| f == s)
        {
            found.push(s.to_string());
        }
    }
    found
}

/// Extract the `ytInitialData` JSON object from a page's HTML.
pub fn extract_yt_initial_data(html: &str, page_url: &str) -> Result<Value> {
    let parse_failed = |reason: &str| DownloadError::PageParseFailed {
        url: page_url.to_string(),
        reason: reason.to_string(),
    };

    // Find the start of ytInitialData
    let start_pos = ["var ytInitialData = ", "ytInitialData = "]
        .iter()
        .find_map(|marker| html.find(marker).map(|pos| pos + marker.len()))
        .ok_or_else(|| parse_failed("Could not find ytInitialData in page"))?;

    // Find the JSON object by counting braces
    let json_bytes = &html.as_bytes()[start_pos..];
    if json_bytes.first() != Some(&b'{') {
        return Err(parse_failed("ytInitialData does not start with '{'").into());
    }

    let mut brace_count = 0usize;
    let mut end_pos = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &byte) in json_bytes.iter().enumerate() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match byte {
            b'\\' if in_string => escape_next = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => brace_count += 1,
            b'}' if !in_string => {
                brace_count -= 1;
                if brace_count == 0 {
                    end_pos = i + 1;
                    break;
                }
            }
            _ => {}
        }
    }

    if end_pos == 0 {
        return Err(parse_failed("Could not find end of ytInitialData JSON").into());
    }

    let json_str = &html[start_pos..start_pos + end_pos];
    debug!("Extracted ytInitialData JSON: {} bytes", json_str.len());

    serde_json::from_str(json_str).map_err(|e| {
        DownloadError::PageParseFailed {
            url: page_url.to_string(),
            reason: format!("Failed to parse ytInitialData: {e}"),
        }
        .into()
    })
}

/// Decode the HTML entities that appear in page titles.
#[must_use]
pub fn html_decode(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
}
