//! Sample-to-row projection
//!
//! Pure functions converting one sample plus the fixed tag set into an
//! ordered row of cells. Column order is always `timestamp, metric_name,
//! metric_value` followed by the tag columns in their sorted order.

use crate::sample::Sample;
use chrono::SecondsFormat;

/// Build the header row for the given tag columns.
pub fn header_row(tags: &[String]) -> Vec<String> {
    let mut header = vec![
        "timestamp".to_string(),
        "metric_name".to_string(),
        "metric_value".to_string(),
    ];
    header.extend(tags.iter().cloned());
    header
}

/// Convert one sample into a row of `3 + tags.len()` cells.
///
/// Timestamps render as RFC3339 with second precision and offset. Values
/// render as fixed-point with six digits after the decimal; non-finite
/// values take Rust's standard `f64` text forms (`NaN`, `inf`, `-inf`).
/// A tag absent from the sample's map yields an empty cell, never an
/// omitted column.
pub fn sample_to_row(sample: &Sample, tags: &[String]) -> Vec<String> {
    let mut row = Vec::with_capacity(3 + tags.len());
    row.push(
        sample
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Secs, true),
    );
    row.push(sample.metric.clone());
    row.push(format!("{:.6}", sample.value));

    for tag in tags {
        row.push(sample.tags.get(tag).cloned().unwrap_or_default());
    }

    row
}
