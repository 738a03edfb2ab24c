//! Threshold, ranking and rounding rules shared by the per-city aggregates.

use crate::domain::model::LocationEntry;
use std::cmp::Ordering;

/// Cities with a smaller share of all vacancies are left out of rankings.
pub const SHARE_THRESHOLD: f64 = 0.01;
pub const TOP_LOCATIONS: usize = 10;
const SHARE_DECIMALS: usize = 4;

pub fn share_of(count: u64, total: usize) -> f64 {
    count as f64 / total as f64
}

pub fn meets_share_threshold(count: u64, total: usize) -> bool {
    share_of(count, total) >= SHARE_THRESHOLD
}

/// Sorts descending by value and keeps the first [`TOP_LOCATIONS`]. The sort
/// is stable, so equal values stay in first-seen order.
pub fn rank_top<V: PartialOrd>(mut entries: Vec<LocationEntry<V>>) -> Vec<LocationEntry<V>> {
    entries.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    entries.truncate(TOP_LOCATIONS);
    entries
}

/// Rounds to four decimals from the exact binary value, half to even.
pub fn round_share(value: f64) -> f64 {
    format!("{:.*}", SHARE_DECIMALS, value)
        .parse()
        .unwrap_or(value)
}
