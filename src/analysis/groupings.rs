//! Hourly observation groups and latest-group selection.
//!
//! Records are bucketed under `YYYY-MM-DD_HHZ` keys. The container keeps
//! first-insertion order, which is what breaks ties when two keys resolve
//! to the same timestamp.

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;

use crate::model::{AssembledRecord, ReportTimestamp};

/// Derives the hourly group key from raw date (`YYYYMMDD`) and time
/// (`HHMM`) digits, e.g. `("20250512", "1230")` → `"2025-05-12_12Z"`.
pub fn derive_group_key(date_digits: &str, time_digits: &str) -> String {
    ReportTimestamp::new(date_digits, time_digits).group_key()
}

/// Parses a group key back into a comparable timestamp.
///
/// Returns `None` when the key is not a valid `YYYY-MM-DD_HHZ` calendar
/// hour (e.g. a bulletin line carrying month 13).
pub fn parse_group_key(key: &str) -> Option<NaiveDateTime> {
    let (date, hour) = key.split_once('_')?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let hour: u32 = hour.strip_suffix('Z')?.parse().ok()?;
    date.and_hms_opt(hour, 0, 0)
}

/// Assembled records bucketed by observation hour.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedObservations {
    groups: IndexMap<String, Vec<AssembledRecord>>,
}

impl GroupedObservations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record under its group key, creating the group if needed.
    pub fn insert(&mut self, key: String, record: AssembledRecord) {
        self.groups.entry(key).or_default().push(record);
    }

    pub fn get(&self, key: &str) -> Option<&[AssembledRecord]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    /// Number of distinct observation hours.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total records across all groups.
    pub fn record_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Group keys in first-insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Unions another parse into this one. Per-key sequences are
    /// concatenated, `other`'s records after ours; new keys go last.
    pub fn merge(&mut self, other: GroupedObservations) {
        for (key, records) in other.groups {
            self.groups.entry(key).or_default().extend(records);
        }
    }

    /// Key of the most recent observation hour, or `None` when no group
    /// was formed.
    ///
    /// The comparison is strictly greater-than, so among keys that parse
    /// to the same timestamp the first one inserted wins. Keys that do not
    /// parse are skipped.
    pub fn latest_key(&self) -> Option<&str> {
        let mut latest: Option<(&str, NaiveDateTime)> = None;
        for key in self.groups.keys() {
            let Some(timestamp) = parse_group_key(key) else {
                continue;
            };
            if latest.is_none_or(|(_, best)| timestamp > best) {
                latest = Some((key.as_str(), timestamp));
            }
        }
        latest.map(|(key, _)| key)
    }

    /// The most recent group together with its key.
    pub fn latest(&self) -> Option<(&str, &[AssembledRecord])> {
        let key = self.latest_key()?;
        self.get(key).map(|records| (key, records))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
