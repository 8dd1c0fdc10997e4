/// SYNOP bulletin parser
///
/// Turns the plain-text bulletin served by ogimet into assembled reports.
/// The bulletin interleaves station header lines with one or more SYNOP
/// reports per station:
///
/// ```text
/// # SYNOPS from 41923, Dhaka | 23-46N | 090-23E | 9 m
/// 202505120000 AAXX 12001 41923 32960 60000 10260 20240
///                   333 10320 20250=
/// ```
///
/// Line classification is an ordered list of independent matchers (header,
/// report start, continuation, terminator). Anything that matches none of
/// them is skipped, so parsing cannot fail. The scan state is a plain value
/// (`ScanState`) that is fed one line at a time.

use std::sync::LazyLock;

use regex::Regex;

use crate::analysis::groupings::GroupedObservations;
use crate::model::{AssembledRecord, ReportTimestamp, StationContext};

/// Characters dropped from the front of a report-start line before the
/// remainder becomes the first body fragment (`YYYYMMDDHHMM AAXX `).
pub const REPORT_START_OFFSET: usize = 18;

// ASCII digits only. `\d` also matches other Unicode digits, and
// `ReportTimestamp` slices its digits by byte offset.
static STATION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#\s*SYNOPS from ([0-9]+), ([^|]+) \| ([^|]+) \| ([^|]+) \| ([^m]+) m")
        .expect("station header pattern is valid")
});

static REPORT_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{8})\s*([0-9]{4})\s+AAXX").expect("report start pattern is valid")
});

static CONTINUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3}\s+").expect("continuation pattern is valid"));

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Splits a bulletin into trimmed, non-blank lines.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(str::trim).filter(|line| !line.is_empty())
}

// ---------------------------------------------------------------------------
// Line matchers
// ---------------------------------------------------------------------------

/// Recognizes a `# SYNOPS from <id>, <name> | <lat> | <lon> | <elev> m` line.
pub fn match_station_header(line: &str) -> Option<StationContext> {
    let caps = STATION_HEADER.captures(line)?;
    Some(StationContext {
        wmo_id: caps[1].to_string(),
        station_name: caps[2].trim().to_string(),
        latitude: caps[3].to_string(),
        longitude: caps[4].to_string(),
        elevation: caps[5].trim().to_string(),
    })
}

/// Recognizes a report-start line and returns its timestamp plus the
/// first body fragment (everything after the fixed offset, trimmed).
pub fn match_report_start(line: &str) -> Option<(ReportTimestamp, &str)> {
    let caps = REPORT_START.captures(line)?;
    let timestamp = ReportTimestamp::new(&caps[1], &caps[2]);
    let tail = line
        .char_indices()
        .nth(REPORT_START_OFFSET)
        .map(|(idx, _)| &line[idx..])
        .unwrap_or("");
    Some((timestamp, tail.trim()))
}

/// Recognizes a continuation line (`333 ...`, `555 ...`) and returns the
/// text after the section code.
pub fn match_continuation(line: &str) -> Option<&str> {
    CONTINUATION
        .find(line)
        .map(|m| line[m.end()..].trim())
}

/// Recognizes a line that ends a report and returns it without the `=`.
pub fn match_terminator(line: &str) -> Option<&str> {
    line.strip_suffix('=').map(str::trim)
}

// ---------------------------------------------------------------------------
// Report assembler
// ---------------------------------------------------------------------------

/// Mutable state carried from one bulletin line to the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanState {
    /// Context from the latest header line, if one has been seen.
    pub station: Option<StationContext>,
    /// `true` while a report body is being accumulated.
    pub collecting: bool,
    /// Body fragments of the report in progress.
    pub body: Vec<String>,
    /// Timestamp of the line that opened the report in progress.
    pub previous: Option<ReportTimestamp>,
}

/// A report that has just been closed, with the hourly group it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedReport {
    pub group_key: String,
    pub record: AssembledRecord,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes one trimmed, non-blank line. Returns a record when this
    /// line closes a report.
    pub fn step(&mut self, line: &str) -> Option<ClosedReport> {
        if let Some(station) = match_station_header(line) {
            self.station = Some(station);
            return None;
        }

        if let Some((timestamp, tail)) = match_report_start(line) {
            let closed = if self.collecting { self.close() } else { None };
            self.body.clear();
            self.push_fragment(tail);
            self.previous = Some(timestamp);
            self.collecting = true;
            return closed;
        }

        if !self.collecting {
            return None;
        }

        if let Some(rest) = match_continuation(line) {
            self.push_fragment(rest);
            return None;
        }

        if let Some(rest) = match_terminator(line) {
            self.push_fragment(rest);
            let closed = self.close();
            self.body.clear();
            self.collecting = false;
            return closed;
        }

        None
    }

    /// Closes a report left open at end of input (no trailing `=`).
    pub fn finish(self) -> Option<ClosedReport> {
        if self.collecting { self.close() } else { None }
    }

    fn push_fragment(&mut self, fragment: &str) {
        if !fragment.is_empty() {
            self.body.push(fragment.to_string());
        }
    }

    /// Builds the record for the report in progress from the opening
    /// timestamp and the station active now. Needs both and a non-empty body.
    fn close(&self) -> Option<ClosedReport> {
        if self.body.is_empty() {
            return None;
        }
        let station = self.station.as_ref()?;
        let timestamp = self.previous.as_ref()?;
        Some(ClosedReport {
            group_key: timestamp.group_key(),
            record: AssembledRecord::new(timestamp, station, self.body.join(" ")),
        })
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Parses a whole bulletin into observation groups keyed by hour.
pub fn parse_bulletin(text: &str) -> GroupedObservations {
    let mut groups = GroupedObservations::new();
    let mut state = ScanState::new();

    for line in tokenize(text) {
        if let Some(closed) = state.step(line) {
            groups.insert(closed.group_key, closed.record);
        }
    }
    if let Some(closed) = state.finish() {
        groups.insert(closed.group_key, closed.record);
    }

    groups
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
