/// StationContext, ReportTimestamp, AssembledRecord, RelayError
/// core data structures and error handling
///
/// Core data types for the SYNOP relay service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O; the only logic is the timestamp formatting that every
/// report-closing path has to agree on.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Station context
// ---------------------------------------------------------------------------

/// Metadata from the most recent `# SYNOPS from ...` header line.
///
/// All fields are kept verbatim as they appear in the bulletin; nothing is
/// converted to numbers. The context stays active for every report that
/// closes until the next header replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationContext {
    pub wmo_id: String,
    pub station_name: String,
    pub latitude: String,   // e.g. "23-46N"
    pub longitude: String,  // e.g. "090-23E"
    pub elevation: String,  // metres, without the trailing "m"
}

// ---------------------------------------------------------------------------
// Report timestamp
// ---------------------------------------------------------------------------

/// Date/time digits captured from a report-start line.
///
/// The assembler keeps the match from the line that *opened* the report and
/// uses it when the report is closed, whatever line does the closing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTimestamp {
    pub date_digits: String, // YYYYMMDD
    pub time_digits: String, // HHMM
}

impl ReportTimestamp {
    pub fn new(date_digits: &str, time_digits: &str) -> Self {
        ReportTimestamp {
            date_digits: date_digits.to_string(),
            time_digits: time_digits.to_string(),
        }
    }

    /// `YYYY-MM-DD`
    pub fn date(&self) -> String {
        let d = &self.date_digits;
        format!("{}-{}-{}", &d[0..4], &d[4..6], &d[6..8])
    }

    /// Two-digit hour, minutes dropped.
    pub fn hour(&self) -> &str {
        &self.time_digits[0..2]
    }

    /// `YYYY-MM-DD HH:MMZ`, the value of the record's `datetime` field.
    pub fn datetime(&self) -> String {
        let t = &self.time_digits;
        format!("{} {}:{}Z", self.date(), &t[0..2], &t[2..4])
    }

    /// `YYYY-MM-DD_HHZ`, the hourly bucket this report belongs to.
    pub fn group_key(&self) -> String {
        format!("{}_{}Z", self.date(), self.hour())
    }
}

// ---------------------------------------------------------------------------
// Assembled records
// ---------------------------------------------------------------------------

/// One complete SYNOP report tagged with its station.
///
/// Field order matches the published JSON objects. `weather_data` is the
/// space-joined body text; the code groups are never decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledRecord {
    pub datetime: String,
    pub wmo_id: String,
    pub station_name: String,
    pub latitude: String,
    pub longitude: String,
    pub elevation: String,
    pub weather_data: String,
}

impl AssembledRecord {
    pub fn new(timestamp: &ReportTimestamp, station: &StationContext, weather_data: String) -> Self {
        AssembledRecord {
            datetime: timestamp.datetime(),
            wmo_id: station.wmo_id.clone(),
            station_name: station.station_name.clone(),
            latitude: station.latitude.clone(),
            longitude: station.longitude.clone(),
            elevation: station.elevation.clone(),
            weather_data,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Step of an upload that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStage {
    Connect,
    Login,
    ChangeDirectory,
    Transfer,
    /// Writing the local fallback copy.
    Write,
}

impl std::fmt::Display for DeliveryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStage::Connect => write!(f, "connect"),
            DeliveryStage::Login => write!(f, "login"),
            DeliveryStage::ChangeDirectory => write!(f, "change directory"),
            DeliveryStage::Transfer => write!(f, "transfer"),
            DeliveryStage::Write => write!(f, "write"),
        }
    }
}

/// Errors that can end a relay run.
///
/// Parsing never produces an error; an unusable bulletin surfaces as
/// `NoDataFound`, which callers treat as an expected outcome.
#[derive(Debug, PartialEq)]
pub enum RelayError {
    /// The bulletin could not be obtained (transport or read failure).
    Fetch { source: String, message: String },
    /// Non-2xx HTTP response for the bulletin.
    HttpStatus { url: String, status: u16 },
    /// The bulletin was fetched but no observation group could be formed.
    NoDataFound,
    /// The artifact was built but could not be delivered.
    Delivery { stage: DeliveryStage, message: String },
    /// Missing or invalid configuration.
    Config(String),
    /// The selected group could not be rendered as JSON.
    Serialize(String),
}

impl RelayError {
    /// `true` for the expected "nothing to publish" outcome.
    pub fn is_no_data(&self) -> bool {
        matches!(self, RelayError::NoDataFound)
    }
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::Fetch { source, message } => {
                write!(f, "Error fetching data from {}: {}", source, message)
            }
            RelayError::HttpStatus { url, status } => {
                write!(f, "HTTP error {} from {}", status, url)
            }
            RelayError::NoDataFound => write!(f, "No valid observation data found"),
            RelayError::Delivery { stage, message } => {
                write!(f, "Delivery failed at {}: {}", stage, message)
            }
            RelayError::Config(msg) => write!(f, "Configuration error: {}", msg),
            RelayError::Serialize(msg) => write!(f, "JSON error: {}", msg),
        }
    }
}

impl std::error::Error for RelayError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
