//! Rendering and delivery of the selected observation group.
//!
//! `render_group` produces the JSON artifact; `Publisher` implementations
//! put it somewhere durable:
//! - `ftp` — remote file store (the production target).
//! - `local` — a directory on disk, kept as a fallback copy.

pub mod ftp;
pub mod local;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::model::{AssembledRecord, RelayError};

/// Delivery target for a rendered artifact.
pub trait Publisher {
    /// Human-readable destination, used in log lines.
    fn describe(&self) -> String;

    /// Stores `payload` under `filename`, replacing any existing file.
    fn publish(&self, filename: &str, payload: &[u8]) -> Result<(), RelayError>;
}

/// Renders records as a pretty-printed JSON array (4-space indent).
pub fn render_group(records: &[AssembledRecord]) -> Result<Vec<u8>, RelayError> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    records
        .serialize(&mut ser)
        .map_err(|e| RelayError::Serialize(e.to_string()))?;
    Ok(buf)
}

/// Remote filename for a group, e.g. `2025-05-12_12Z.json`.
pub fn output_filename(group_key: &str) -> String {
    format!("{}.json", group_key)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
