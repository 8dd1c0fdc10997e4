/// Bulletin acquisition and parsing.
///
/// - `ogimet` — where bulletin text comes from (HTTP or a saved file).
/// - `synop` — turns bulletin text into assembled, hour-grouped reports.

pub mod ogimet;
pub mod synop;
