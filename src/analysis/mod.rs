/// Data organization for the SYNOP relay.
///
/// Parsed reports are bucketed by observation hour and the most recent
/// hour is chosen for publication. Records carry the report text
/// verbatim; SYNOP code groups are not decoded.
///
/// Submodules:
/// - `groupings` — hourly grouping, merging, and latest-hour selection.

pub mod groupings;
