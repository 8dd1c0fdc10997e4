//! SYNOP relay: fetches a SYNOP bulletin, assembles the reports it
//! contains, groups them by observation hour, and publishes the most
//! recent hour as JSON.

pub mod analysis;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod publish;
pub mod relay;
