//! One relay run: fetch → parse → select latest hour → render → publish.
//!
//! The run is a single synchronous pass. Each bulletin source is parsed
//! with its own scan state and the resulting groups are merged in source
//! order before the latest hour is chosen.

use crate::analysis::groupings::GroupedObservations;
use crate::config::RelayConfig;
use crate::ingest::ogimet::{BulletinSource, FileSource, HttpSource, build_client};
use crate::ingest::synop::parse_bulletin;
use crate::logging::{self, Component};
use crate::model::RelayError;
use crate::publish::ftp::FtpPublisher;
use crate::publish::local::LocalDirPublisher;
use crate::publish::{Publisher, output_filename, render_group};

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Distinct observation hours found across all sources.
    pub observation_times: usize,
    pub latest_key: String,
    /// Records in the published group.
    pub record_count: usize,
    pub payload_bytes: usize,
    pub filename: String,
    /// Destinations that accepted the artifact.
    pub published_to: Vec<String>,
}

/// Rendered artifact for the most recent observation hour.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub group_key: String,
    pub filename: String,
    pub record_count: usize,
    pub payload: Vec<u8>,
}

/// Fetches and parses every source, merging the groups in order.
/// The first fetch failure aborts.
pub fn collect(sources: &[Box<dyn BulletinSource>]) -> Result<GroupedObservations, RelayError> {
    let mut groups = GroupedObservations::new();
    for source in sources {
        let origin = source.describe();
        let text = source.fetch()?;
        logging::info(
            Component::Fetch,
            Some(&origin),
            &format!("Successfully fetched data from {}", origin),
        );

        let parsed = parse_bulletin(&text);
        logging::debug(
            Component::Parse,
            Some(&origin),
            &format!("{} records in {} observation times", parsed.record_count(), parsed.len()),
        );
        groups.merge(parsed);
    }
    logging::info(
        Component::Parse,
        None,
        &format!("Parsed {} observation times", groups.len()),
    );
    Ok(groups)
}

/// Selects the latest hour and renders it, or reports `NoDataFound`.
pub fn build_artifact(groups: &GroupedObservations) -> Result<Artifact, RelayError> {
    let latest = groups.latest();
    logging::info(
        Component::Parse,
        None,
        &format!(
            "Latest observation time: {}",
            latest.map(|(key, _)| key).unwrap_or("None")
        ),
    );
    let (key, records) = latest.ok_or(RelayError::NoDataFound)?;

    let payload = render_group(records)?;
    logging::info(
        Component::Publish,
        None,
        &format!("Prepared JSON data, size: {} bytes", payload.len()),
    );

    Ok(Artifact {
        group_key: key.to_string(),
        filename: output_filename(key),
        record_count: records.len(),
        payload,
    })
}

/// Hands the artifact to every publisher in order. All publishers are
/// attempted; the first failure is returned afterwards.
pub fn deliver(artifact: &Artifact, publishers: &[Box<dyn Publisher>]) -> Result<Vec<String>, RelayError> {
    let mut delivered = Vec::new();
    let mut first_error = None;

    for publisher in publishers {
        let target = publisher.describe();
        match publisher.publish(&artifact.filename, &artifact.payload) {
            Ok(()) => delivered.push(target),
            Err(e) => {
                logging::log_failure(Component::Publish, Some(&target), "Upload", &e);
                first_error.get_or_insert(e);
            }
        }
    }

    logging::log_publish_summary(&artifact.filename, publishers.len(), delivered.len());
    match first_error {
        Some(e) => Err(e),
        None => Ok(delivered),
    }
}

/// Runs the whole pipeline against explicit collaborators.
pub fn run_with(
    sources: &[Box<dyn BulletinSource>],
    publishers: &[Box<dyn Publisher>],
) -> Result<RunSummary, RelayError> {
    let groups = collect(sources)?;
    let artifact = build_artifact(&groups)?;
    let published_to = deliver(&artifact, publishers)?;

    Ok(RunSummary {
        observation_times: groups.len(),
        latest_key: artifact.group_key,
        record_count: artifact.record_count,
        payload_bytes: artifact.payload.len(),
        filename: artifact.filename,
        published_to,
    })
}

/// Builds the sources described by `config`. A configured file replaces
/// the URL list.
pub fn sources_from_config(config: &RelayConfig) -> Result<Vec<Box<dyn BulletinSource>>, RelayError> {
    if let Some(path) = &config.source.file {
        return Ok(vec![Box::new(FileSource::new(path))]);
    }

    let client = build_client(config.source.timeout_secs, &config.source.user_agent)?;

    Ok(config
        .source
        .urls
        .iter()
        .map(|url| Box::new(HttpSource::with_client(client.clone(), url)) as Box<dyn BulletinSource>)
        .collect())
}

/// Builds the publishers described by `config`; the local copy comes
/// first so it exists even if the upload fails.
pub fn publishers_from_config(config: &RelayConfig) -> Result<Vec<Box<dyn Publisher>>, RelayError> {
    let mut publishers: Vec<Box<dyn Publisher>> = Vec::new();
    if let Some(dir) = &config.output.local_dir {
        publishers.push(Box::new(LocalDirPublisher::new(dir)));
    }
    if config.ftp.enabled {
        publishers.push(Box::new(FtpPublisher::from_config(&config.ftp)?));
    }
    Ok(publishers)
}

/// Runs the pipeline with collaborators built from `config`.
pub fn run(config: &RelayConfig) -> Result<RunSummary, RelayError> {
    logging::info(Component::System, None, "Starting weather data upload");
    let sources = sources_from_config(config)?;
    let publishers = publishers_from_config(config)?;
    run_with(&sources, &publishers)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
