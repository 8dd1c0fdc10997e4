/// Ogimet bulletin client
///
/// Retrieves the plain-text SYNOP bulletin for a country from ogimet's
/// display pages. The response is returned verbatim; `ingest::synop`
/// does all the interpretation.
///
/// Bulletin page: https://www.ogimet.com/display_synopsc2.php?lang=en&estado=Bang

use std::path::PathBuf;
use std::time::Duration;

use crate::model::RelayError;

/// Bangladesh SYNOP bulletin.
pub const DEFAULT_SOURCE_URL: &str = "https://www.ogimet.com/display_synopsc2.php?lang=en&estado=Bang";

/// Ogimet refuses requests without a browser-like agent.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

// ============================================================================
// Source abstraction
// ============================================================================

/// Anything that can supply a bulletin text blob.
pub trait BulletinSource {
    /// Human-readable origin, used in log lines and errors.
    fn describe(&self) -> String;

    fn fetch(&self) -> Result<String, RelayError>;
}

// ============================================================================
// HTTP source
// ============================================================================

/// Blocking client with the timeout and user agent every bulletin request
/// is sent with.
pub fn build_client(timeout_secs: u64, user_agent: &str) -> Result<reqwest::blocking::Client, RelayError> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .build()
        .map_err(|e| RelayError::Config(format!("HTTP client: {}", e)))
}

/// Fetches a bulletin with a blocking GET.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpSource {
    /// Builds a client with the given timeout and user agent.
    pub fn new(url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, RelayError> {
        Ok(Self::with_client(build_client(timeout_secs, user_agent)?, url))
    }

    /// Uses an existing client, e.g. one shared between several sources.
    pub fn with_client(client: reqwest::blocking::Client, url: &str) -> Self {
        HttpSource {
            client,
            url: url.to_string(),
        }
    }
}

impl BulletinSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<String, RelayError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| RelayError::Fetch {
                source: self.url.clone(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RelayError::HttpStatus {
                url: self.url.clone(),
                status: response.status().as_u16(),
            });
        }

        response.text().map_err(|e| RelayError::Fetch {
            source: self.url.clone(),
            message: format!("Failed to read response: {}", e),
        })
    }
}

// ============================================================================
// File source
// ============================================================================

/// Reads a previously saved bulletin from disk.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }
}

impl BulletinSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<String, RelayError> {
        std::fs::read_to_string(&self.path).map_err(|e| RelayError::Fetch {
            source: self.describe(),
            message: e.to_string(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_source_reads_bulletin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# SYNOPS from 41923, Dhaka | 23-46N | 090-23E | 9 m").unwrap();

        let source = FileSource::new(file.path());
        let text = source.fetch().unwrap();
        assert!(text.starts_with("# SYNOPS from 41923"));
    }

    #[test]
    fn test_file_source_missing_file_is_fetch_error() {
        let source = FileSource::new("/nonexistent/bulletin.txt");
        match source.fetch() {
            Err(RelayError::Fetch { source, .. }) => {
                assert_eq!(source, "/nonexistent/bulletin.txt");
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[test]
    fn test_build_client_is_shared_by_sources() {
        let client = build_client(DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT).unwrap();
        let bang = HttpSource::with_client(client.clone(), DEFAULT_SOURCE_URL);
        let other = HttpSource::with_client(client, "http://127.0.0.1:9/bulletin");
        assert_eq!(bang.describe(), DEFAULT_SOURCE_URL);
        assert!(matches!(other.fetch(), Err(RelayError::Fetch { .. })));
    }

    #[test]
    fn test_http_source_describes_url() {
        let source = HttpSource::new(DEFAULT_SOURCE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT)
            .unwrap();
        assert_eq!(source.describe(), DEFAULT_SOURCE_URL);
    }

    #[test]
    fn test_http_source_unreachable_host_is_fetch_error() {
        // Port 9 on localhost is almost never listening; the connect fails fast.
        let source = HttpSource::new("http://127.0.0.1:9/bulletin", 2, DEFAULT_USER_AGENT).unwrap();
        assert!(matches!(source.fetch(), Err(RelayError::Fetch { .. })));
    }
}
