//! Local fallback copy of each published artifact.

use std::fs;
use std::path::PathBuf;

use crate::model::{DeliveryStage, RelayError};
use crate::publish::Publisher;

/// Writes artifacts into a directory, creating it on first use.
pub struct LocalDirPublisher {
    dir: PathBuf,
}

impl LocalDirPublisher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        LocalDirPublisher { dir: dir.into() }
    }
}

impl Publisher for LocalDirPublisher {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    fn publish(&self, filename: &str, payload: &[u8]) -> Result<(), RelayError> {
        let write_err = |e: std::io::Error| RelayError::Delivery {
            stage: DeliveryStage::Write,
            message: format!("{}: {}", self.dir.join(filename).display(), e),
        };
        fs::create_dir_all(&self.dir).map_err(write_err)?;
        fs::write(self.dir.join(filename), payload).map_err(write_err)
    }
}
