/// FTP delivery
///
/// Uploads the rendered group to the public file host. Each session is
/// short-lived: connect, login, passive mode, change directory, binary
/// STOR, quit. Any step failing aborts the upload with the stage recorded
/// in the error.

use std::io::Cursor;
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use suppaftp::types::FileType;
use suppaftp::{FtpStream, Mode};

use crate::config::FtpConfig;
use crate::logging::{self, Component};
use crate::model::{DeliveryStage, RelayError};
use crate::publish::Publisher;

pub struct FtpPublisher {
    host: String,
    port: u16,
    username: String,
    password: String,
    directory: String,
    connect_timeout: Duration,
    passive: bool,
}

impl FtpPublisher {
    /// Builds a publisher from config. Credentials must be present.
    pub fn from_config(config: &FtpConfig) -> Result<Self, RelayError> {
        let username = config
            .username
            .clone()
            .ok_or_else(|| RelayError::Config("FTP username is not set".to_string()))?;
        let password = config
            .password
            .clone()
            .ok_or_else(|| RelayError::Config("FTP password is not set".to_string()))?;

        Ok(FtpPublisher {
            host: config.host.clone(),
            port: config.port,
            username,
            password,
            directory: config.directory.clone(),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            passive: config.passive,
        })
    }

    fn resolve(&self) -> Result<SocketAddr, RelayError> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| connect_error(&self.host, e))?
            .next()
            .ok_or_else(|| RelayError::Delivery {
                stage: DeliveryStage::Connect,
                message: format!("Failed to connect to FTP server: {} (no address)", self.host),
            })
    }

    fn upload(&self, stream: &mut FtpStream, filename: &str, payload: &[u8]) -> Result<(), RelayError> {
        stream
            .login(self.username.as_str(), self.password.as_str())
            .map_err(|e| delivery(DeliveryStage::Login, format!("FTP login failed for user: {} ({})", self.username, e)))?;
        logging::info(Component::Publish, Some(&self.host), "Logged in to FTP server");

        if self.passive {
            stream.set_mode(Mode::Passive);
            logging::info(Component::Publish, Some(&self.host), "Enabled passive mode");
        }

        stream
            .cwd(self.directory.as_str())
            .map_err(|e| delivery(DeliveryStage::ChangeDirectory, format!("Failed to change to FTP directory: {} ({})", self.directory, e)))?;
        logging::info(
            Component::Publish,
            Some(&self.host),
            &format!("Changed to FTP directory: {}", self.directory),
        );

        stream
            .transfer_type(FileType::Binary)
            .map_err(|e| delivery(DeliveryStage::Transfer, format!("Failed to set binary mode ({})", e)))?;

        let mut reader = Cursor::new(payload);
        stream
            .put_file(filename, &mut reader)
            .map_err(|e| delivery(DeliveryStage::Transfer, format!("Failed to upload file: {} ({})", filename, e)))?;

        Ok(())
    }
}

impl Publisher for FtpPublisher {
    fn describe(&self) -> String {
        format!("ftp://{}:{}/{}", self.host, self.port, self.directory)
    }

    fn publish(&self, filename: &str, payload: &[u8]) -> Result<(), RelayError> {
        let addr = self.resolve()?;
        let mut stream = FtpStream::connect_timeout(addr, self.connect_timeout)
            .map_err(|e| connect_error(&self.host, e))?;
        logging::info(
            Component::Publish,
            Some(&self.host),
            &format!("Connected to FTP server: {}", self.host),
        );

        let result = self.upload(&mut stream, filename, payload);

        // The file is already stored (or the upload already failed); a
        // failed QUIT does not change the outcome.
        if let Err(e) = stream.quit() {
            logging::debug(Component::Publish, Some(&self.host), &format!("QUIT failed: {}", e));
        }

        if result.is_ok() {
            logging::info(
                Component::Publish,
                Some(filename),
                &format!("Successfully uploaded {}", filename),
            );
        }
        result
    }
}

fn delivery(stage: DeliveryStage, message: String) -> RelayError {
    RelayError::Delivery { stage, message }
}

fn connect_error(host: &str, err: impl std::fmt::Display) -> RelayError {
    delivery(
        DeliveryStage::Connect,
        format!("Failed to connect to FTP server: {} ({})", host, err),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
