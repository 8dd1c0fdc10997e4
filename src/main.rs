use std::process::ExitCode;

use synop_relay::config::RelayConfig;
use synop_relay::logging::{self, Component, LogLevel};
use synop_relay::model::RelayError;
use synop_relay::relay;

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let config = match RelayConfig::load() {
        Ok(config) => config,
        Err(e) => {
            // The logger is configured from this file, so report directly
            logging::init_logger(LogLevel::Info, None, false);
            logging::log_failure(Component::System, None, "Load configuration", &e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_logger(
        config.logging.level,
        config.logging.file.as_deref(),
        config.logging.console_timestamps,
    );

    match relay::run(&config) {
        Ok(summary) => {
            println!(
                "Successfully uploaded {} ({} stations) to {}",
                summary.filename,
                summary.record_count,
                summary.published_to.join(", ")
            );
            ExitCode::SUCCESS
        }
        Err(e) if e.is_no_data() => {
            logging::log_failure(Component::Parse, None, "Select latest observation", &e);
            ExitCode::from(2)
        }
        // Each failed destination was already logged by the relay
        Err(e @ RelayError::Delivery { .. }) => {
            logging::error(Component::System, None, &format!("Run aborted: {}", e));
            ExitCode::FAILURE
        }
        Err(e) => {
            logging::log_failure(Component::System, None, "Relay run", &e);
            ExitCode::FAILURE
        }
    }
}
