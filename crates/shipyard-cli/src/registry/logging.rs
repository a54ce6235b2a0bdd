use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;

use super::{RegistryError, RegistryResult};

/// Install the process-wide subscriber for a run.
///
/// Every event is appended to `logs_path` as one JSON object per line. A
/// readable copy goes to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_run_logging(logs_path: &Path) -> RegistryResult<()> {
    let file = OpenOptions::new().create(true).append(true).open(logs_path)?;

    let ndjson = tracing_subscriber::fmt::layer()
        .json()
        .with_timer(UtcTime::rfc_3339())
        .with_writer(Mutex::new(file));

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(ndjson)
        .with(console)
        .try_init()
        .map_err(|err| RegistryError::Logging(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_land_in_the_run_log_once_installed() {
        let dir = std::env::temp_dir().join(format!("shipyard_logs_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create dir");
        let logs_path = dir.join("logs.ndjson");

        init_run_logging(&logs_path).expect("install subscriber");
        tracing::info!(event = "logging_ready", seed = 7_u64);

        let content = std::fs::read_to_string(&logs_path).expect("read log");
        let line = content
            .lines()
            .find(|line| line.contains("logging_ready"))
            .expect("event line");
        let value: serde_json::Value = serde_json::from_str(line).expect("json line");
        assert_eq!(value["fields"]["event"], "logging_ready");
        assert_eq!(value["level"], "INFO");

        let err = init_run_logging(&logs_path).unwrap_err();
        assert!(matches!(err, RegistryError::Logging(_)));

        std::fs::remove_dir_all(dir).ok();
    }
}
