//! Tracing setup.
//!
//! The terminal UI owns stdout and stderr while it runs, so it logs to a
//! file. Script mode logs to stderr. `RUST_LOG` takes precedence over the
//! configured level:
//!
//! ```bash
//! RUST_LOG=fincalc=debug fincalc
//! ```

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, Once};
use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::LogSettings;

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub enum LogSink {
    Stderr,
    File(PathBuf),
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("invalid log filter '{directive}': {source}")]
    Filter {
        directive: String,
        #[source]
        source: ParseError,
    },

    #[error("opening log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Pick the filter: a set `RUST_LOG` wins over the configured level.
pub fn build_filter(
    settings: &LogSettings,
    rust_log: Option<&str>,
) -> Result<EnvFilter, LoggingError> {
    let directive = rust_log.unwrap_or(&settings.level);
    EnvFilter::try_new(directive).map_err(|source| LoggingError::Filter {
        directive: directive.to_string(),
        source,
    })
}

/// Install the global subscriber. Only the first call has any effect.
pub fn init(settings: &LogSettings, sink: LogSink) -> Result<(), LoggingError> {
    let mut result = Ok(());
    INIT.call_once(|| result = install(settings, sink));
    result
}

fn install(settings: &LogSettings, sink: LogSink) -> Result<(), LoggingError> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = build_filter(settings, rust_log.as_deref())?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match sink {
        LogSink::Stderr => {
            let _ = builder.with_writer(io::stderr).try_init();
        }
        LogSink::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|source| LoggingError::OpenFile {
                    path: path.clone(),
                    source,
                })?;
            let _ = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
    }
    Ok(())
}
