//! Tracing/logging initialization.
//!
//! Logs go to stderr so stdout stays free for command output.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Output format for log lines.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable single line per event.
    #[default]
    Compact,
    /// JSON object per event.
    Json,
}

/// Logging knobs exposed on the command line.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    pub format: LogFormat,
    /// Suppress all logging output.
    pub quiet: bool,
    /// Enable debug-level logging.
    pub verbose: bool,
}

impl LogOptions {
    /// Build the event filter. `RUST_LOG` wins over the flags when set.
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }

    fn default_directive(&self) -> &'static str {
        if self.quiet {
            "off"
        } else if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(options: LogOptions) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(options.filter())
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match options.format {
        LogFormat::Json => builder
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
}
