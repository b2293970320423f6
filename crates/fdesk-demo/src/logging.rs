//! Log subscriber for the demo binary.
//!
//! Filtering comes from `FDESK_LOG` (same syntax as `RUST_LOG`) and defaults
//! to `info`. Logs go to stderr so frames on stdout stay clean.

use tracing_subscriber::EnvFilter;

use crate::error::{DemoError, Result};

pub const LOG_ENV: &str = "FDESK_LOG";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber; `json` switches to one JSON object per line.
pub fn init(json: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .with_target(true);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|err| DemoError::Logging {
        message: err.to_string(),
    })
}
