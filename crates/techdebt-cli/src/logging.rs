// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for the Techdebt CLI.
//!
//! Uses `tracing` with `tracing-subscriber`, writing to stderr so JSON output
//! on stdout stays parseable. `RUST_LOG` takes precedence over `--verbose`.
//!
//! # Examples
//!
//! ```bash
//! # Retry warnings and session transitions
//! RUST_LOG=techdebt=info techdebt issue list
//!
//! # Everything, including octocrab requests
//! RUST_LOG=techdebt=trace,octocrab=debug techdebt issue list
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the logging subsystem.
pub fn init_logging(verbose: bool) {
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let default_filter = if verbose {
        "techdebt=debug,techdebt_core=debug,octocrab=warn"
    } else {
        "techdebt=warn,techdebt_core=warn,octocrab=error"
    };
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
