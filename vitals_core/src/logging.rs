//! Tracing setup for the vitals binary.
//!
//! Log lines go to stderr so analysis output on stdout stays pipeable.
//! `RUST_LOG` always wins over the verbosity flag.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter directive for a `-v` count: warnings only, then info, then debug
pub fn directive_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,vitals_core=info,vitals=info",
        _ => "info,vitals_core=debug,vitals=debug",
    }
}

/// Install the global subscriber
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive_for(verbosity)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(verbosity > 1)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("vitals_core=debug"))
        .try_init();
}
