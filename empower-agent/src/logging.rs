//! Tracing subscriber setup.

use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over `level`; an unusable
/// `level` falls back to "info". Message hex dumps are enabled with
/// `empower::dissect=trace`.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_span_events(FmtSpan::NONE)
        .init();
}
