//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set; otherwise marquee logs at `info`.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogFormat;

const DEFAULT_FILTER: &str = "marquee=info,info";

pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let compact = (format == LogFormat::Compact).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .compact()
    });

    // JSON lines for log shippers.
    let json = (format == LogFormat::Json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .json()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(compact)
        .with(json)
        .init();
}
