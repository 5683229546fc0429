//! Telemetry initialization.
//!
//! Controlled by `INTELLIMERGE_LOG`:
//! - unset or empty → no-op (tracing disabled, zero overhead)
//! - `"stderr"` → human-readable events to stderr
//! - `"json"` → JSON spans/events to stderr
//!
//! Verbosity comes from `RUST_LOG` and defaults to `info`. Stdout is never
//! written to, so merged text piped from `intellimerge merge` stays clean.

use tracing_subscriber::EnvFilter;

/// Environment variable selecting the telemetry sink.
pub const LOG_ENV: &str = "INTELLIMERGE_LOG";

/// Where tracing output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    Noop,
    Stderr,
    Json,
}

impl Sink {
    /// Interpret the value of [`LOG_ENV`].
    ///
    /// Unknown values fall back to [`Sink::Stderr`] with a warning so a typo
    /// does not silently hide diagnostics.
    #[must_use]
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            None | Some("") => Self::Noop,
            Some("json") => Self::Json,
            Some("stderr") => Self::Stderr,
            Some(other) => {
                eprintln!("warning: {LOG_ENV}={other} not recognized, using stderr");
                Self::Stderr
            }
        }
    }
}

/// Opaque guard held in `main()` until exit.
pub struct TelemetryGuard {
    pub sink: Sink,
}

/// Initialize telemetry based on `INTELLIMERGE_LOG`.
#[must_use]
pub fn init() -> TelemetryGuard {
    let value = std::env::var(LOG_ENV).ok();
    let sink = Sink::from_env_value(value.as_deref());

    match sink {
        Sink::Noop => {}
        Sink::Stderr => init_stderr(),
        Sink::Json => init_json(),
    }

    TelemetryGuard { sink }
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr() {
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    tracing_subscriber::registry()
        .with(filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

/// JSON spans/events to stderr via tracing-subscriber's JSON formatter.
fn init_json() {
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    tracing_subscriber::registry()
        .with(filter())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE),
        )
        .init();
}
