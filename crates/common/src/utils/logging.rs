use std::io;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,tower_http=info,axum=info";

/// Initialize tracing subscriber with compact, human-readable output.
/// - Respects `RUST_LOG` if set
/// - Falls back to `info,tower_http=info,axum=info`
/// - Writes to stdout so container log collectors pick it up
pub fn init_logging_default() {
    let _ = fmt()
        .with_env_filter(env_filter(DEFAULT_FILTER))
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize tracing subscriber with JSON structured output.
/// Flow-level spans from the `service` crate are kept at debug so a single
/// patient search can be followed end to end; override with `RUST_LOG`.
pub fn init_logging_json() {
    let _ = fmt()
        .with_env_filter(env_filter("info,service=debug,tower_http=info"))
        .with_target(true)
        .json()
        .with_writer(io::stdout)
        .try_init();
}

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_logging_default();
        init_logging_json();
        init_logging_default();
    }
}
