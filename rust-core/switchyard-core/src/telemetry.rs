//! # Telemetry
//!
//! Tracing subscriber setup shared by binaries embedding the router.

use tracing_subscriber::EnvFilter;

/// Directive applied when `RUST_LOG` is not set
pub const DEFAULT_DIRECTIVE: &str = "switchyard_core=info,switchyard=info";

/// Initialize the global tracing subscriber
///
/// Honors `RUST_LOG`, falling back to [`DEFAULT_DIRECTIVE`]. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
pub fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice() {
        init_tracing(false);
        init_tracing(true);
        tracing::info!("telemetry initialized");
    }
}
