//! Tracing subscriber setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global subscriber.
///
/// `RUST_LOG` takes precedence over `level`. `format` is `"json"` for one
/// JSON object per event; anything else gives the human-readable format.
/// Calling this again after a subscriber is installed does nothing.
pub fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(filter);

    if format.eq_ignore_ascii_case("json") {
        let _ = subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(true),
            )
            .try_init();
    } else {
        let _ = subscriber
            .with(fmt::layer().pretty().with_target(true))
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_is_harmless() {
        init_logging("debug", "json");
        init_logging("info", "pretty");
        tracing::info!("logging initialized twice");
    }
}
