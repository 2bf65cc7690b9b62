//! Logging bootstrap for the hindsight retrieval engine.
//!
//! Initializes the tracing subscriber with stderr output so stdout stays
//! clean for the retrieved context the host application prints or injects.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{Error, Result};

/// Initialize structured logging.
///
/// Filtering follows `RUST_LOG` unless `log_level` is given. Colored
/// output is suppressed when `no_color` is set or `NO_COLOR` is present
/// in the environment.
///
/// Calling this twice returns an error from the underlying registry; the
/// host application owns the single initialization.
pub fn init_logging(log_level: Option<&str>, no_color: bool) -> Result<()> {
    let default_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_str = log_level.unwrap_or(&default_level);

    let env_filter = EnvFilter::try_new(filter_str)
        .map_err(|e| Error::Config(format!("invalid log filter '{filter_str}': {e}")))?;

    let ansi = !no_color && std::env::var_os("NO_COLOR").is_none();
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(ansi);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("failed to init logging: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_filter() {
        let result = init_logging(Some("not==a==filter"), true);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
