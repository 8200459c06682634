//! Process-wide logging setup.

use tracing_subscriber::EnvFilter;

/// Keeps the installed subscriber active; dropping it uninstalls it.
pub struct LoggingContext {
    _guard: tracing::subscriber::DefaultGuard,
}

impl LoggingContext {
    /// Install a fmt subscriber writing to stderr with timestamps, targets
    /// and levels. `RUST_LOG` overrides `level` when set.
    pub fn init(level: &str) -> anyhow::Result<Self> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(level)
                .map_err(|e| anyhow::anyhow!("Invalid log level '{level}': {e}"))?,
        };
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        Ok(Self { _guard: guard })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_and_drop() {
        let context = LoggingContext::init("debug").unwrap();
        tracing::debug!("logging initialized");
        drop(context);
    }

    #[test]
    fn test_invalid_level() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(LoggingContext::init("oea=verbose").is_err());
        }
    }
}
