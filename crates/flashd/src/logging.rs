use anyhow::Context;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "FLASH_LOG";

/// Installs the global fmt subscriber. `FLASH_LOG` wins over `default_filter`.
/// Returns `Ok(false)` when a subscriber was already installed.
pub fn init(default_filter: &str) -> anyhow::Result<bool> {
    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .with_context(|| format!("invalid log filter `{default_filter}`"))?,
    };

    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok())
}
