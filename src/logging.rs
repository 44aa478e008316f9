//! Logging setup on top of `tracing-subscriber`.
//!
//! Engines log through `tracing` macros only; installing a subscriber is left
//! to whoever embeds them.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::shared::error::{AppError, AppResult};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "universal_calc=info,universal_calc_lib=info";
const VERBOSE_FILTER: &str = "universal_calc=debug,universal_calc_lib=debug";

/// `--verbose` wins over `RUST_LOG`; otherwise `RUST_LOG` wins over the default.
pub fn build_env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new(VERBOSE_FILTER);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber, writing to stderr. Call once.
pub fn init_logging(verbose: bool) -> AppResult<()> {
    tracing_subscriber::registry()
        .with(build_env_filter(verbose))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .map_err(|e| AppError::System(format!("Failed to initialize logging: {}", e)))
}
