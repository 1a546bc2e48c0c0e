//! Tracing subscriber setup for hosts that do not install their own.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use progression_core::config::GeneralConfig;

/// Install a global fmt subscriber.
///
/// The filter comes from `RUST_LOG` when set, otherwise from
/// `general.log_level`. With `general.log_json` the output is one JSON
/// object per line. Returns `false` if a global subscriber was already
/// installed, in which case nothing changes.
pub fn init_tracing(general: &GeneralConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&general.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json = general.log_json;
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .try_init()
        .is_ok()
}
