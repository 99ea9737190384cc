//! Tracing subscriber setup for the runner.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` overrides the default filter and
/// `FLORA_LOG_FORMAT=json` switches to structured JSON lines.
pub fn init_telemetry() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,flora_runner=debug,flora_world=info".into());

    let json = std::env::var("FLORA_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_target(true)).try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()?;
    }

    info!(json, "Telemetry initialized");
    Ok(())
}
