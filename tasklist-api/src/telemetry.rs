/// Tracing subscriber setup
///
/// Filter defaults to `tasklist_api=debug,tasklist_shared=debug` and is
/// overridden by `RUST_LOG`. Set `LOG_FORMAT=json` for structured output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "tasklist_api=debug,tasklist_shared=debug";

/// Installs the global tracing subscriber
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer()).try_init()?;
    }

    tracing::info!(
        "tasklist-api v{} tracing initialized",
        env!("CARGO_PKG_VERSION")
    );
    Ok(())
}
