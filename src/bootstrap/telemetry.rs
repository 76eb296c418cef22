use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber, honouring `RUST_LOG`.
/// Loads `.env` first so `RUST_LOG` may live there.
pub fn init_tracing() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tagrepo=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
