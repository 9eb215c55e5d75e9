use pet::{init_store, make_router, run_app, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pet=info")),
        )
        .init();

    if let Err(error) = serve().await {
        tracing::error!("Error: {:#}", error);
        std::process::exit(1);
    }
}

async fn serve() -> pet::Result<()> {
    let config = Config::from_env()?;
    let addr = config.socket_addr()?;
    let store = init_store(&config).await?;
    run_app(make_router(), addr, store, config).await
}
