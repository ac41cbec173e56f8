// This main function is the entry point when running `cargo run -p web-server`.
// It loads the configuration, builds the state and serves HTTP.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = configuration::load_config()?;
    let state = web_server::AppState::from_config(&config).await?;
    web_server::run_server(config.server.socket_addr(), state).await
}
