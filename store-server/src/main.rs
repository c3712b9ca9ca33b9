use store_server::{Config, Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (.env first so Config sees the variables)
    dotenv::dotenv().ok();
    let config = Config::from_env();
    config.ensure_work_dir_structure()?;
    setup_environment(&config);

    tracing::info!("Store server starting...");

    // 2. Initialize state (database, services)
    let state = ServerState::initialize(&config).await;

    // 3. Run the HTTP server
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}
