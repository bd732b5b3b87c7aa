use funko_server::core::{run, Config, ServerState};
use funko_server::utils::init_logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logger();

    let config = Config::from_env();
    tracing::info!(work_dir = %config.work_dir, port = config.http_port, "Starting funko-server");

    let state = ServerState::initialize(config)
        .await
        .map_err(|e| anyhow::anyhow!("Initialization failed: {e}"))?;

    run(state)
        .await
        .map_err(|e| anyhow::anyhow!("Server stopped: {e}"))?;
    Ok(())
}
