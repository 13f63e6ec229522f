use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use voice_clone_audio::AudioCoercer;
use voice_clone_server::{AppState, Config, CoquiCliModel, init_tracing, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing();

    info!("Starting voice clone TTS server...");

    let model = match CoquiCliModel::load(
        &config.tts_location(),
        config.model_name.clone(),
        config.temp_dir.clone(),
    ) {
        Ok(model) => model,
        Err(e) => {
            error!("Failed to initialize TTS model. Exiting. ({e})");
            std::process::exit(1);
        }
    };

    let coercer = AudioCoercer::new(config.transcoder());
    let state = Arc::new(AppState::new(
        Arc::new(model),
        coercer,
        &config.voices_dir,
        config.max_concurrency as usize,
    ));
    let app = router(state, config.max_upload_bytes);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
