use std::{net::SocketAddr, sync::Arc};
use study_calendar::{
    clock::SystemClock, router, storage::file_storage, AppState, Config, StoreOptions, StudyStore,
};
use tokio::fs;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    fs::create_dir_all(&config.data_dir).await?;

    let data_dir = config.data_dir.clone();
    let options = StoreOptions {
        seed_demo_data: config.seed_demo_data,
    };
    let store = tokio::task::spawn_blocking(move || {
        StudyStore::open(Box::new(file_storage(&data_dir)), Arc::new(SystemClock), options)
    })
    .await?;
    let app = router(AppState::new(store));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(data_dir = %config.data_dir.display(), "listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
