use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{info, warn};

use todo_core::ToDoService;
use todo_service::config::AppConfig;
use todo_service::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::parse();
    cfg.validate()?;
    telemetry::init(&cfg.log_level)?;

    info!(
        app = %cfg.app_name,
        version = env!("CARGO_PKG_VERSION"),
        "running todo app"
    );

    let db = todo_core::storage::connect(&cfg.db.storage_config())
        .await
        .context("connect storage")?;
    let service = ToDoService::new(db);
    let app = todo_service::app(service, cfg.http.init_profiling);

    let addr = cfg.http.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(%addr, profiling = cfg.http.init_profiling, "listening");

    let stop = Arc::new(Notify::new());
    let stopped = stop.clone();
    let mut server = tokio::spawn(todo_service::run(listener, app, async move {
        stopped.notified().await;
    }));

    tokio::select! {
        result = &mut server => {
            return result.context("join http server")?.context("serve http");
        }
        _ = shutdown_signal() => {}
    }

    info!(timeout = ?cfg.http.shutdown_timeout(), "shutting down");
    stop.notify_one();
    match tokio::time::timeout(cfg.http.shutdown_timeout(), server).await {
        Ok(result) => result.context("join http server")?.context("serve http")?,
        Err(_) => warn!("in-flight requests still running at shutdown timeout, exiting"),
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                warn!(%error, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
