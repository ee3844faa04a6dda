use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

pub const DEBUG_PATH: &str = "/debug/pprof";

#[derive(Debug, Serialize)]
struct RuntimeStats {
    workers: usize,
    alive_tasks: usize,
}

/// Introspection routes mounted under `prefix`. Not request-logged.
pub fn routes(prefix: &str) -> Router {
    Router::new()
        .route(&format!("{prefix}/cmdline"), get(cmdline))
        .route(&format!("{prefix}/runtime"), get(runtime))
}

async fn cmdline() -> String {
    std::env::args().collect::<Vec<_>>().join("\0")
}

async fn runtime() -> Json<RuntimeStats> {
    let metrics = tokio::runtime::Handle::current().metrics();
    Json(RuntimeStats {
        workers: metrics.num_workers(),
        alive_tasks: metrics.num_alive_tasks(),
    })
}
