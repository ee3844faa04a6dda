//! HTTP front for the todo service.
//!
//! # Routes
//! - `GET /todo/{id}` → 200 JSON, 400 bad id, 404 missing, 500 storage error
//! - `POST /todo` → 201, 500 on bad body or storage error
//! - `PUT /todo` → 200, 204 on empty message, 500 on bad body or storage error
//! - `DELETE /todo/{id}` → 200 (also for a missing id), 400 bad id, 500
//! - `GET /user/{user_id}/todo?limit=&offset=` → 200 JSON array
//!
//! Every todo route is wrapped by the request logger. Debug routes are only
//! mounted when asked for and are not logged.

pub mod config;
pub mod debug;
pub mod error;
mod handlers;
mod middleware;
pub mod telemetry;

use std::future::Future;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use todo_core::ToDoService;

pub fn app(service: ToDoService, init_profiling: bool) -> Router {
    let router = Router::new()
        .route("/todo", post(handlers::create_todo).put(handlers::update_todo))
        .route("/todo/{id}", get(handlers::get_todo).delete(handlers::delete_todo))
        .route("/user/{user_id}/todo", get(handlers::list_todos))
        .route_layer(axum::middleware::from_fn(middleware::log_request))
        .with_state(service);

    if init_profiling {
        router.merge(debug::routes(debug::DEBUG_PATH))
    } else {
        router
    }
}

/// Serve `app` until `shutdown` resolves, then drain open connections.
pub async fn run<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
