use std::time::Instant;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{error, info, warn, Level};

/// Log level for a finished request. Only the outcomes the handlers are
/// expected to produce are quiet; anything else is worth a warning.
pub(crate) fn severity(status: StatusCode) -> Level {
    match status {
        StatusCode::OK | StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => Level::INFO,
        StatusCode::INTERNAL_SERVER_ERROR => Level::ERROR,
        _ => Level::WARN,
    }
}

/// Records method, path, status and duration for every routed request.
pub(crate) async fn log_request(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let response = next.run(req).await;

    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
    let status = response.status();
    let code = status.as_u16();
    let level = severity(status);
    if level == Level::ERROR {
        error!(%method, %path, status = code, duration_ms, "Return an error");
    } else if level == Level::WARN {
        warn!(%method, %path, status = code, duration_ms, "unhandled http status code");
    } else {
        let outcome = match status {
            StatusCode::OK => "Success",
            StatusCode::BAD_REQUEST => "bad request",
            _ => "Not Found",
        };
        info!(%method, %path, status = code, duration_ms, "{outcome}");
    }
    response
}
