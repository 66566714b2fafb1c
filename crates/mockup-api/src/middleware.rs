//! Router middleware: CORS and server-error logging.
use axum::middleware::Next;
use axum::{body::Body, http::Request, response::Response};
use tower_http::cors::CorsLayer;

pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}

pub async fn log_server_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let response = next.run(req).await;
    if response.status().is_server_error() {
        tracing::warn!(%method, %path, status = response.status().as_u16(), "request failed");
    }
    response
}
