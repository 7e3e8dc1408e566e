use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};

use crate::error::AppResult;
use crate::http::{Request, Response};
use crate::kernel::{RouteArgs, Services};

fn text(res: Response, status: StatusCode, body: impl Into<String>) -> Response {
    res.with_status(status)
        .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))
        .with_body(body.into())
}

// Health check endpoint - lightweight
pub async fn healthz(_req: Request, res: Response, _services: Services, _args: RouteArgs) -> AppResult<Response> {
    Ok(text(res, StatusCode::OK, "ok"))
}

// Readiness probe: checks DB connectivity with timeout protection
pub async fn readyz(_req: Request, res: Response, services: Services, _args: RouteArgs) -> AppResult<Response> {
    let query = sqlx::query("SELECT 1").fetch_one(services.db());
    Ok(match tokio::time::timeout(Duration::from_secs(5), query).await {
        Ok(Ok(_)) => text(res, StatusCode::OK, "ready"),
        Ok(Err(e)) => text(res, StatusCode::SERVICE_UNAVAILABLE, format!("not ready: {}", e)),
        Err(_) => text(res, StatusCode::SERVICE_UNAVAILABLE, "not ready: timeout"),
    })
}

// Metrics endpoint: returns JSON snapshot
pub async fn metrics(_req: Request, res: Response, services: Services, _args: RouteArgs) -> AppResult<Response> {
    res.with_json(&services.metrics().get_snapshot())
}

// Prometheus-compatible text exposition format
pub async fn metrics_prometheus(
    _req: Request,
    res: Response,
    services: Services,
    _args: RouteArgs,
) -> AppResult<Response> {
    let body = services.metrics().get_snapshot().to_prometheus();
    Ok(res
        .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain; version=0.0.4"))
        .with_body(body))
}

// Version/Build info endpoint (JSON)
pub async fn version(_req: Request, res: Response, _services: Services, _args: RouteArgs) -> AppResult<Response> {
    let body = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "package": {
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "authors": env!("CARGO_PKG_AUTHORS"),
            "license": env!("CARGO_PKG_LICENSE"),
        },
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
        }
    });
    res.with_json(&body)
}
