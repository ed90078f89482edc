//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: stores, projections and the exchange workflow
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use printfleet_infra::{SeedError, SeedFile};

use crate::config::AppConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router around an existing set of services.
pub fn build_app(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(services))
}

/// Build services from the config (loading the seed file, if any) and the router.
pub fn build_app_from_config(config: &AppConfig) -> Result<Router, SeedError> {
    let services = AppServices::new(config.default_lookback_months);

    if let Some(path) = &config.seed_file {
        let seed = SeedFile::load(path)?;
        services.seed(&seed)?;
    }

    Ok(build_app(Arc::new(services)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn app() -> Router {
        build_app(Arc::new(AppServices::new(3)))
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, _) = send(app(), Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn zero_lookback_is_a_bad_request() {
        let (status, body) = send(
            app(),
            Request::get("/reports/forecast?lookback_months=0&target_date=2030-01-01")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_argument");
    }

    #[tokio::test]
    async fn malformed_ids_are_rejected() {
        let (status, body) = send(app(), Request::get("/toners/not-a-uuid").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_id");
    }

    #[test]
    fn missing_seed_file_fails_startup() {
        let config = AppConfig {
            seed_file: Some("/definitely/not/here.json".into()),
            ..AppConfig::default()
        };
        assert!(matches!(build_app_from_config(&config), Err(SeedError::Io { .. })));
    }
}
