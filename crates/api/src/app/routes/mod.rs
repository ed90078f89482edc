use axum::Router;

pub mod equipment;
pub mod reports;
pub mod system;
pub mod toners;

/// Router for every resource endpoint (everything except `/health`).
pub fn router() -> Router {
    Router::new()
        .nest("/toners", toners::router())
        .nest("/equipment", equipment::router())
        .nest("/reports", reports::router())
}
