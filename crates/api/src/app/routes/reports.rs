use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/forecast", get(get_forecast))
        .route("/usage/toners", get(get_toner_usage))
        .route("/usage/equipment", get(get_equipment_usage))
}

pub async fn get_forecast(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ForecastQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(v) => v,
        Err(rejection) => return errors::query_rejection(rejection),
    };

    let lookback_months = query
        .lookback_months
        .unwrap_or(services.default_lookback_months());

    match services.forecast(lookback_months, query.target_date) {
        Ok(results) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "lookback_months": lookback_months,
                "target_date": query.target_date,
                "results": results,
            })),
        )
            .into_response(),
        Err(e) => errors::forecast_error_to_response(e),
    }
}

pub async fn get_toner_usage(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::UsageQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(v) => v,
        Err(rejection) => return errors::query_rejection(rejection),
    };

    let lookback_months = query
        .lookback_months
        .unwrap_or(services.default_lookback_months());

    match services.toner_usage(lookback_months) {
        Ok(usage) => (StatusCode::OK, Json(usage)).into_response(),
        Err(e) => errors::forecast_error_to_response(e),
    }
}

pub async fn get_equipment_usage(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::UsageQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(v) => v,
        Err(rejection) => return errors::query_rejection(rejection),
    };

    let lookback_months = query
        .lookback_months
        .unwrap_or(services.default_lookback_months());

    match services.equipment_usage(lookback_months) {
        Ok(usage) => (StatusCode::OK, Json(usage)).into_response(),
        Err(e) => errors::forecast_error_to_response(e),
    }
}
