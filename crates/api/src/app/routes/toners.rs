use std::sync::Arc;

use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use printfleet_core::TonerId;
use printfleet_inventory::{AdjustQuantity, RegisterToner, RemoveToner, TonerCommand, UpdateToner};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_toners).post(register_toner))
        .route("/:id", get(get_toner).put(update_toner).delete(remove_toner))
        .route("/:id/adjust", post(adjust_quantity))
        .route("/:id/events", get(list_toner_events))
}

fn parse_id(id: &str) -> Result<TonerId, axum::response::Response> {
    id.parse().map_err(|_| errors::invalid_id("toner"))
}

/// Re-read the row the command just wrote.
fn committed_row(services: &AppServices, toner_id: TonerId, status: StatusCode) -> axum::response::Response {
    match services.toner(&toner_id) {
        Some(row) => (status, Json(row)).into_response(),
        None => errors::not_found("toner"),
    }
}

pub async fn list_toners(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ListTonersQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(v) => v,
        Err(rejection) => return errors::query_rejection(rejection),
    };

    let query = match query.into_stock_query() {
        Ok(q) => q,
        Err(resp) => return resp,
    };

    (StatusCode::OK, Json(services.toner_page(&query))).into_response()
}

pub async fn register_toner(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::TonerRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    let toner_id = TonerId::new();

    let cmd = TonerCommand::Register(RegisterToner {
        toner_id,
        name: body.name,
        performance: body.performance,
        quantity: body.quantity,
        occurred_at: Utc::now(),
    });

    if let Err(e) = services.dispatch_toner(toner_id, cmd) {
        return errors::dispatch_error_to_response(e);
    }

    committed_row(&services, toner_id, StatusCode::CREATED)
}

pub async fn get_toner(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let toner_id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    committed_row(&services, toner_id, StatusCode::OK)
}

pub async fn update_toner(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::TonerRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    let toner_id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = TonerCommand::Update(UpdateToner {
        toner_id,
        name: body.name,
        performance: body.performance,
        quantity: body.quantity,
        occurred_at: Utc::now(),
    });

    if let Err(e) = services.dispatch_toner(toner_id, cmd) {
        return errors::dispatch_error_to_response(e);
    }

    committed_row(&services, toner_id, StatusCode::OK)
}

pub async fn adjust_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::AdjustQuantityRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    let toner_id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = TonerCommand::AdjustQuantity(AdjustQuantity {
        toner_id,
        delta: body.delta,
        occurred_at: Utc::now(),
    });

    if let Err(e) = services.dispatch_toner(toner_id, cmd) {
        return errors::dispatch_error_to_response(e);
    }

    committed_row(&services, toner_id, StatusCode::OK)
}

pub async fn remove_toner(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let toner_id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = TonerCommand::Remove(RemoveToner {
        toner_id,
        occurred_at: Utc::now(),
    });

    match services.dispatch_toner(toner_id, cmd) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn list_toner_events(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let toner_id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let history = services.toner_history(&toner_id);
    if history.is_empty() {
        return errors::not_found("toner");
    }

    let items: Vec<serde_json::Value> = history
        .iter()
        .map(|e| dto::event_to_json(e.event_type(), e.occurred_at(), e))
        .collect();

    (StatusCode::OK, Json(items)).into_response()
}
