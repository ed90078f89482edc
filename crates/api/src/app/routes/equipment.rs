use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use printfleet_core::EquipmentId;
use printfleet_maintenance::{
    Equipment, EquipmentCommand, EquipmentDetails, MeterReading, RecordMeterReading, RecordRepair,
    RegisterEquipment, Repair, UpdateEquipment,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_equipment).post(register_equipment))
        .route("/:id", get(get_equipment).put(update_equipment))
        .route("/:id/repairs", get(list_repairs).post(record_repair))
        .route("/:id/meters", get(list_meter_readings).post(record_meter_reading))
        .route("/:id/exchanges", get(list_exchanges).post(record_exchange))
        .route("/:id/events", get(list_equipment_events))
}

fn parse_id(id: &str) -> Result<EquipmentId, axum::response::Response> {
    id.parse().map_err(|_| errors::invalid_id("equipment"))
}

fn load(services: &AppServices, id: &str) -> Result<Equipment, axum::response::Response> {
    let equipment_id = parse_id(id)?;
    services
        .equipment(&equipment_id)
        .ok_or_else(|| errors::not_found("equipment"))
}

fn dispatch(
    services: &AppServices,
    equipment_id: EquipmentId,
    cmd: EquipmentCommand,
    status: StatusCode,
) -> axum::response::Response {
    if let Err(e) = services.dispatch_equipment(equipment_id, cmd) {
        return errors::dispatch_error_to_response(e);
    }

    match services.equipment(&equipment_id) {
        Some(equipment) => (status, Json(dto::equipment_to_json(&equipment))).into_response(),
        None => errors::not_found("equipment"),
    }
}

pub async fn list_equipment(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let items: Vec<serde_json::Value> = services
        .equipment_list()
        .iter()
        .map(dto::equipment_to_json)
        .collect();

    (StatusCode::OK, Json(items)).into_response()
}

pub async fn register_equipment(
    Extension(services): Extension<Arc<AppServices>>,
    details: Result<Json<EquipmentDetails>, JsonRejection>,
) -> axum::response::Response {
    let Json(details) = match details {
        Ok(v) => v,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    let equipment_id = EquipmentId::new();
    let cmd = EquipmentCommand::Register(RegisterEquipment {
        equipment_id,
        details,
        occurred_at: Utc::now(),
    });

    dispatch(&services, equipment_id, cmd, StatusCode::CREATED)
}

pub async fn get_equipment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match load(&services, &id) {
        Ok(equipment) => (StatusCode::OK, Json(dto::equipment_to_json(&equipment))).into_response(),
        Err(resp) => resp,
    }
}

pub async fn update_equipment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    details: Result<Json<EquipmentDetails>, JsonRejection>,
) -> axum::response::Response {
    let Json(details) = match details {
        Ok(v) => v,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    let equipment_id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = EquipmentCommand::Update(UpdateEquipment {
        equipment_id,
        details,
        occurred_at: Utc::now(),
    });

    dispatch(&services, equipment_id, cmd, StatusCode::OK)
}

pub async fn list_repairs(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match load(&services, &id) {
        Ok(equipment) => (StatusCode::OK, Json(equipment.repairs())).into_response(),
        Err(resp) => resp,
    }
}

pub async fn record_repair(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    repair: Result<Json<Repair>, JsonRejection>,
) -> axum::response::Response {
    let Json(repair) = match repair {
        Ok(v) => v,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    let equipment_id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = EquipmentCommand::RecordRepair(RecordRepair {
        equipment_id,
        repair,
        occurred_at: Utc::now(),
    });

    dispatch(&services, equipment_id, cmd, StatusCode::CREATED)
}

pub async fn list_meter_readings(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match load(&services, &id) {
        Ok(equipment) => {
            (StatusCode::OK, Json(dto::meters_to_json(equipment.meter_readings()))).into_response()
        }
        Err(resp) => resp,
    }
}

pub async fn record_meter_reading(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    reading: Result<Json<MeterReading>, JsonRejection>,
) -> axum::response::Response {
    let Json(reading) = match reading {
        Ok(v) => v,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    let equipment_id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = EquipmentCommand::RecordMeterReading(RecordMeterReading {
        equipment_id,
        reading,
        occurred_at: Utc::now(),
    });

    dispatch(&services, equipment_id, cmd, StatusCode::CREATED)
}

pub async fn list_exchanges(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match load(&services, &id) {
        Ok(equipment) => (StatusCode::OK, Json(equipment.exchanges())).into_response(),
        Err(resp) => resp,
    }
}

pub async fn record_exchange(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::RecordExchangeRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    let equipment_id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.record_exchange(
        equipment_id,
        &body.toner_name,
        body.meter_count,
        body.exchanged_at.unwrap_or_else(Utc::now),
    ) {
        Ok(exchange) => (StatusCode::CREATED, Json(exchange)).into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn list_equipment_events(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let equipment = match load(&services, &id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let items: Vec<serde_json::Value> = services
        .equipment_history(&equipment.id_typed())
        .iter()
        .map(|e| dto::event_to_json(e.event_type(), e.occurred_at(), e))
        .collect();

    (StatusCode::OK, Json(items)).into_response()
}
