use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

use crate::access::{self, RequestContext};
use crate::error::AppError;
use crate::handlers::AppState;
use crate::metrics;
use crate::models::{generate_tracking_number, Shipment, ShipmentStatus, StatusEvent};
use crate::pricing::{self, PricingSchedule, Weight, WeightUnit};

/// Collisions are vanishingly rare in a 32^8 tracking-number space; a stuck
/// loop here means the generator is broken, not that we are unlucky.
const MAX_TRACKING_ATTEMPTS: u32 = 5;

#[derive(Debug, Deserialize)]
pub struct CreateShipmentRequest {
    pub sender_name: String,
    #[serde(default)]
    pub sender_phone: Option<String>,
    pub recipient_name: String,
    #[serde(default)]
    pub recipient_phone: Option<String>,
    pub recipient_address: String,
    pub weight: f64,
    #[serde(default)]
    pub unit: WeightUnit,
    #[serde(default)]
    pub urgent: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub shipments: Vec<Shipment>,
}

#[derive(Debug, Serialize)]
pub struct ShipmentDetail {
    #[serde(flatten)]
    pub shipment: Shipment,
    pub history: Vec<StatusEvent>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ShipmentStatus,
    #[serde(default)]
    pub note: Option<String>,
}

/// Handle POST /api/v1/shipments
///
/// The price breakdown is always recomputed server-side from the submitted
/// weight and flag; client-supplied totals are never trusted.
pub async fn create_shipment(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(req): Json<CreateShipmentRequest>,
) -> Result<(StatusCode, Json<Shipment>), AppError> {
    let started = Instant::now();

    if !access::may_create_shipment(ctx.role) {
        return Err(AppError::Forbidden(format!(
            "role {} may not register shipments",
            ctx.role
        )));
    }

    validate_parties(&req)?;

    let config = state.config.load();
    let schedule = PricingSchedule::from(&config.pricing);
    let quote = pricing::quote(
        Weight {
            value: req.weight,
            unit: req.unit,
        },
        req.urgent,
        &schedule,
    )?;

    let mut attempts = 0;
    let tracking_number = loop {
        attempts += 1;
        let candidate = generate_tracking_number();
        if !state.store.tracking_number_exists(&candidate).await? {
            break candidate;
        }
        if attempts >= MAX_TRACKING_ATTEMPTS {
            return Err(AppError::InternalError(
                "could not allocate a tracking number".to_string(),
            ));
        }
    };

    let shipment = Shipment::new(
        &ctx.tenant,
        tracking_number,
        req.sender_name,
        req.sender_phone,
        req.recipient_name,
        req.recipient_phone,
        req.recipient_address,
        req.urgent,
        &quote,
    );

    state.store.create(&shipment, &ctx.actor).await?;

    info!(
        tenant = %ctx.tenant,
        tracking = %shipment.tracking_number,
        actor = %ctx.actor,
        total_usd = shipment.total_usd,
        "Shipment registered"
    );
    metrics::record_shipment_created(&ctx.tenant);
    metrics::record_duration("/api/v1/shipments", started.elapsed());

    Ok((StatusCode::CREATED, Json(shipment)))
}

/// Handle GET /api/v1/shipments
pub async fn list_shipments(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, AppError> {
    if !access::may_list_shipments(ctx.role) {
        return Err(AppError::Forbidden(format!(
            "role {} may not list shipments",
            ctx.role
        )));
    }

    let status = match &query.status {
        Some(raw) => Some(
            ShipmentStatus::parse(raw)
                .ok_or_else(|| AppError::BadRequest(format!("unknown status: {}", raw)))?,
        ),
        None => None,
    };

    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let shipments = state.store.list(&ctx.tenant, status, limit, offset).await?;

    Ok(Json(ListResponse { shipments }))
}

/// Handle GET /api/v1/shipments/{tracking_number}
pub async fn get_shipment(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(tracking_number): Path<String>,
) -> Result<Json<ShipmentDetail>, AppError> {
    let shipment = state.store.get(&ctx.tenant, &tracking_number).await?;
    let history = state.store.history(shipment.id).await?;

    Ok(Json(ShipmentDetail { shipment, history }))
}

/// Handle PATCH /api/v1/shipments/{tracking_number}/status
pub async fn update_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(tracking_number): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Shipment>, AppError> {
    let shipment = state.store.get(&ctx.tenant, &tracking_number).await?;

    if !access::is_valid_transition(shipment.status, req.status) {
        return Err(AppError::InvalidTransition(format!(
            "cannot move shipment {} from {} to {}",
            tracking_number, shipment.status, req.status
        )));
    }
    if !access::role_may_transition(ctx.role, shipment.status, req.status) {
        return Err(AppError::Forbidden(format!(
            "role {} may not move a shipment from {} to {}",
            ctx.role, shipment.status, req.status
        )));
    }

    let updated = state
        .store
        .update_status(
            &ctx.tenant,
            &tracking_number,
            shipment.status,
            req.status,
            req.note.as_deref(),
            &ctx.actor,
        )
        .await?;

    info!(
        tenant = %ctx.tenant,
        tracking = %tracking_number,
        actor = %ctx.actor,
        from = %shipment.status,
        to = %req.status,
        "Shipment status updated"
    );
    metrics::record_status_update(&ctx.tenant, req.status.as_str());

    Ok(Json(updated))
}

fn validate_parties(req: &CreateShipmentRequest) -> Result<(), AppError> {
    if req.sender_name.trim().is_empty() {
        return Err(AppError::BadRequest("sender_name is required".to_string()));
    }
    if req.recipient_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "recipient_name is required".to_string(),
        ));
    }
    if req.recipient_address.trim().is_empty() {
        return Err(AppError::BadRequest(
            "recipient_address is required".to_string(),
        ));
    }
    Ok(())
}
