use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::handlers::AppState;
use crate::models::ShipmentStatus;

/// Public view of a shipment. Party names, addresses, and prices stay
/// private; a tracking number alone must not expose them.
#[derive(Debug, Serialize)]
pub struct TrackingResponse {
    pub tracking_number: String,
    pub status: ShipmentStatus,
    pub urgent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub history: Vec<TrackingEvent>,
}

#[derive(Debug, Serialize)]
pub struct TrackingEvent {
    pub status: ShipmentStatus,
    pub changed_at: DateTime<Utc>,
}

/// Handle GET /api/v1/tracking/{tracking_number} (no auth)
pub async fn track_shipment(
    State(state): State<AppState>,
    Path(tracking_number): Path<String>,
) -> Result<Json<TrackingResponse>, AppError> {
    let shipment = state.store.track(&tracking_number).await?;
    let history = state.store.history(shipment.id).await?;

    Ok(Json(TrackingResponse {
        tracking_number: shipment.tracking_number,
        status: shipment.status,
        urgent: shipment.urgent,
        created_at: shipment.created_at,
        updated_at: shipment.updated_at,
        history: history
            .into_iter()
            .map(|event| TrackingEvent {
                status: event.status,
                changed_at: event.changed_at,
            })
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{generate_tracking_number, Shipment};
    use crate::pricing::{self, PricingSchedule, Weight};
    use crate::storage::ShipmentStore;
    use arc_swap::ArcSwap;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;

    async fn test_state() -> AppState {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        let store = ShipmentStore::with_pool(pool);
        store.run_migrations().await.unwrap();

        AppState {
            config: Arc::new(ArcSwap::from_pointee(
                crate::config::tests::create_test_config(),
            )),
            store: Arc::new(store),
        }
    }

    #[tokio::test]
    async fn test_track_returns_reduced_view() {
        let state = test_state().await;
        let quote =
            pricing::quote(Weight::pounds(3.0), false, &PricingSchedule::default()).unwrap();
        let shipment = Shipment::new(
            "miami-express",
            generate_tracking_number(),
            "Ana".to_string(),
            None,
            "Luis".to_string(),
            None,
            "Calle 23, La Habana".to_string(),
            false,
            &quote,
        );
        state.store.create(&shipment, "owner").await.unwrap();

        let Json(view) = track_shipment(
            State(state),
            Path(shipment.tracking_number.clone()),
        )
        .await
        .unwrap();

        assert_eq!(view.tracking_number, shipment.tracking_number);
        assert_eq!(view.status, ShipmentStatus::Registered);
        assert_eq!(view.history.len(), 1);

        // The serialized view must not leak private fields
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("sender_name").is_none());
        assert!(json.get("total_usd").is_none());
    }

    #[tokio::test]
    async fn test_track_unknown_number() {
        let state = test_state().await;
        let result = track_shipment(State(state), Path("PKF-NOPE2345".to_string())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
