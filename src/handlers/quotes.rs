use axum::{extract::State, Json};
use serde::Deserialize;
use std::time::Instant;

use crate::error::AppError;
use crate::handlers::AppState;
use crate::metrics;
use crate::pricing::{self, PriceQuote, PricingSchedule, Weight, WeightUnit};

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub weight: f64,
    #[serde(default)]
    pub unit: WeightUnit,
    #[serde(default)]
    pub urgent: bool,
}

/// Handle POST /api/v1/quotes
///
/// Stateless: nothing is persisted, callers re-submit whenever the form
/// inputs change.
pub async fn create_quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<PriceQuote>, AppError> {
    let started = Instant::now();

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

    metrics::record_quote(req.urgent);
    metrics::record_duration("/api/v1/quotes", started.elapsed());

    Ok(Json(quote))
}

#[cfg(test)]
mod tests {
    use super::*;
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
    async fn test_quote_happy_path() {
        let state = test_state().await;
        let Json(quote) = create_quote(
            State(state),
            Json(QuoteRequest {
                weight: 5.0,
                unit: WeightUnit::Pounds,
                urgent: true,
            }),
        )
        .await
        .unwrap();

        assert_eq!(quote.base_price, 28.00);
        assert_eq!(quote.urgent_fee, 7.00);
    }

    #[tokio::test]
    async fn test_quote_rejects_zero_weight() {
        let state = test_state().await;
        let result = create_quote(
            State(state),
            Json(QuoteRequest {
                weight: 0.0,
                unit: WeightUnit::Pounds,
                urgent: false,
            }),
        )
        .await;

        assert!(matches!(result, Err(AppError::InvalidWeight(_))));
    }
}
