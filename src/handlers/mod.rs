pub mod health;
pub mod metrics_handler;
pub mod quotes;
pub mod shipments;
pub mod tracking;

use std::sync::Arc;

use crate::config::Config;
use crate::storage::ShipmentStore;

/// Shared state for all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<arc_swap::ArcSwap<Config>>,
    pub store: Arc<ShipmentStore>,
}
