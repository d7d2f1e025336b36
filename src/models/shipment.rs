use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::pricing::PriceQuote;

/// Lifecycle states of a shipment, Miami intake through Cuba delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Registered,
    ReceivedMiami,
    InTransit,
    InCuba,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::ReceivedMiami => "received_miami",
            Self::InTransit => "in_transit",
            Self::InCuba => "in_cuba",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "registered" => Some(Self::Registered),
            "received_miami" => Some(Self::ReceivedMiami),
            "in_transit" => Some(Self::InTransit),
            "in_cuba" => Some(Self::InCuba),
            "out_for_delivery" => Some(Self::OutForDelivery),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Delivered and cancelled shipments accept no further changes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored shipment with its server-computed price breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: Uuid,
    pub tenant: String,
    pub tracking_number: String,
    pub sender_name: String,
    pub sender_phone: Option<String>,
    pub recipient_name: String,
    pub recipient_phone: Option<String>,
    pub recipient_address: String,
    pub weight_lbs: f64,
    pub urgent: bool,
    pub base_price: f64,
    pub handling_fee: f64,
    pub urgent_fee: f64,
    pub total_usd: f64,
    pub total_cup: f64,
    pub status: ShipmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shipment {
    /// Assemble a new shipment in the `Registered` state from validated
    /// inputs and a freshly computed quote.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant: &str,
        tracking_number: String,
        sender_name: String,
        sender_phone: Option<String>,
        recipient_name: String,
        recipient_phone: Option<String>,
        recipient_address: String,
        urgent: bool,
        quote: &PriceQuote,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant: tenant.to_string(),
            tracking_number,
            sender_name,
            sender_phone,
            recipient_name,
            recipient_phone,
            recipient_address,
            weight_lbs: quote.weight_lbs,
            urgent,
            base_price: quote.base_price,
            handling_fee: quote.handling_fee,
            urgent_fee: quote.urgent_fee,
            total_usd: quote.total_usd,
            total_cup: quote.total_cup,
            status: ShipmentStatus::Registered,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One row of a shipment's status history, append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEvent {
    pub status: ShipmentStatus,
    pub note: Option<String>,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
}

const TRACKING_PREFIX: &str = "PKF-";
const TRACKING_SUFFIX_LEN: usize = 8;
// No 0/O/1/I, tracking numbers get read over the phone
const TRACKING_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generate a candidate tracking number. Uniqueness is enforced by the
/// store's unique index; callers retry on collision.
pub fn generate_tracking_number() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..TRACKING_SUFFIX_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..TRACKING_CHARSET.len());
            TRACKING_CHARSET[idx] as char
        })
        .collect();
    format!("{}{}", TRACKING_PREFIX, suffix)
}
