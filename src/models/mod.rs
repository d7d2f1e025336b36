pub mod shipment;

pub use shipment::{generate_tracking_number, Shipment, ShipmentStatus, StatusEvent};
