pub mod calculator;
pub mod models;
pub mod schedule;

pub use calculator::{quote, InvalidWeight};
pub use models::{PriceQuote, Weight, WeightUnit};
pub use schedule::PricingSchedule;
