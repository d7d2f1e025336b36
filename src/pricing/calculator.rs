use thiserror::Error;

use crate::pricing::models::{PriceQuote, Weight};
use crate::pricing::schedule::PricingSchedule;

/// Rejected quote input.
///
/// The weight is the only validated input, so this is the calculator's whole
/// error surface. Callers turn it into a form-validation message; there is
/// nothing to retry and no partial result.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InvalidWeight {
    #[error("weight must be a finite number")]
    NotFinite,
    #[error("weight must be greater than zero, got {0}")]
    NotPositive(f64),
    #[error("weight {weight_lbs} lb exceeds the {limit_lbs} lb limit")]
    OverLimit { weight_lbs: f64, limit_lbs: f64 },
}

/// Compute the price breakdown for a package.
///
/// Pure and deterministic: the same weight, flag, and schedule always produce
/// the same quote. Band upper bounds are inclusive, so a weight exactly on a
/// boundary takes the lower band's price.
pub fn quote(
    weight: Weight,
    urgent: bool,
    schedule: &PricingSchedule,
) -> Result<PriceQuote, InvalidWeight> {
    let weight_lbs = weight.as_pounds();

    if !weight_lbs.is_finite() {
        return Err(InvalidWeight::NotFinite);
    }
    if weight_lbs <= 0.0 {
        return Err(InvalidWeight::NotPositive(weight_lbs));
    }
    if let Some(limit_lbs) = schedule.max_weight_lbs {
        if weight_lbs > limit_lbs {
            return Err(InvalidWeight::OverLimit {
                weight_lbs,
                limit_lbs,
            });
        }
    }

    let base_price = schedule.base_price(weight_lbs);
    let handling_fee = base_price * schedule.handling_rate;
    let urgent_fee = if urgent {
        base_price * schedule.urgent_rate
    } else {
        0.0
    };
    let total_usd = base_price + handling_fee + urgent_fee;
    let total_cup = total_usd * schedule.exchange_rate;

    Ok(PriceQuote {
        weight_lbs,
        base_price,
        handling_fee,
        urgent_fee,
        total_usd,
        total_cup,
    })
}
