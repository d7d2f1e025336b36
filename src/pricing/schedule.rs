use crate::config::PricingConfig;

/// Weight bands in pounds: (inclusive upper bound, base price in USD).
/// A weight exactly on a boundary belongs to the lower band.
const BANDS: [(f64, f64); 5] = [
    (2.2, 8.50),
    (4.4, 15.00),
    (11.0, 28.00),
    (22.0, 45.00),
    (44.0, 85.00),
];

/// Above the top band the base price grows linearly per extra pound.
const TOP_BAND_CEILING_LBS: f64 = 44.0;
const TOP_BAND_BASE: f64 = 85.00;
const OVERWEIGHT_RATE_PER_LB: f64 = 2.04;

/// Rate schedule for quote computation.
///
/// The band table is fixed; the surcharge rates and the exchange rate come
/// from configuration so operations can adjust them without a rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingSchedule {
    /// Fraction of the base price always charged for handling.
    pub handling_rate: f64,
    /// Fraction of the base price charged when the urgent flag is set.
    pub urgent_rate: f64,
    /// CUP per USD.
    pub exchange_rate: f64,
    /// Optional hard cap on accepted weight, in pounds.
    pub max_weight_lbs: Option<f64>,
}

impl Default for PricingSchedule {
    fn default() -> Self {
        Self {
            handling_rate: 0.15,
            urgent_rate: 0.25,
            exchange_rate: 320.0,
            max_weight_lbs: None,
        }
    }
}

impl From<&PricingConfig> for PricingSchedule {
    fn from(cfg: &PricingConfig) -> Self {
        Self {
            handling_rate: cfg.handling_rate,
            urgent_rate: cfg.urgent_rate,
            exchange_rate: cfg.exchange_rate,
            max_weight_lbs: cfg.max_weight_lbs,
        }
    }
}

impl PricingSchedule {
    /// Flat band price for a weight in pounds.
    ///
    /// Callers must have validated the weight already; this is a pure table
    /// lookup with the open-ended top band.
    pub fn base_price(&self, weight_lbs: f64) -> f64 {
        for (upper, price) in BANDS {
            if weight_lbs <= upper {
                return price;
            }
        }
        TOP_BAND_BASE + (weight_lbs - TOP_BAND_CEILING_LBS) * OVERWEIGHT_RATE_PER_LB
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_lookup() {
        let schedule = PricingSchedule::default();
        assert_eq!(schedule.base_price(1.0), 8.50);
        assert_eq!(schedule.base_price(3.0), 15.00);
        assert_eq!(schedule.base_price(10.0), 28.00);
        assert_eq!(schedule.base_price(12.0), 45.00);
        assert_eq!(schedule.base_price(30.0), 85.00);
    }

    #[test]
    fn test_boundaries_belong_to_lower_band() {
        let schedule = PricingSchedule::default();
        assert_eq!(schedule.base_price(2.2), 8.50);
        assert_eq!(schedule.base_price(4.4), 15.00);
        assert_eq!(schedule.base_price(11.0), 28.00);
        assert_eq!(schedule.base_price(22.0), 45.00);
        assert_eq!(schedule.base_price(44.0), 85.00);
    }

    #[test]
    fn test_just_past_boundary_moves_up() {
        let schedule = PricingSchedule::default();
        assert_eq!(schedule.base_price(2.3), 15.00);
        assert_eq!(schedule.base_price(4.5), 28.00);
    }

    #[test]
    fn test_overweight_grows_linearly() {
        let schedule = PricingSchedule::default();
        let price = schedule.base_price(50.0);
        assert!((price - (85.00 + 6.0 * 2.04)).abs() < 1e-9);
    }
}
