use serde::{Deserialize, Serialize};

/// Unit a package weight was entered in.
///
/// The rate schedule itself is authored in pounds; kilogram inputs are
/// converted before band lookup. Keeping the unit explicit at the type level
/// avoids call sites silently mixing the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    #[default]
    Pounds,
    Kilograms,
}

/// The schedule's band boundaries sit at whole kilograms times this factor,
/// so integral-kilogram weights land exactly on band boundaries.
pub const POUNDS_PER_KILOGRAM: f64 = 2.2;

/// A package weight tagged with its unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weight {
    pub value: f64,
    pub unit: WeightUnit,
}

impl Weight {
    pub fn pounds(value: f64) -> Self {
        Self {
            value,
            unit: WeightUnit::Pounds,
        }
    }

    pub fn kilograms(value: f64) -> Self {
        Self {
            value,
            unit: WeightUnit::Kilograms,
        }
    }

    /// Weight expressed in pounds, the schedule's canonical unit.
    pub fn as_pounds(&self) -> f64 {
        match self.unit {
            WeightUnit::Pounds => self.value,
            WeightUnit::Kilograms => self.value * POUNDS_PER_KILOGRAM,
        }
    }
}

/// Price breakdown for a single package, in USD and CUP.
///
/// All fields are derived from the weight and the urgent flag in one shot;
/// a quote is never partially updated, it is recomputed whenever the inputs
/// change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Weight the quote was computed for, in pounds.
    pub weight_lbs: f64,
    /// Flat band price in USD.
    pub base_price: f64,
    /// Handling surcharge in USD, a fixed fraction of the base price.
    pub handling_fee: f64,
    /// Urgent-delivery surcharge in USD; zero when the flag is not set.
    pub urgent_fee: f64,
    /// Total in USD: base + handling + urgent.
    pub total_usd: f64,
    /// Total converted to CUP at the configured exchange rate.
    pub total_cup: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pounds_passthrough() {
        assert_eq!(Weight::pounds(3.5).as_pounds(), 3.5);
    }

    #[test]
    fn test_kilograms_convert_at_schedule_factor() {
        // 2 kg sits exactly on the 4.4 lb band boundary
        assert_eq!(Weight::kilograms(2.0).as_pounds(), 4.4);
    }

    #[test]
    fn test_unit_default_is_pounds() {
        assert_eq!(WeightUnit::default(), WeightUnit::Pounds);
    }

    #[test]
    fn test_weight_unit_serde_names() {
        assert_eq!(
            serde_json::to_string(&WeightUnit::Kilograms).unwrap(),
            "\"kilograms\""
        );
        let unit: WeightUnit = serde_json::from_str("\"pounds\"").unwrap();
        assert_eq!(unit, WeightUnit::Pounds);
    }
}
