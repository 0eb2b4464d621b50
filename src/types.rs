use serde::Serialize;

use crate::error::PricingError;

/// One normalized price lookup, validated at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuery {
    item_name: String,
    wear_name: Option<String>,
    float_value: Option<f64>,
    paint_seed: Option<u32>,
}

impl PriceQuery {
    pub fn new(
        item_name: &str,
        wear_name: Option<String>,
        float_value: Option<f64>,
        paint_seed: Option<u32>,
    ) -> Result<Self, PricingError> {
        let item_name = item_name.trim();
        if item_name.is_empty() {
            return Err(PricingError::InvalidQuery(
                "item name is required".to_owned(),
            ));
        }

        if let Some(value) = float_value {
            if !(0.0..=1.0).contains(&value) {
                return Err(PricingError::InvalidQuery(format!(
                    "float value {} must be between 0.00 and 1.00",
                    value
                )));
            }
        }

        Ok(Self {
            item_name: item_name.to_owned(),
            wear_name,
            float_value,
            paint_seed,
        })
    }

    /// Query for one specific wear of an item, used by the across-wears sweep.
    pub fn for_wear(item_name: &str, wear_name: &str) -> Result<Self, PricingError> {
        Self::new(item_name, Some(wear_name.to_owned()), None, None)
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn wear_name(&self) -> Option<&str> {
        self.wear_name.as_deref()
    }

    pub fn float_value(&self) -> Option<f64> {
        self.float_value
    }

    pub fn paint_seed(&self) -> Option<u32> {
        self.paint_seed
    }

    /// A query naming neither a wear nor a float asks for the across-wears
    /// estimate.
    pub fn wants_all_wears(&self) -> bool {
        self.wear_name.is_none() && self.float_value.is_none()
    }
}

/// Expected price for one (item, wear-or-float) query, together with the raw
/// signals it was derived from.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResolvedPrice {
    pub expected_price: f64,
    pub steam_lowest: Option<f64>,
    pub steam_median: Option<f64>,
    pub float_adjusted: Option<f64>,
}

/// Expected price of one wear tier inside an across-wears sweep.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WearAverage {
    pub wear: String,
    pub price: f64,
}

/// Across-wears sweep result: the wears that resolved, in canonical order,
/// and the average of their expected prices.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CrossWearEstimate {
    pub all_wears: Vec<WearAverage>,
    pub average_price: f64,
}

/// Output of the top-level estimate operation, tagged by the mode the query
/// was routed to.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "mode", content = "result")]
pub enum Estimate {
    #[serde(rename = "single")]
    Single(ResolvedPrice),
    #[serde(rename = "across-wears")]
    AcrossWears(CrossWearEstimate),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_item_names_are_rejected() {
        assert!(matches!(
            PriceQuery::new("", None, None, None),
            Err(PricingError::InvalidQuery(_))
        ));
        assert!(matches!(
            PriceQuery::new("   ", None, None, None),
            Err(PricingError::InvalidQuery(_))
        ));
    }

    #[test]
    fn float_values_outside_the_unit_range_are_rejected() {
        assert!(PriceQuery::new("AK-47 | Redline", None, Some(1.5), None).is_err());
        assert!(PriceQuery::new("AK-47 | Redline", None, Some(-0.1), None).is_err());
        // 1.0 itself is a legal float value, classification decides its fate
        assert!(PriceQuery::new("AK-47 | Redline", None, Some(1.0), None).is_ok());
    }

    #[test]
    fn mode_follows_missing_wear_and_float() {
        let query = PriceQuery::new("AK-47 | Redline", None, None, None).unwrap();
        assert!(query.wants_all_wears());

        let query =
            PriceQuery::new("AK-47 | Redline", Some("Field-Tested".to_owned()), None, None)
                .unwrap();
        assert!(!query.wants_all_wears());

        let query = PriceQuery::new("AK-47 | Redline", None, Some(0.2), None).unwrap();
        assert!(!query.wants_all_wears());
    }

    #[test]
    fn estimates_serialize_with_a_mode_tag() {
        let estimate = Estimate::Single(ResolvedPrice {
            expected_price: 43.0,
            steam_lowest: Some(40.0),
            steam_median: Some(45.0),
            float_adjusted: Some(43.0),
        });

        let value = serde_json::to_value(&estimate).unwrap();
        assert_eq!(value["mode"], "single");
        assert_eq!(value["result"]["expected_price"], 43.0);

        let estimate = Estimate::AcrossWears(CrossWearEstimate {
            all_wears: vec![WearAverage {
                wear: "Factory New".to_owned(),
                price: 50.0,
            }],
            average_price: 50.0,
        });

        let value = serde_json::to_value(&estimate).unwrap();
        assert_eq!(value["mode"], "across-wears");
        assert_eq!(value["result"]["average_price"], 50.0);
    }
}
