use log::{error, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_aux::prelude::deserialize_number_from_string;

use crate::error::PricingError;
use crate::sources::http_client;

const BASE_URL: &str = "https://csfloat.com/api/v1/listings";

pub const SOURCE_NAME: &str = "CSFloat";

/// Default cap on listings requested per lookup.
pub const DEFAULT_LISTING_LIMIT: u32 = 50;

/// One active listing; only its price matters here. Prices come over the
/// wire in integer minor units (cents).
#[derive(Debug, Deserialize)]
struct CsFloatListing {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    price: u64,
}

#[derive(Clone)]
pub struct CsFloat {
    req_client: Client,
    api_key: Option<String>,
}

impl CsFloat {
    /// Reads the `CSFLOAT_API_KEY` credential from the environment. A missing
    /// key leaves the adapter in degraded mode: every lookup returns no
    /// listings instead of erroring.
    pub fn from_env() -> Result<Self, PricingError> {
        let api_key = std::env::var("CSFLOAT_API_KEY").ok();
        if api_key.is_none() {
            warn!(
                "CSFLOAT_API_KEY not set - skipping float-specific pricing and \
                 falling back to Steam median/lowest price"
            );
        }

        Self::with_key(api_key)
    }

    pub fn with_key(api_key: Option<String>) -> Result<Self, PricingError> {
        Ok(Self {
            req_client: http_client()?,
            api_key,
        })
    }

    /// Requests active listings for a market hash name inside a float window,
    /// optionally narrowed to one paint seed. Prices are returned in USD
    /// major units, lowest first as requested of the upstream.
    pub async fn listings(
        &self,
        market_hash_name: &str,
        min_float: f64,
        max_float: f64,
        paint_seed: Option<u32>,
        limit: u32,
    ) -> Result<Vec<f64>, PricingError> {
        let Some(api_key) = &self.api_key else {
            return Ok(Vec::new());
        };

        let mut params = vec![
            ("market_hash_name", market_hash_name.to_owned()),
            ("sort_by", "lowest_price".to_owned()),
            ("limit", limit.to_string()),
            ("min_float", min_float.to_string()),
            ("max_float", max_float.to_string()),
        ];
        if let Some(seed) = paint_seed {
            params.push(("paint_seed", seed.to_string()));
        }

        let req = match self
            .req_client
            .get(BASE_URL)
            .query(&params)
            .header("Authorization", api_key)
            .send()
            .await
        {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to send request to CSFloat: {:?}", e);
                return Err(PricingError::SourceUnavailable {
                    source_name: SOURCE_NAME,
                    reason: e.to_string(),
                });
            }
        };

        if !req.status().is_success() {
            error!(
                "CSFloat returned status {} for {}",
                req.status(),
                market_hash_name
            );
            return Err(PricingError::SourceUnavailable {
                source_name: SOURCE_NAME,
                reason: format!("status {}", req.status()),
            });
        }

        let listings: Vec<CsFloatListing> = match req.json().await {
            Ok(listings) => listings,
            Err(e) => {
                error!("Failed to parse JSON from CSFloat: {:?}", e);
                return Err(PricingError::SourceUnavailable {
                    source_name: SOURCE_NAME,
                    reason: e.to_string(),
                });
            }
        };

        Ok(major_units(&listings))
    }
}

/// Converts integer cent prices to USD major units, preserving order.
fn major_units(listings: &[CsFloatListing]) -> Vec<f64> {
    listings.iter().map(|l| l.price as f64 / 100.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_integer_and_string_prices() {
        let listings: Vec<CsFloatListing> =
            serde_json::from_str(r#"[{"price":4200},{"price":"4400","state":"listed"}]"#).unwrap();

        assert_eq!(major_units(&listings), vec![42.0, 44.0]);
    }

    #[test]
    fn converts_minor_units_preserving_order() {
        let listings = vec![
            CsFloatListing { price: 103 },
            CsFloatListing { price: 99 },
            CsFloatListing { price: 100000 },
        ];

        assert_eq!(major_units(&listings), vec![1.03, 0.99, 1000.0]);
    }

    #[tokio::test]
    async fn missing_credential_degrades_to_no_listings() {
        let csfloat = CsFloat::with_key(None).unwrap();
        let prices = csfloat
            .listings("AK-47 | Redline (Minimal Wear)", 0.098, 0.102, None, 50)
            .await
            .unwrap();

        assert!(prices.is_empty());
    }
}
