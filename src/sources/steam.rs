use log::error;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use crate::error::PricingError;
use crate::sources::http_client;

const BASE_URL: &str = "https://steamcommunity.com/market/priceoverview/";
// CS2 app ID
const STEAM_APPID: &str = "730";
// Fixed reporting currency (USD)
const STEAM_CURRENCY: &str = "1";

pub const SOURCE_NAME: &str = "Steam market";

/// Summary statistics the Steam market reports for one item + wear. Either
/// field may be absent when the market omits or mangles it.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceOverview {
    pub lowest_price: Option<f64>,
    pub median_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PriceOverviewResponse {
    #[serde(default)]
    success: bool,
    lowest_price: Option<String>,
    median_price: Option<String>,
}

#[derive(Clone)]
pub struct SteamMarket {
    req_client: Client,
    price_re: Regex,
}

impl SteamMarket {
    pub fn new() -> Result<Self, PricingError> {
        Ok(Self {
            req_client: http_client()?,
            price_re: Regex::new(r"[\d,.]+").unwrap(),
        })
    }

    /// Requests the price overview for a fully qualified market hash name,
    /// e.g. `AK-47 | Redline (Field-Tested)`.
    pub async fn price_overview(
        &self,
        market_hash_name: &str,
    ) -> Result<PriceOverview, PricingError> {
        let req = match self
            .req_client
            .get(BASE_URL)
            .query(&[
                ("currency", STEAM_CURRENCY),
                ("appid", STEAM_APPID),
                ("market_hash_name", market_hash_name),
            ])
            .send()
            .await
        {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to send request to the Steam market: {:?}", e);
                return Err(PricingError::SourceUnavailable {
                    source_name: SOURCE_NAME,
                    reason: e.to_string(),
                });
            }
        };

        if !req.status().is_success() {
            error!(
                "Steam market returned status {} for {}",
                req.status(),
                market_hash_name
            );
            return Err(PricingError::SourceUnavailable {
                source_name: SOURCE_NAME,
                reason: format!("status {}", req.status()),
            });
        }

        let body: PriceOverviewResponse = match req.json().await {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to parse JSON from the Steam market: {:?}", e);
                return Err(PricingError::SourceUnavailable {
                    source_name: SOURCE_NAME,
                    reason: e.to_string(),
                });
            }
        };

        // success=false means the item/wear combination has no market page
        if !body.success {
            return Err(PricingError::SourceRejected {
                source_name: SOURCE_NAME,
                market_hash_name: market_hash_name.to_owned(),
            });
        }

        Ok(PriceOverview {
            lowest_price: self.parse_price(body.lowest_price.as_deref()),
            median_price: self.parse_price(body.median_price.as_deref()),
        })
    }

    /// Extracts the first numeric token from a free-form currency string,
    /// e.g. `$1,234.56 USD`. An absent or unparseable field is an absent
    /// price, not an error.
    fn parse_price(&self, raw: Option<&str>) -> Option<f64> {
        let raw = raw?;
        let token = self.price_re.find(raw)?.as_str().replace(',', "");
        token.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market() -> SteamMarket {
        SteamMarket::new().unwrap()
    }

    #[test]
    fn parses_plain_and_formatted_currency_strings() {
        let market = market();
        assert_eq!(market.parse_price(Some("$40.00")), Some(40.0));
        assert_eq!(market.parse_price(Some("$0.03")), Some(0.03));
        assert_eq!(market.parse_price(Some("1,234.56 USD")), Some(1234.56));
    }

    #[test]
    fn absent_or_unparseable_prices_become_none() {
        let market = market();
        assert_eq!(market.parse_price(None), None);
        assert_eq!(market.parse_price(Some("")), None);
        assert_eq!(market.parse_price(Some("n/a")), None);
    }

    #[test]
    fn decodes_a_partial_overview_payload() {
        let body: PriceOverviewResponse =
            serde_json::from_str(r#"{"success":true,"median_price":"$45.00"}"#).unwrap();

        assert!(body.success);
        assert_eq!(body.lowest_price, None);
        assert_eq!(body.median_price.as_deref(), Some("$45.00"));
    }

    #[test]
    fn missing_success_flag_reads_as_rejection() {
        let body: PriceOverviewResponse = serde_json::from_str("{}").unwrap();
        assert!(!body.success);
    }
}
