use std::time::Duration;

use reqwest::Client;

use crate::error::PricingError;

pub mod csfloat;
pub mod steam;

/// Bound on every outbound marketplace request; a timeout surfaces as
/// `SourceUnavailable` and is never retried here.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn http_client() -> Result<Client, PricingError> {
    reqwest::ClientBuilder::new()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| PricingError::ClientBuild(e.to_string()))
}
