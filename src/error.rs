use thiserror::Error;

/// Failures the pricing engine surfaces to its callers.
///
/// Soft upstream issues (missing price fields, missing CSFloat credential)
/// never show up here; they are absorbed as absent values at the adapter
/// level.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PricingError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("float value {0} does not fall in any wear bucket")]
    WearOutOfRange(f64),

    #[error("{source_name} is unavailable: {reason}")]
    SourceUnavailable {
        source_name: &'static str,
        reason: String,
    },

    #[error("{source_name} has no market for {market_hash_name}")]
    SourceRejected {
        source_name: &'static str,
        market_hash_name: String,
    },

    #[error("could not obtain any price for {0}")]
    NoPrice(String),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}
