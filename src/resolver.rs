use futures_util::{stream, StreamExt};
use log::{debug, warn};

use crate::error::PricingError;
use crate::sources::csfloat::{CsFloat, DEFAULT_LISTING_LIMIT};
use crate::sources::steam::{PriceOverview, SteamMarket};
use crate::types::{CrossWearEstimate, Estimate, PriceQuery, ResolvedPrice, WearAverage};
use crate::wear::{classify_wear, DEFAULT_WEAR, WEAR_BUCKETS};

/// Half-width of the float window used to match listings against a specific
/// float value.
const FLOAT_WINDOW: f64 = 0.002;

/// Concurrent per-wear lookups during an across-wears sweep, capping outbound
/// pressure on the upstream endpoints.
const WEAR_LOOKUP_CONCURRENCY: usize = 3;

const DEFAULT_MIN_FLOAT_SAMPLES: usize = 1;

pub struct PriceResolver {
    steam: SteamMarket,
    csfloat: CsFloat,
    /// Listings needed inside the float window before their average is
    /// trusted over the Steam median.
    min_float_samples: usize,
}

impl PriceResolver {
    /// Builds a resolver from the environment: the CSFloat credential and the
    /// `MIN_FLOAT_SAMPLES` policy knob (default 1).
    pub fn from_env() -> Result<Self, PricingError> {
        let min_float_samples = match std::env::var("MIN_FLOAT_SAMPLES") {
            Ok(raw) => match raw.parse() {
                Ok(n) => n,
                Err(_) => {
                    warn!(
                        "MIN_FLOAT_SAMPLES is not a number, using default of {}",
                        DEFAULT_MIN_FLOAT_SAMPLES
                    );
                    DEFAULT_MIN_FLOAT_SAMPLES
                }
            },
            Err(_) => DEFAULT_MIN_FLOAT_SAMPLES,
        };

        Ok(Self::new(
            SteamMarket::new()?,
            CsFloat::from_env()?,
            min_float_samples,
        ))
    }

    pub fn new(steam: SteamMarket, csfloat: CsFloat, min_float_samples: usize) -> Self {
        Self {
            steam,
            csfloat,
            min_float_samples,
        }
    }

    /// Boundary operation: a query naming neither a wear nor a float sweeps
    /// every wear tier, anything else resolves a single price.
    pub async fn estimate(&self, query: &PriceQuery) -> Result<Estimate, PricingError> {
        if query.wants_all_wears() {
            self.resolve_across_wears(query.item_name())
                .await
                .map(Estimate::AcrossWears)
        } else {
            self.resolve(query).await.map(Estimate::Single)
        }
    }

    /// Resolves one expected price for a single (item, wear-or-float) query.
    ///
    /// The most specific signal wins: a float-adjusted listing average over
    /// the Steam median, the median over the lowest ask.
    pub async fn resolve(&self, query: &PriceQuery) -> Result<ResolvedPrice, PricingError> {
        let wear_name = match query.wear_name() {
            Some(wear) => wear.to_owned(),
            None => match query.float_value() {
                Some(value) => classify_wear(value)?.to_owned(),
                None => DEFAULT_WEAR.to_owned(),
            },
        };

        let market_hash_name = format!("{} ({})", query.item_name(), wear_name);

        // A rejection only matters if no other signal produces a price.
        let (overview, rejection) = match self.steam.price_overview(&market_hash_name).await {
            Ok(overview) => (overview, None),
            Err(e @ PricingError::SourceRejected { .. }) => (
                PriceOverview {
                    lowest_price: None,
                    median_price: None,
                },
                Some(e),
            ),
            Err(e) => return Err(e),
        };

        let float_adjusted = match query.float_value() {
            Some(value) => {
                let (min_float, max_float) = float_window(value);
                let prices = self
                    .csfloat
                    .listings(
                        &market_hash_name,
                        min_float,
                        max_float,
                        query.paint_seed(),
                        DEFAULT_LISTING_LIMIT,
                    )
                    .await?;
                float_adjusted_from(&prices, self.min_float_samples)
            }
            None => None,
        };

        settle(&market_hash_name, overview, float_adjusted, rejection)
    }

    /// Sweeps the five wear tiers and averages the ones that resolve. Wears
    /// the item does not exist in are skipped.
    pub async fn resolve_across_wears(
        &self,
        item_name: &str,
    ) -> Result<CrossWearEstimate, PricingError> {
        let outcomes: Vec<(&'static str, Result<ResolvedPrice, PricingError>)> =
            stream::iter(WEAR_BUCKETS.map(|bucket| bucket.name))
                .map(move |wear| async move {
                    let result = match PriceQuery::for_wear(item_name, wear) {
                        Ok(query) => self.resolve(&query).await,
                        Err(e) => Err(e),
                    };
                    (wear, result)
                })
                .buffered(WEAR_LOOKUP_CONCURRENCY)
                .collect()
                .await;

        summarize_wears(item_name, outcomes)
    }
}

/// Clamped ±`FLOAT_WINDOW` range around a float value.
fn float_window(value: f64) -> (f64, f64) {
    (
        (value - FLOAT_WINDOW).max(0.0),
        (value + FLOAT_WINDOW).min(1.0),
    )
}

fn mean(prices: &[f64]) -> f64 {
    prices.iter().sum::<f64>() / prices.len() as f64
}

/// Average of the in-window listings, absent when the sample is too small to
/// trust.
fn float_adjusted_from(prices: &[f64], min_samples: usize) -> Option<f64> {
    if prices.is_empty() || prices.len() < min_samples {
        return None;
    }

    Some(mean(prices))
}

/// First present candidate wins; callers pass candidates in precedence order.
fn first_present(candidates: [Option<f64>; 3]) -> Option<f64> {
    candidates.into_iter().flatten().next()
}

/// Picks the expected price from the gathered signals, carrying every raw
/// signal through so callers can show provenance. With nothing to pick, a
/// deferred rejection outranks the generic no-price failure.
fn settle(
    market_hash_name: &str,
    overview: PriceOverview,
    float_adjusted: Option<f64>,
    rejection: Option<PricingError>,
) -> Result<ResolvedPrice, PricingError> {
    match first_present([float_adjusted, overview.median_price, overview.lowest_price]) {
        Some(expected_price) => Ok(ResolvedPrice {
            expected_price,
            steam_lowest: overview.lowest_price,
            steam_median: overview.median_price,
            float_adjusted,
        }),
        None => Err(match rejection {
            Some(e) => e,
            None => PricingError::NoPrice(market_hash_name.to_owned()),
        }),
    }
}

/// Collects the per-wear outcomes: failures are skipped, successes keep their
/// canonical order and feed the overall average.
fn summarize_wears(
    item_name: &str,
    outcomes: Vec<(&'static str, Result<ResolvedPrice, PricingError>)>,
) -> Result<CrossWearEstimate, PricingError> {
    let mut all_wears = Vec::new();
    for (wear, outcome) in outcomes {
        match outcome {
            Ok(resolved) => all_wears.push(WearAverage {
                wear: wear.to_owned(),
                price: resolved.expected_price,
            }),
            Err(e) => debug!("Skipping wear {} for {}: {}", wear, item_name, e),
        }
    }

    if all_wears.is_empty() {
        return Err(PricingError::NoPrice(item_name.to_owned()));
    }

    let prices: Vec<f64> = all_wears.iter().map(|w| w.price).collect();
    Ok(CrossWearEstimate {
        average_price: mean(&prices),
        all_wears,
    })
}
