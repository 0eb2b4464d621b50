use log::debug;
use serde_json::json;

use error::PricingError;
use resolver::PriceResolver;
use types::PriceQuery;

pub mod error;
pub mod resolver;
pub mod sources;
pub mod types;
pub mod wear;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let query = match parse_args(&args) {
        Ok(query) => query,
        Err(e) => {
            eprintln!("Usage: skin-pricer <item name> [--wear NAME] [--float VALUE] [--seed SEED]");
            fail(&e);
        }
    };

    debug!("query: {:?}", query);

    let resolver = match PriceResolver::from_env() {
        Ok(resolver) => resolver,
        Err(e) => fail(&e),
    };

    match resolver.estimate(&query).await {
        Ok(estimate) => {
            let envelope = json!({ "success": true, "data": estimate });
            println!("{}", serde_json::to_string_pretty(&envelope).unwrap());
        }
        Err(e) => fail(&e),
    }
}

/// Prints the failure envelope and exits non-zero.
fn fail(e: &PricingError) -> ! {
    println!("{}", json!({ "success": false, "error": e.to_string() }));
    std::process::exit(1);
}

/// `<item name> [--wear NAME] [--float VALUE] [--seed SEED]` — bare words
/// accumulate into the item name so quoting is optional.
fn parse_args(args: &[String]) -> Result<PriceQuery, PricingError> {
    let mut item_words: Vec<&str> = Vec::new();
    let mut wear_name = None;
    let mut float_value = None;
    let mut paint_seed = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--wear" => wear_name = Some(expect_value(&mut iter, "--wear")?.to_owned()),
            "--float" => {
                let raw = expect_value(&mut iter, "--float")?;
                float_value = Some(raw.parse().map_err(|_| {
                    PricingError::InvalidQuery(format!("{} is not a valid float value", raw))
                })?);
            }
            "--seed" => {
                let raw = expect_value(&mut iter, "--seed")?;
                paint_seed = Some(raw.parse().map_err(|_| {
                    PricingError::InvalidQuery(format!("{} is not a valid paint seed", raw))
                })?);
            }
            word => item_words.push(word),
        }
    }

    PriceQuery::new(&item_words.join(" "), wear_name, float_value, paint_seed)
}

fn expect_value<'a>(
    iter: &mut std::slice::Iter<'a, String>,
    flag: &str,
) -> Result<&'a String, PricingError> {
    iter.next()
        .ok_or_else(|| PricingError::InvalidQuery(format!("{} requires a value", flag)))
}
