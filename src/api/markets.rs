use std::collections::BTreeMap;

use serde_json::Value;

use super::classify::{ALL_CATEGORIES, Classifier};
use super::config::AppConfig;
use super::fetch;
use super::normalize::{num_field, str_field};
use super::types::{CategoryStats, MarketStats, MarketSummary};

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Yes/No prices in percent. `outcomePrices` arrives as a JSON-encoded
/// string array ("[\"0.65\", \"0.35\"]"); when absent or degenerate, the
/// last trade price and its complement stand in; with no signal at all the
/// market reads 50/50.
fn derive_prices(market: &Value) -> (f64, f64) {
    let mut yes = 50.0;
    let mut no = 50.0;

    let prices: Option<Vec<String>> = match market.get("outcomePrices") {
        Some(Value::String(s)) => serde_json::from_str(s).ok(),
        Some(Value::Array(arr)) => Some(
            arr.iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        ),
        _ => None,
    };
    if let Some(prices) = prices {
        if prices.len() >= 2 {
            if let (Ok(y), Ok(n)) = (prices[0].parse::<f64>(), prices[1].parse::<f64>()) {
                // "NaN" and "1e999" parse successfully; keep those out of
                // the payload.
                if y.is_finite() && n.is_finite() {
                    yes = y * 100.0;
                    no = n * 100.0;
                }
            }
        }
    }

    if yes == 50.0 && no == 50.0 {
        let last = num_field(market, &["lastTradePrice"]);
        if last != 0.0 {
            yes = last * 100.0;
            no = 100.0 - yes;
        }
    }

    (yes, no)
}

/// Spread in percentage points: explicit field first, then best ask − best
/// bid, then the deviation of summed outcome prices from 100.
fn derive_spread(market: &Value, total_price: f64) -> f64 {
    let explicit = num_field(market, &["spread"]);
    if explicit > 0.0 {
        return explicit * 100.0;
    }
    if market.get("bestBid").is_some() && market.get("bestAsk").is_some() {
        let bid = num_field(market, &["bestBid"]);
        let ask = num_field(market, &["bestAsk"]);
        return (ask - bid) * 100.0;
    }
    total_price - 100.0
}

/// Shapes one raw Gamma market object into a summary row.
pub fn summarize(market: &Value, classifier: &Classifier) -> MarketSummary {
    let (yes, no) = derive_prices(market);
    let total_price = yes + no;
    let spread = derive_spread(market, total_price);
    let closed = market.get("closed").and_then(Value::as_bool) == Some(true);
    let active = !closed && market.get("active").and_then(Value::as_bool) != Some(false);

    MarketSummary {
        id: str_field(market, &["id", "conditionId"]).unwrap_or_default(),
        slug: str_field(market, &["slug"]).unwrap_or_default(),
        title: str_field(market, &["question", "title"]).unwrap_or_else(|| "Unknown".into()),
        category: classifier.classify_market(market),
        price_yes: round1(yes),
        price_no: round1(no),
        total_price: round1(total_price),
        spread: round2(spread),
        liquidity: num_field(market, &["liquidity"]),
        volume: num_field(market, &["volume"]),
        volume24h: num_field(market, &["volume24hr", "volume24h"]),
        end_date: str_field(market, &["endDate", "endDateIso"]),
        active,
        closed,
    }
}

/// Summarizes raw markets, drops rows with no usable title, and sorts by
/// 24h volume descending.
pub fn process(raw: &[Value], classifier: &Classifier) -> Vec<MarketSummary> {
    let mut valid: Vec<MarketSummary> = raw
        .iter()
        .map(|m| summarize(m, classifier))
        .filter(|m| m.title != "Unknown")
        .collect();
    valid.sort_by(|a, b| b.volume24h.total_cmp(&a.volume24h));
    valid
}

/// Aggregate listing stats, including per-category buckets for all seven
/// categories (zero-initialized so the payload shape is stable).
pub fn aggregate_stats(markets: &[MarketSummary]) -> MarketStats {
    let mut cat_stats: BTreeMap<&'static str, CategoryStats> = ALL_CATEGORIES
        .iter()
        .map(|c| (*c, CategoryStats::default()))
        .collect();

    let mut total_volume = 0.0;
    let mut volume24h = 0.0;
    let mut total_liquidity = 0.0;
    let mut spread_sum = 0.0;
    let mut active_count = 0usize;

    for m in markets {
        total_volume += m.volume;
        volume24h += m.volume24h;
        if m.active {
            active_count += 1;
            total_liquidity += m.liquidity;
            spread_sum += m.spread.abs();
        }
        if let Some(bucket) = cat_stats.get_mut(m.category) {
            bucket.count += 1;
            bucket.volume += m.volume;
            bucket.volume24h += m.volume24h;
            bucket.liquidity += m.liquidity;
        }
    }

    MarketStats {
        total_markets: markets.len(),
        active_markets: active_count,
        closed_markets: markets.len() - active_count,
        total_volume,
        volume24h,
        total_liquidity,
        avg_spread: if active_count > 0 {
            spread_sum / active_count as f64
        } else {
            0.0
        },
        cat_stats,
    }
}

/// Runs every configured market-listing pass (open markets, then top
/// closed markets by volume) and concatenates the raw pages.
pub async fn fetch_all(http: &reqwest::Client, config: &AppConfig) -> Vec<Value> {
    let mut all = Vec::new();
    for pass in &config.market_passes {
        let page = fetch::paginate(
            http,
            &config.markets_url,
            pass.extra_query,
            &pass.policy,
            config.fetch_timeout,
            config.user_agent,
        )
        .await;
        tracing::debug!("markets pass {}: {} raw markets", pass.name, page.len());
        all.extend(page);
    }
    all
}
