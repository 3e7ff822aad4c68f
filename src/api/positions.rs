use serde_json::Value;

use super::config::{AppConfig, EstimationPolicy};
use super::dedup::{self, DedupSet};
use super::fetch;
use super::normalize::{num_field, str_field};
use super::types::PositionSummary;

/// Derives the valuation of one raw position. Explicit fields win;
/// otherwise `size × price` for current value and `size × avgPrice` for
/// cost basis; as a last resort the cost basis is estimated as a fixed
/// fraction of current value and flagged as such.
fn normalize_position(record: &Value, policy: &EstimationPolicy) -> PositionSummary {
    let size = num_field(record, &["size", "amount", "shares"]);
    let price = num_field(record, &["price", "curPrice", "currentPrice", "outcomePrice"]);
    let avg_price = num_field(record, &["avgPrice", "averagePrice", "avgCost"]);

    let mut current = num_field(record, &["currentValue", "value", "marketValue"]);
    if current == 0.0 && size > 0.0 && price > 0.0 {
        current = size * price;
    }

    let mut invested_estimated = false;
    let mut invested = num_field(record, &["initialValue", "cost", "invested", "cashBalance"]);
    if invested == 0.0 && size > 0.0 && avg_price > 0.0 {
        invested = size * avg_price;
    }
    if invested == 0.0 && current > 0.0 {
        invested = current * policy.invested_fraction;
        invested_estimated = true;
    }

    // Some sources report a P&L figure without any valuation fields;
    // with no valuation of our own, take theirs.
    let pnl = if current == 0.0 && invested == 0.0 {
        num_field(record, &["pnl", "cashPnl", "realizedPnl"])
    } else {
        current - invested
    };

    PositionSummary {
        market: str_field(record, &["conditionId", "marketId", "id"]).unwrap_or_default(),
        title: str_field(record, &["title", "marketSlug", "market", "question"])
            .unwrap_or_default(),
        outcome: str_field(record, &["outcome", "outcomeName"]).unwrap_or_default(),
        size,
        current_value: current,
        invested_amount: invested,
        pnl,
        invested_estimated,
    }
}

/// Merges position result sets from all sources, deduplicating on market
/// identity + outcome (first-seen wins).
pub fn merge_positions(source_results: Vec<Vec<Value>>, policy: &EstimationPolicy) -> Vec<PositionSummary> {
    let mut seen = DedupSet::new();
    let mut positions = Vec::new();

    for records in &source_results {
        for record in records {
            if seen.insert(dedup::position_key(record)) {
                positions.push(normalize_position(record, policy));
            }
        }
    }

    positions
}

/// Fetches positions from every source concurrently and merges them.
pub async fn aggregate(
    http: &reqwest::Client,
    config: &AppConfig,
    address: &str,
) -> Vec<PositionSummary> {
    let fetches = config.position_sources.iter().map(|source| {
        fetch::paginate_for_address(http, source, address, config.fetch_timeout, config.user_agent)
    });

    let results = futures_util::future::join_all(fetches).await;
    let positions = merge_positions(results, &config.estimation);
    tracing::info!("{address}: {} positions after dedup", positions.len());
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn policy() -> EstimationPolicy {
        EstimationPolicy {
            fallback_win_rate: 45,
            invested_fraction: 0.8,
            portfolio_fraction: 0.3,
            win_threshold: 0.5,
        }
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn explicit_values_win_over_derivation() {
        let p = normalize_position(
            &json!({"conditionId": "0xc", "outcome": "Yes", "size": "10", "currentValue": 7.0, "initialValue": 5.0, "price": 0.9}),
            &policy(),
        );
        assert!(approx_eq(p.current_value, 7.0));
        assert!(approx_eq(p.invested_amount, 5.0));
        assert!(approx_eq(p.pnl, 2.0));
        assert!(!p.invested_estimated);
    }

    #[test]
    fn valuation_derives_from_size_and_prices() {
        let p = normalize_position(
            &json!({"size": 100, "curPrice": 0.6, "avgPrice": 0.4}),
            &policy(),
        );
        assert!(approx_eq(p.current_value, 60.0));
        assert!(approx_eq(p.invested_amount, 40.0));
        assert!(!p.invested_estimated);
    }

    #[test]
    fn cost_basis_fallback_is_flagged_estimated() {
        let p = normalize_position(&json!({"size": 50, "currentPrice": 0.5}), &policy());
        assert!(approx_eq(p.current_value, 25.0));
        assert!(approx_eq(p.invested_amount, 20.0));
        assert!(p.invested_estimated);
        // unrealizedPnl = currentValue - investedAmount, exactly
        assert!(approx_eq(p.pnl, p.current_value - p.invested_amount));
    }

    #[test]
    fn raw_pnl_used_when_valuation_is_empty() {
        let p = normalize_position(&json!({"conditionId": "0xc", "outcome": "Yes", "pnl": "3.2"}), &policy());
        assert!(approx_eq(p.current_value, 0.0));
        assert!(approx_eq(p.invested_amount, 0.0));
        assert!(approx_eq(p.pnl, 3.2));
    }

    #[test]
    fn duplicate_outcomes_across_sources_merge() {
        let a = json!({"conditionId": "0xc", "outcome": "Yes", "size": 10, "curPrice": 0.5});
        let b = json!({"conditionId": "0xc", "outcome": "Yes", "size": 99, "curPrice": 0.9});
        let c = json!({"conditionId": "0xc", "outcome": "No", "size": 3, "curPrice": 0.5});
        let merged = merge_positions(vec![vec![a], vec![b, c]], &policy());
        assert_eq!(merged.len(), 2);
        // first-seen wins
        assert!(approx_eq(merged[0].size, 10.0));
    }
}
