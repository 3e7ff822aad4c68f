use serde_json::Value;

use super::config::AppConfig;
use super::dedup::{self, DedupSet};
use super::fetch;
use super::normalize::{amount_field, classify_trade, num_field, record_timestamp_ms, str_field};
use super::types::HistoryEntry;

/// Title aliases for a history record, most-specific first. `conditionId`
/// is an identifier, not a title, but beats "Unknown" for display.
const MARKET_ALIASES: &[&str] = &["title", "marketSlug", "market", "question", "conditionId"];

fn normalize_record(record: &Value, source: &'static str) -> HistoryEntry {
    let trade_kind = classify_trade(record);
    HistoryEntry {
        id: str_field(record, &["id"]),
        kind: trade_kind.as_str(),
        market: str_field(record, MARKET_ALIASES).unwrap_or_else(|| "Unknown".into()),
        outcome: str_field(record, &["outcome", "outcomeName"]).unwrap_or_default(),
        amount: amount_field(record),
        price: num_field(record, &["price"]),
        profit: num_field(record, &["profit", "pnl"]),
        timestamp: record_timestamp_ms(record),
        source,
        trade_kind,
    }
}

/// Merges the raw result sets of all activity/trade sources into one
/// deduplicated ledger, sorted by timestamp descending (unparseable
/// timestamps sort last).
pub fn merge_history(source_results: Vec<(&'static str, Vec<Value>)>) -> Vec<HistoryEntry> {
    let mut seen = DedupSet::new();
    let mut entries = Vec::new();

    for &(source, ref records) in &source_results {
        for record in records {
            if seen.insert(dedup::history_key(record)) {
                entries.push(normalize_record(record, source));
            }
        }
    }

    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries
}

/// Fetches every activity/trade source to exhaustion (concurrently) and
/// returns the merged ledger. Failed sources contribute nothing.
pub async fn aggregate(
    http: &reqwest::Client,
    config: &AppConfig,
    address: &str,
) -> Vec<HistoryEntry> {
    let fetches = config.activity_sources.iter().map(|source| async move {
        let records =
            fetch::paginate_for_address(http, source, address, config.fetch_timeout, config.user_agent)
                .await;
        (source.name, records)
    });

    let results = futures_util::future::join_all(fetches).await;
    let history = merge_history(results);
    tracing::info!("{address}: {} history entries after dedup", history.len());
    history
}
