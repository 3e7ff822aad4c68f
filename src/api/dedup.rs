use std::collections::HashSet;

use serde_json::Value;

use super::normalize::str_field;

/// Seen-key set for one aggregation pass. Upstream sources overlap heavily
/// (the mirror API replays the primary's records), so records are merged on
/// a composite identity; first-seen wins. Scoped to a single request, never
/// shared across passes.
#[derive(Default)]
pub struct DedupSet {
    seen: HashSet<String>,
}

impl DedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time a key is offered, false on repeats.
    pub fn insert(&mut self, key: String) -> bool {
        self.seen.insert(key)
    }
}

/// Composite identity of a history record: id + transaction hash +
/// timestamp. When all three are absent the record gets a random nonce in
/// the timestamp slot, so it can never collide — inclusion is preferred
/// over strict dedup for such orphans.
pub fn history_key(record: &Value) -> String {
    let id = str_field(record, &["id"]).unwrap_or_default();
    let tx = str_field(record, &["transactionHash", "txHash"]).unwrap_or_default();
    let ts = record
        .get("timestamp")
        .or_else(|| record.get("createdAt"))
        .filter(|v| !v.is_null())
        .map(|v| v.to_string());

    match ts {
        Some(ts) => format!("{id}-{tx}-{ts}"),
        None if id.is_empty() && tx.is_empty() => {
            let nonce: u64 = rand::random();
            format!("--{nonce}")
        }
        None => format!("{id}-{tx}-"),
    }
}

/// Composite identity of a position: first-present market identifier plus
/// the outcome name.
pub fn position_key(record: &Value) -> String {
    let market = str_field(record, &["conditionId", "marketId", "id"]).unwrap_or_default();
    let outcome = str_field(record, &["outcome", "outcomeName"]).unwrap_or_default();
    format!("{market}-{outcome}")
}
