use serde_json::Value;

/// Reads a numeric field that may appear under any of several aliases
/// (most-specific first), as a JSON number or a stringified number.
/// The first alias parsing to a finite non-zero value wins; parse failures
/// count as absent, not as errors.
pub fn num_field(record: &Value, aliases: &[&str]) -> f64 {
    for key in aliases {
        let n = match record.get(key) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        };
        if n.is_finite() && n != 0.0 {
            return n;
        }
    }
    0.0
}

/// Reads a string field under the first alias holding a non-empty string.
pub fn str_field(record: &Value, aliases: &[&str]) -> Option<String> {
    for key in aliases {
        if let Some(Value::String(s)) = record.get(key) {
            if !s.is_empty() {
                return Some(s.clone());
            }
        }
    }
    None
}

/// Monetary amount of a record: explicit USD-ish fields first, then
/// `|size × price|` as a derived estimate (price defaults to 1 when
/// absent). Best-effort coverage over correctness.
pub fn amount_field(record: &Value) -> f64 {
    let explicit = num_field(record, &["usdcSize", "value", "amount"]);
    if explicit != 0.0 {
        return explicit.abs();
    }
    let size = num_field(record, &["size"]);
    if size != 0.0 {
        let price = match num_field(record, &["price"]) {
            p if p != 0.0 => p,
            _ => 1.0,
        };
        return (size * price).abs();
    }
    0.0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TradeKind {
    Buy,
    Sell,
    /// Ambiguous record; counted as buy-like for volume purposes.
    Trade,
}

impl TradeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Trade => "trade",
        }
    }
}

/// Classifies a raw record into buy/sell/trade. Pure function; heuristics
/// applied in priority order: explicit `side`, free-text `type`, free-text
/// `action`, boolean `isBuy`.
pub fn classify_trade(record: &Value) -> TradeKind {
    let side = record
        .get("side")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_uppercase();
    if side == "BUY" || side == "B" {
        return TradeKind::Buy;
    }
    if side == "SELL" || side == "S" {
        return TradeKind::Sell;
    }

    let ty = record
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_lowercase();
    if ty.contains("buy") || ty == "b" || ty == "bid" {
        return TradeKind::Buy;
    }
    if ty.contains("sell") || ty == "s" || ty == "ask" || ty == "redeem" {
        return TradeKind::Sell;
    }

    let action = record
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_lowercase();
    if action.contains("buy") || action == "b" {
        return TradeKind::Buy;
    }
    if action.contains("sell") || action == "s" || action == "redeem" {
        return TradeKind::Sell;
    }

    match record.get("isBuy") {
        Some(Value::Bool(true)) => TradeKind::Buy,
        Some(Value::Bool(false)) => TradeKind::Sell,
        _ => TradeKind::Trade,
    }
}

/// Threshold separating epoch-seconds from epoch-milliseconds.
const MS_THRESHOLD: f64 = 1e12;

/// Normalizes a timestamp value to epoch milliseconds. Numbers under 1e12
/// are taken as seconds and scaled; strings are parsed as RFC 3339 or
/// date-only calendar dates. Unparseable input normalizes to 0, which
/// sorts last in the descending ledger.
pub fn parse_timestamp_ms(ts: &Value) -> i64 {
    match ts {
        Value::Number(n) => {
            let v = n.as_f64().unwrap_or(0.0);
            if !v.is_finite() || v <= 0.0 {
                0
            } else if v > MS_THRESHOLD {
                v as i64
            } else {
                (v * 1000.0) as i64
            }
        }
        Value::String(s) => parse_timestamp_str(s),
        _ => 0,
    }
}

fn parse_timestamp_str(s: &str) -> i64 {
    let s = s.trim();
    if s.is_empty() {
        return 0;
    }
    // Stringified epoch values show up in some sources.
    if let Ok(v) = s.parse::<f64>() {
        return parse_timestamp_ms(&Value::from(v));
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return dt.timestamp_millis();
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or(0);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return dt.and_utc().timestamp_millis();
    }
    0
}

/// Timestamp of a history record, trying the aliases the upstreams use.
pub fn record_timestamp_ms(record: &Value) -> i64 {
    for key in ["timestamp", "createdAt", "time", "blockTimestamp"] {
        if let Some(v) = record.get(key) {
            let ms = parse_timestamp_ms(v);
            if ms != 0 {
                return ms;
            }
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn num_field_prefers_first_nonzero_alias() {
        let rec = json!({"usdcSize": 0, "value": "12.5", "amount": 99});
        assert_eq!(num_field(&rec, &["usdcSize", "value", "amount"]), 12.5);
    }

    #[test]
    fn num_field_treats_garbage_as_absent() {
        let rec = json!({"value": "n/a", "amount": "7"});
        assert_eq!(num_field(&rec, &["value", "amount"]), 7.0);
        assert_eq!(num_field(&json!({}), &["value"]), 0.0);
    }

    #[test]
    fn amount_falls_back_to_size_times_price() {
        let rec = json!({"size": "20", "price": 0.4});
        assert_eq!(amount_field(&rec), 8.0);
        // Negative sizes (redemptions) are reported as magnitudes.
        let rec = json!({"size": -20, "price": 0.4});
        assert_eq!(amount_field(&rec), 8.0);
        // Missing price defaults to 1.
        let rec = json!({"size": 5});
        assert_eq!(amount_field(&rec), 5.0);
    }

    #[test]
    fn classify_priority_order() {
        assert_eq!(classify_trade(&json!({"side": "BUY"})), TradeKind::Buy);
        assert_eq!(classify_trade(&json!({"side": "S"})), TradeKind::Sell);
        assert_eq!(classify_trade(&json!({"type": "ask"})), TradeKind::Sell);
        assert_eq!(classify_trade(&json!({"type": "bid"})), TradeKind::Buy);
        assert_eq!(classify_trade(&json!({"action": "redeem"})), TradeKind::Sell);
        assert_eq!(classify_trade(&json!({"isBuy": false})), TradeKind::Sell);
        assert_eq!(classify_trade(&json!({"isBuy": true})), TradeKind::Buy);
        assert_eq!(classify_trade(&json!({})), TradeKind::Trade);
        // side wins over a contradicting type field
        assert_eq!(
            classify_trade(&json!({"side": "SELL", "type": "buy"})),
            TradeKind::Sell
        );
    }

    #[test]
    fn timestamp_seconds_vs_millis() {
        assert_eq!(parse_timestamp_ms(&json!(1_700_000_000)), 1_700_000_000_000);
        assert_eq!(
            parse_timestamp_ms(&json!(1_700_000_000_000i64)),
            1_700_000_000_000
        );
        assert_eq!(
            parse_timestamp_ms(&json!("2023-11-14T00:00:00Z")),
            1_699_920_000_000
        );
        assert_eq!(parse_timestamp_ms(&json!(null)), 0);
        assert_eq!(parse_timestamp_ms(&json!("not a date")), 0);
    }

    #[test]
    fn record_timestamp_tries_aliases() {
        let rec = json!({"createdAt": 1_700_000_000});
        assert_eq!(record_timestamp_ms(&rec), 1_700_000_000_000);
        assert_eq!(record_timestamp_ms(&json!({})), 0);
    }
}
