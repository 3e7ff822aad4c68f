use serde::Serialize;

use super::normalize::TradeKind;

/// One normalized, deduplicated entry of the merged activity/trade ledger.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub market: String,
    pub outcome: String,
    pub amount: f64,
    pub price: f64,
    pub profit: f64,
    /// Epoch milliseconds; 0 when the upstream timestamp was unparseable.
    pub timestamp: i64,
    pub source: &'static str,
    #[serde(skip)]
    pub trade_kind: TradeKind,
}

/// A deduplicated position with normalize-or-estimate valuation applied.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSummary {
    pub market: String,
    pub title: String,
    pub outcome: String,
    pub size: f64,
    pub current_value: f64,
    pub invested_amount: f64,
    pub pnl: f64,
    /// True when `investedAmount` came from the fallback fraction rather
    /// than an explicit field or `size × avgPrice`.
    pub invested_estimated: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStats {
    pub usdc_balance: f64,
    pub position_count: usize,
    pub portfolio_value: f64,
    pub portfolio_value_estimated: bool,
    pub invested_amount: f64,
    pub unrealized_pnl: f64,
    pub total_trades: usize,
    pub buy_count: u32,
    pub sell_count: u32,
    pub total_buy_volume: f64,
    pub total_sell_volume: f64,
    pub total_volume: f64,
    pub realized_pnl: f64,
    pub markets_participated: usize,
    pub active_days: usize,
    pub first_trade_date: Option<String>,
    pub last_trade_date: Option<String>,
    pub winning_positions: u32,
    pub losing_positions: u32,
    pub win_rate: u32,
    pub win_rate_estimated: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    pub success: bool,
    pub address: String,
    pub stats: PortfolioStats,
    pub positions: Vec<PositionSummary>,
    pub history: Vec<HistoryEntry>,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureResponse {
    pub success: bool,
    pub error: String,
}

// -- Markets --

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub category: &'static str,
    pub price_yes: f64,
    pub price_no: f64,
    pub total_price: f64,
    pub spread: f64,
    pub liquidity: f64,
    pub volume: f64,
    pub volume24h: f64,
    pub end_date: Option<String>,
    pub active: bool,
    pub closed: bool,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub count: u32,
    pub volume: f64,
    pub volume24h: f64,
    pub liquidity: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStats {
    pub total_markets: usize,
    pub active_markets: usize,
    pub closed_markets: usize,
    pub total_volume: f64,
    pub volume24h: f64,
    pub total_liquidity: f64,
    pub avg_spread: f64,
    pub cat_stats: std::collections::BTreeMap<&'static str, CategoryStats>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketsResponse {
    pub success: bool,
    pub count: usize,
    pub stats: MarketStats,
    pub markets: Vec<MarketSummary>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
