use std::collections::HashSet;

use chrono::{DateTime, Datelike, Utc};

use super::config::EstimationPolicy;
use super::normalize::TradeKind;
use super::types::{HistoryEntry, PortfolioStats, PositionSummary};

/// Calendar sanity bounds for active-day counting; timestamps outside this
/// window are treated as corrupt and ignored.
const MIN_YEAR: i32 = 2020;
const MAX_YEAR: i32 = 2030;

struct HistoryStats {
    buy_count: u32,
    sell_count: u32,
    total_buy_volume: f64,
    total_sell_volume: f64,
    realized_pnl: f64,
    markets: usize,
    active_days: usize,
    first_date: Option<String>,
    last_date: Option<String>,
}

fn history_stats(history: &[HistoryEntry]) -> HistoryStats {
    let mut stats = HistoryStats {
        buy_count: 0,
        sell_count: 0,
        total_buy_volume: 0.0,
        total_sell_volume: 0.0,
        realized_pnl: 0.0,
        markets: 0,
        active_days: 0,
        first_date: None,
        last_date: None,
    };

    let mut markets: HashSet<&str> = HashSet::new();
    let mut days: HashSet<(i32, u32, u32)> = HashSet::new();
    let mut first_ms = i64::MAX;
    let mut last_ms = i64::MIN;

    for entry in history {
        match entry.trade_kind {
            TradeKind::Sell => {
                stats.sell_count += 1;
                stats.total_sell_volume += entry.amount;
                stats.realized_pnl += entry.profit;
            }
            // Ambiguous trades count as buys for volume purposes.
            TradeKind::Buy | TradeKind::Trade => {
                stats.buy_count += 1;
                stats.total_buy_volume += entry.amount;
            }
        }

        if entry.market != "Unknown" {
            markets.insert(&entry.market);
        }

        if entry.timestamp > 0 {
            if let Some(dt) = DateTime::<Utc>::from_timestamp_millis(entry.timestamp) {
                if (MIN_YEAR..=MAX_YEAR).contains(&dt.year()) {
                    days.insert((dt.year(), dt.month(), dt.day()));
                    if entry.timestamp < first_ms {
                        first_ms = entry.timestamp;
                        stats.first_date = Some(dt.to_rfc3339());
                    }
                    if entry.timestamp > last_ms {
                        last_ms = entry.timestamp;
                        stats.last_date = Some(dt.to_rfc3339());
                    }
                }
            }
        }
    }

    stats.markets = markets.len();
    stats.active_days = days.len();
    stats
}

struct PositionStats {
    current_value: f64,
    invested_amount: f64,
    winning: u32,
    losing: u32,
}

fn position_stats(positions: &[PositionSummary], policy: &EstimationPolicy) -> PositionStats {
    let mut current_value = 0.0;
    let mut invested_amount = 0.0;
    let mut winning = 0u32;
    let mut losing = 0u32;

    for p in positions {
        current_value += p.current_value;
        invested_amount += p.invested_amount;

        // Only positions with some determinable signal enter the win/loss
        // tally; the threshold absorbs rounding noise.
        if p.current_value > 0.0 || p.invested_amount > 0.0 || p.pnl != 0.0 {
            if p.pnl > policy.win_threshold {
                winning += 1;
            } else if p.pnl < -policy.win_threshold {
                losing += 1;
            }
        }
    }

    PositionStats {
        current_value,
        invested_amount,
        winning,
        losing,
    }
}

/// Derives the full stats block from the aggregated ledger and positions.
/// Invariants: `totalVolume = totalBuyVolume + totalSellVolume` and
/// `unrealizedPnl = currentValue − investedAmount` hold exactly. Fallback
/// estimates (portfolio value, win rate) are flagged in the output rather
/// than silently conflated with computed figures.
pub fn compute(
    history: &[HistoryEntry],
    positions: &[PositionSummary],
    usdc_balance: f64,
    policy: &EstimationPolicy,
) -> PortfolioStats {
    let h = history_stats(history);
    let p = position_stats(positions, policy);

    let mut portfolio_value = p.current_value;
    let mut portfolio_value_estimated = false;
    if portfolio_value == 0.0 && !positions.is_empty() {
        portfolio_value = h.total_buy_volume * policy.portfolio_fraction;
        portfolio_value_estimated = true;
    }

    let decided = p.winning + p.losing;
    let (win_rate, win_rate_estimated) = if decided > 0 {
        (
            ((p.winning as f64 / decided as f64) * 100.0).round() as u32,
            false,
        )
    } else if !positions.is_empty() {
        (policy.fallback_win_rate, true)
    } else {
        (0, false)
    };

    PortfolioStats {
        usdc_balance,
        position_count: positions.len(),
        portfolio_value,
        portfolio_value_estimated,
        invested_amount: p.invested_amount,
        unrealized_pnl: p.current_value - p.invested_amount,
        total_trades: history.len(),
        buy_count: h.buy_count,
        sell_count: h.sell_count,
        total_buy_volume: h.total_buy_volume,
        total_sell_volume: h.total_sell_volume,
        total_volume: h.total_buy_volume + h.total_sell_volume,
        realized_pnl: h.realized_pnl,
        markets_participated: h.markets,
        active_days: h.active_days,
        first_trade_date: h.first_date,
        last_trade_date: h.last_date,
        winning_positions: p.winning,
        losing_positions: p.losing,
        win_rate,
        win_rate_estimated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> EstimationPolicy {
        EstimationPolicy {
            fallback_win_rate: 45,
            invested_fraction: 0.8,
            portfolio_fraction: 0.3,
            win_threshold: 0.5,
        }
    }

    fn entry(kind: TradeKind, amount: f64, profit: f64, ts: i64, market: &str) -> HistoryEntry {
        HistoryEntry {
            id: None,
            kind: kind.as_str(),
            market: market.to_string(),
            outcome: String::new(),
            amount,
            price: 0.0,
            profit,
            timestamp: ts,
            source: "activity",
            trade_kind: kind,
        }
    }

    fn position(current: f64, invested: f64) -> PositionSummary {
        PositionSummary {
            market: "0xc".into(),
            title: String::new(),
            outcome: "Yes".into(),
            size: 0.0,
            current_value: current,
            invested_amount: invested,
            pnl: current - invested,
            invested_estimated: false,
        }
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn volume_invariant_holds() {
        let history = vec![
            entry(TradeKind::Buy, 10.0, 0.0, 1_700_000_000_000, "A"),
            entry(TradeKind::Sell, 4.0, 1.5, 1_700_000_100_000, "A"),
            entry(TradeKind::Trade, 6.0, 0.0, 1_700_000_200_000, "B"),
        ];
        let stats = compute(&history, &[], 0.0, &policy());
        assert_eq!(stats.buy_count, 2);
        assert_eq!(stats.sell_count, 1);
        assert!(approx_eq(stats.total_buy_volume, 16.0));
        assert!(approx_eq(stats.total_sell_volume, 4.0));
        assert!(approx_eq(
            stats.total_volume,
            stats.total_buy_volume + stats.total_sell_volume
        ));
        assert!(approx_eq(stats.realized_pnl, 1.5));
        assert_eq!(stats.markets_participated, 2);
    }

    #[test]
    fn unrealized_pnl_is_exact() {
        let positions = vec![position(60.0, 40.0), position(10.0, 25.0)];
        let stats = compute(&[], &positions, 0.0, &policy());
        assert_eq!(stats.unrealized_pnl, 70.0 - 65.0);
        assert_eq!(stats.winning_positions, 1);
        assert_eq!(stats.losing_positions, 1);
        assert_eq!(stats.win_rate, 50);
        assert!(!stats.win_rate_estimated);
    }

    #[test]
    fn win_rate_stays_within_bounds() {
        let positions = vec![position(10.0, 2.0), position(20.0, 3.0)];
        let stats = compute(&[], &positions, 0.0, &policy());
        assert_eq!(stats.win_rate, 100);
        assert!(stats.win_rate <= 100);
    }

    #[test]
    fn neutral_positions_fall_back_to_estimated_rate() {
        // P&L inside the threshold on both sides: no decided positions.
        let positions = vec![position(10.0, 10.2), position(5.0, 4.9)];
        let stats = compute(&[], &positions, 0.0, &policy());
        assert_eq!(stats.winning_positions, 0);
        assert_eq!(stats.losing_positions, 0);
        assert_eq!(stats.win_rate, 45);
        assert!(stats.win_rate_estimated);
    }

    #[test]
    fn empty_inputs_degrade_to_zeros() {
        let stats = compute(&[], &[], 0.0, &policy());
        assert_eq!(stats.total_trades, 0);
        assert_eq!(stats.position_count, 0);
        assert_eq!(stats.win_rate, 0);
        assert!(!stats.win_rate_estimated);
        assert_eq!(stats.first_trade_date, None);
        assert!(stats.total_volume == 0.0);
    }

    #[test]
    fn portfolio_value_estimated_from_buy_volume() {
        let history = vec![entry(TradeKind::Buy, 100.0, 0.0, 1_700_000_000_000, "A")];
        let positions = vec![position(0.0, 0.0)];
        let stats = compute(&history, &positions, 0.0, &policy());
        assert!(approx_eq(stats.portfolio_value, 30.0));
        assert!(stats.portfolio_value_estimated);
    }

    #[test]
    fn corrupt_timestamps_excluded_from_day_span() {
        let history = vec![
            entry(TradeKind::Buy, 1.0, 0.0, 1_700_000_000_000, "A"),
            // year 2286 — outside the sanity window
            entry(TradeKind::Buy, 1.0, 0.0, 9_999_999_999_999, "A"),
            entry(TradeKind::Buy, 1.0, 0.0, 0, "A"),
        ];
        let stats = compute(&history, &[], 0.0, &policy());
        assert_eq!(stats.active_days, 1);
        let first = stats.first_trade_date.unwrap();
        assert!(first.starts_with("2023-11-14"));
        assert_eq!(stats.total_trades, 3);
    }
}
