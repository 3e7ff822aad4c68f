use std::env;
use std::time::Duration;

/// Pagination bounds for one upstream source. The ceilings are safety caps
/// against runaway upstream pagination, not business limits.
#[derive(Clone, Debug)]
pub struct PagePolicy {
    pub page_size: u32,
    pub max_offset: u32,
    pub max_retries: u32,
}

impl PagePolicy {
    pub const fn new(page_size: u32, max_offset: u32, max_retries: u32) -> Self {
        Self {
            page_size,
            max_offset,
            max_retries,
        }
    }
}

/// One upstream REST endpoint that serves records for an address. Some
/// endpoints take the address as `user`, others as `maker`/`taker`.
#[derive(Clone, Debug)]
pub struct Source {
    pub name: &'static str,
    pub url: String,
    pub address_param: &'static str,
    pub policy: PagePolicy,
}

/// Extra query parameters appended to a market-listing pagination pass.
#[derive(Clone, Debug)]
pub struct MarketPass {
    pub name: &'static str,
    pub extra_query: &'static str,
    pub policy: PagePolicy,
}

/// Heuristic fallbacks applied when upstream data is missing or
/// contradictory. These are best-effort estimates, never ground truth;
/// anything derived from them is flagged `estimated` in the response.
#[derive(Clone, Debug)]
pub struct EstimationPolicy {
    /// Assumed win rate (percent) when positions exist but none has a
    /// determinable P&L.
    pub fallback_win_rate: u32,
    /// Invested amount as a fraction of current value when no cost basis
    /// is available.
    pub invested_fraction: f64,
    /// Portfolio value as a fraction of total buy volume when position
    /// values sum to zero.
    pub portfolio_fraction: f64,
    /// |P&L| below this is neutral, absorbing rounding noise.
    pub win_threshold: f64,
}

/// RPC endpoints and token contracts for the on-chain balance read.
#[derive(Clone, Debug)]
pub struct RpcConfig {
    pub endpoints: Vec<String>,
    /// USDC variants on Polygon (bridged + native); balances are summed.
    pub token_contracts: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub activity_sources: Vec<Source>,
    pub position_sources: Vec<Source>,
    pub market_passes: Vec<MarketPass>,
    pub markets_url: String,
    pub rpc: RpcConfig,
    pub estimation: EstimationPolicy,
    pub fetch_timeout: Duration,
    pub user_agent: &'static str,
    /// Positions returned in the lookup payload are truncated to this many.
    pub max_positions_returned: usize,
}

const DATA_API: &str = "https://data-api.polymarket.com";
const GAMMA_API: &str = "https://gamma-api.polymarket.com";

impl AppConfig {
    /// Builds the config from env vars with production defaults. All former
    /// hard-coded literals (RPC URLs, contracts, pagination ceilings) live
    /// here so they can be overridden and tested independently.
    pub fn from_env() -> Self {
        let data_api = env::var("DATA_API_URL").unwrap_or_else(|_| DATA_API.into());
        let gamma_api = env::var("GAMMA_API_URL").unwrap_or_else(|_| GAMMA_API.into());

        let fallback_win_rate = env::var("FALLBACK_WIN_RATE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(45);

        Self {
            activity_sources: vec![
                Source {
                    name: "activity",
                    url: format!("{data_api}/activity"),
                    address_param: "user",
                    policy: PagePolicy::new(500, 100_000, 3),
                },
                Source {
                    name: "trades",
                    url: format!("{data_api}/trades"),
                    address_param: "user",
                    policy: PagePolicy::new(500, 100_000, 3),
                },
            ],
            position_sources: vec![
                Source {
                    name: "data-positions",
                    url: format!("{data_api}/positions"),
                    address_param: "user",
                    policy: PagePolicy::new(500, 20_000, 3),
                },
                Source {
                    name: "gamma-positions",
                    url: format!("{gamma_api}/positions"),
                    address_param: "user",
                    policy: PagePolicy::new(500, 20_000, 3),
                },
            ],
            market_passes: vec![
                MarketPass {
                    name: "open",
                    extra_query: "closed=false",
                    policy: PagePolicy::new(100, 2_000, 3),
                },
                MarketPass {
                    name: "closed-by-volume",
                    extra_query: "closed=true&order=volume&ascending=false",
                    policy: PagePolicy::new(100, 300, 3),
                },
            ],
            markets_url: format!("{gamma_api}/markets"),
            rpc: RpcConfig {
                endpoints: vec![
                    "https://polygon-rpc.com".into(),
                    "https://rpc.ankr.com/polygon".into(),
                    "https://polygon.llamarpc.com".into(),
                ],
                token_contracts: vec![
                    // USDC.e (bridged)
                    "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174".into(),
                    // USDC (native)
                    "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359".into(),
                ],
            },
            estimation: EstimationPolicy {
                fallback_win_rate,
                invested_fraction: 0.8,
                portfolio_fraction: 0.3,
                win_threshold: 0.5,
            },
            fetch_timeout: Duration::from_secs(6),
            user_agent: "Mozilla/5.0",
            max_positions_returned: 50,
        }
    }
}
