use std::sync::LazyLock;

use axum::{Json, extract::Query, extract::State, http::StatusCode, response::IntoResponse};
use regex::Regex;
use serde::Deserialize;

use super::server::AppState;
use super::types::*;
use super::{balance, history, markets, positions, stats};

static ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("address pattern must compile"));

#[derive(Deserialize)]
pub struct LookupParams {
    pub address: Option<String>,
}

/// Per-address portfolio lookup: validates the address, fans out to the
/// position/history/balance collaborators concurrently, and derives the
/// stats block. Upstream failures degrade to empty collections; the only
/// error surfaced here is a malformed address.
pub async fn lookup(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let address = params.address.unwrap_or_default();
    if !is_valid_address(&address) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: "Invalid address".into(),
            }),
        ));
    }
    let address = address.to_lowercase();

    let config = &state.config;
    let (positions, history, usdc_balance) = tokio::join!(
        positions::aggregate(&state.http, config, &address),
        history::aggregate(&state.http, config, &address),
        balance::usdc_balance(&state.http, &config.rpc, &address, config.fetch_timeout),
    );

    let stats = stats::compute(&history, &positions, usdc_balance, &config.estimation);

    let mut positions = positions;
    positions.truncate(config.max_positions_returned);

    Ok(Json(LookupResponse {
        success: true,
        address,
        stats,
        positions,
        history,
    }))
}

/// Market listing: paginates every configured pass, classifies titles into
/// categories, and aggregates listing statistics. Total upstream failure
/// yields an empty (but well-formed) payload, not an error.
pub async fn market_list(State(state): State<AppState>) -> impl IntoResponse {
    let raw = markets::fetch_all(&state.http, &state.config).await;
    let markets = markets::process(&raw, &state.classifier);
    let stats = markets::aggregate_stats(&markets);

    Json(MarketsResponse {
        success: true,
        count: markets.len(),
        stats,
        markets,
    })
}

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Validates a lookup address without touching the network.
pub fn is_valid_address(address: &str) -> bool {
    ADDRESS_RE.is_match(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_validation() {
        assert!(is_valid_address(
            "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"
        ));
        assert!(is_valid_address(&format!("0x{}", "a".repeat(40))));
        assert!(is_valid_address(&format!("0x{}", "A".repeat(40))));

        // wrong length
        assert!(!is_valid_address(&format!("0x{}", "a".repeat(39))));
        assert!(!is_valid_address(&format!("0x{}", "a".repeat(41))));
        // missing prefix
        assert!(!is_valid_address(&"a".repeat(42)));
        // non-hex character
        assert!(!is_valid_address(&format!("0x{}g", "a".repeat(39))));
        assert!(!is_valid_address(""));
    }
}
