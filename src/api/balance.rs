use alloy_primitives::{Address, U256};
use alloy_sol_types::{SolCall, sol};
use serde::Deserialize;
use serde_json::json;

use super::config::RpcConfig;

sol! {
    function balanceOf(address owner) returns (uint256);
}

/// USDC uses 6 decimals on Polygon.
const USDC_SCALE: f64 = 1e6;

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
}

fn decode_balance(result: &str) -> Option<U256> {
    let hex_body = result.strip_prefix("0x")?;
    if hex_body.is_empty() || result == "0x0" {
        return None;
    }
    U256::from_str_radix(hex_body, 16).ok()
}

async fn eth_call_balance(
    http: &reqwest::Client,
    rpc_url: &str,
    contract: &str,
    calldata: &str,
    timeout: std::time::Duration,
) -> Option<U256> {
    let payload = json!({
        "jsonrpc": "2.0",
        "method": "eth_call",
        "params": [{"to": contract, "data": calldata}, "latest"],
        "id": 1
    });

    let resp = http
        .post(rpc_url)
        .json(&payload)
        .timeout(timeout)
        .send()
        .await
        .ok()?;
    if !resp.status().is_success() {
        return None;
    }
    let body: RpcResponse = resp.json().await.ok()?;
    decode_balance(body.result.as_deref()?)
}

/// Scales a raw 6-decimal balance to whole USDC. Balances beyond u128 are
/// upstream garbage; saturate rather than panic.
fn to_usdc(raw: U256) -> f64 {
    u128::try_from(raw).unwrap_or(u128::MAX) as f64 / USDC_SCALE
}

/// ABI-encoded `balanceOf(address)` calldata for the given holder.
pub fn balance_of_calldata(holder: Address) -> String {
    let call = balanceOfCall { owner: holder };
    format!("0x{}", hex::encode(call.abi_encode()))
}

/// Reads the address's USDC balance by direct contract call, summing the
/// token variants in the config. For each contract the RPC endpoints are
/// tried in order until one answers with a decodable result; every failure
/// is swallowed and total failure yields 0.0, never an error.
pub async fn usdc_balance(
    http: &reqwest::Client,
    rpc: &RpcConfig,
    address: &str,
    timeout: std::time::Duration,
) -> f64 {
    let holder: Address = match address.parse() {
        Ok(a) => a,
        Err(_) => return 0.0,
    };
    let calldata = balance_of_calldata(holder);

    let mut total = 0.0;
    for contract in &rpc.token_contracts {
        for rpc_url in &rpc.endpoints {
            match eth_call_balance(http, rpc_url, contract, &calldata, timeout).await {
                Some(raw) => {
                    let balance = to_usdc(raw);
                    if balance > 0.0 {
                        total += balance;
                    }
                    break;
                }
                None => {
                    tracing::debug!("balanceOf via {rpc_url} for {contract} failed, trying next");
                }
            }
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calldata_is_selector_plus_padded_address() {
        let holder: Address = "0x1111111111111111111111111111111111111111"
            .parse()
            .unwrap();
        let data = balance_of_calldata(holder);
        // 4-byte balanceOf selector + 32-byte left-padded address
        assert!(data.starts_with("0x70a08231"));
        assert_eq!(data.len(), 2 + 8 + 64);
        assert!(data.ends_with(&"11".repeat(20)));
        assert!(data[10..34].chars().all(|c| c == '0'));
    }

    #[test]
    fn balance_decoding() {
        assert_eq!(decode_balance("0x"), None);
        assert_eq!(decode_balance("0x0"), None);
        let raw = decode_balance(
            "0x00000000000000000000000000000000000000000000000000000000000f4240",
        )
        .unwrap();
        assert_eq!(to_usdc(raw), 1.0);
        assert_eq!(decode_balance("not hex"), None);
    }
}
