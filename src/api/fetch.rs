use std::time::Duration;

use serde_json::Value;

use super::config::{PagePolicy, Source};

/// Fetches one page of records and unwraps the common envelope shapes:
/// a bare array, or an object carrying the array under `positions`/`data`.
/// Any network, status, or parse failure yields `None` so the caller can
/// retry or abandon the source without failing the request.
async fn fetch_page(
    http: &reqwest::Client,
    url: &str,
    timeout: Duration,
    user_agent: &str,
) -> Option<Vec<Value>> {
    let resp = http
        .get(url)
        .header("Accept", "application/json")
        .header("User-Agent", user_agent)
        .timeout(timeout)
        .send()
        .await
        .ok()?;

    if !resp.status().is_success() {
        return None;
    }

    let body: Value = resp.json().await.ok()?;
    Some(match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("positions").or_else(|| map.remove("data")) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    })
}

/// Paginates one source to exhaustion: advances `offset` by `page_size`
/// until a short page, the `max_offset` ceiling, or `max_retries`
/// consecutive page failures. Returns whatever was collected; a failing
/// source never fails the request.
pub async fn paginate(
    http: &reqwest::Client,
    base_url: &str,
    query: &str,
    policy: &PagePolicy,
    timeout: Duration,
    user_agent: &str,
) -> Vec<Value> {
    let mut all = Vec::new();
    let mut offset = 0u32;
    let mut failures = 0u32;
    let sep = if query.is_empty() { "" } else { "&" };

    while offset < policy.max_offset {
        let url = format!(
            "{base_url}?limit={}&offset={offset}{sep}{query}",
            policy.page_size
        );
        let page = match fetch_page(http, &url, timeout, user_agent).await {
            Some(items) => {
                failures = 0;
                items
            }
            None => {
                failures += 1;
                if failures >= policy.max_retries {
                    tracing::warn!("abandoning {base_url} at offset {offset} after {failures} failed attempts");
                    break;
                }
                continue;
            }
        };

        let count = page.len();
        all.extend(page);
        if count < policy.page_size as usize {
            break;
        }
        offset += policy.page_size;
    }

    all
}

/// Paginates an address-keyed source (activity, trades, positions).
pub async fn paginate_for_address(
    http: &reqwest::Client,
    source: &Source,
    address: &str,
    timeout: Duration,
    user_agent: &str,
) -> Vec<Value> {
    let query = format!("{}={address}", source.address_param);
    let records = paginate(http, &source.url, &query, &source.policy, timeout, user_agent).await;
    tracing::debug!("{}: {} records for {address}", source.name, records.len());
    records
}
