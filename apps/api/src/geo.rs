//! Client geolocation for background job searches.

use axum::http::HeaderMap;
use serde::Deserialize;
use std::net::IpAddr;
use tracing::debug;

const GEO_LOOKUP_URL: &str = "http://ip-api.com/json";

/// First hop of `X-Forwarded-For`, if present and parseable.
pub fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}

#[derive(Debug, Deserialize)]
struct GeoLookup {
    status: String,
    country: Option<String>,
}

/// Resolves the client's country for the job search. Any failure, from a
/// missing header to an unreachable lookup service, falls back to `default`.
pub async fn resolve_region(client: &reqwest::Client, ip: Option<IpAddr>, default: &str) -> String {
    let Some(ip) = ip else {
        return default.to_string();
    };
    match lookup_country(client, ip).await {
        Some(country) => country,
        None => {
            debug!(%ip, "geolocation lookup failed, using default region");
            default.to_string()
        }
    }
}

async fn lookup_country(client: &reqwest::Client, ip: IpAddr) -> Option<String> {
    let url = format!("{GEO_LOOKUP_URL}/{ip}?fields=status,country");
    let response = client
        .get(&url)
        .timeout(std::time::Duration::from_secs(5))
        .send()
        .await
        .ok()?;
    let lookup: GeoLookup = response.json().await.ok()?;
    if lookup.status == "success" {
        lookup.country
    } else {
        None
    }
}
