//! HTTP client for fetching raw module schemas from a SpacetimeDB host.

use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT_SECS: u64 = 5;
/// Raw-schema wire format version served by the host.
const SCHEMA_VERSION: u32 = 9;

fn schema_url(server: &str, port: u16, module: &str) -> String {
    format!("http://{server}:{port}/v1/database/{module}/schema?version={SCHEMA_VERSION}")
}

/// Fetch one module's raw schema JSON.
pub async fn fetch_schema(server: &str, port: u16, module: &str) -> Result<String, String> {
    let url = schema_url(server, port, module);
    debug!(%url, "fetching module schema");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .map_err(|err| format!("Failed to build HTTP client: {err}"))?;

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|err| format!("Failed to reach {url}: {err}"))?;

    if response.status() != StatusCode::OK {
        return Err(format!(
            "Schema request for module '{module}' failed with status {}",
            response.status()
        ));
    }

    response
        .text()
        .await
        .map_err(|err| format!("Failed to read schema response for '{module}': {err}"))
}
