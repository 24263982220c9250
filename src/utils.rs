//! Helper functions shared by the outbound HTTP clients

/// Turns a non-2xx response into an error carrying the status and body
pub async fn ensure_success(
    response: reqwest::Response,
    what: &str,
) -> anyhow::Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());

    anyhow::bail!("{} returned error status {}: {}", what, status, body)
}
