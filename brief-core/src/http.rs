use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::error::FetchError;

/// Upper bound for any single upstream request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("brief/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client with the dashboard's timeout and user agent.
pub fn build_client() -> Result<Client, FetchError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| FetchError::unavailable(format!("failed to build HTTP client: {e}")))
}

/// Send `request` and decode a successful JSON body into `T`.
///
/// `source` names the upstream in failure reasons, e.g. "Open-Meteo forecast".
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    source: &str,
) -> Result<T, FetchError> {
    let res = request.send().await.map_err(|e| {
        tracing::warn!(source, error = %e, "request failed");
        FetchError::from(e)
    })?;

    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        tracing::warn!(source, %status, "upstream returned an error status");
        return Err(FetchError::unavailable(format!(
            "{source} request failed with status {status}: {}",
            truncate_body(&body),
        )));
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::warn!(source, error = %e, "could not parse response");
        FetchError::unavailable(format!("malformed {source} response: {e}"))
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_are_kept() {
        assert_eq!(truncate_body("{\"error\":true}"), "{\"error\":true}");
    }

    #[test]
    fn long_bodies_are_cut_on_char_boundaries() {
        let body = "é".repeat(300);
        let cut = truncate_body(&body);

        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }
}
