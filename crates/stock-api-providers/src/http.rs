use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode, Url};

use crate::error::UpstreamError;

/// Seconds to wait when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

pub(crate) fn parse_base_url(raw: &str) -> Result<Url, UpstreamError> {
    let url = Url::parse(raw)
        .map_err(|e| UpstreamError::Config(format!("invalid base URL '{raw}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(UpstreamError::Config(format!("invalid base URL '{raw}'")));
    }
    Ok(url)
}

/// Append path segments to `base`, each percent-encoded as a single segment.
/// A symbol containing `/` or `?` stays one segment of the vendor path.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Send a request, turning timeouts and non-success statuses into `UpstreamError`.
pub(crate) async fn send_checked(
    request: RequestBuilder,
    timeout: Duration,
) -> Result<Response, UpstreamError> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            UpstreamError::Timeout {
                timeout_secs: timeout.as_secs(),
            }
        } else {
            UpstreamError::Http(e)
        }
    })?;

    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return Err(UpstreamError::RateLimited {
            retry_after_secs: retry_after,
        });
    }

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(UpstreamError::Api {
            status,
            message: body,
        });
    }

    Ok(response)
}
