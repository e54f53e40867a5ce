// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::LOCATION;
use reqwest::{Client, Response, StatusCode};

use crate::error::{AppError, Result};
use crate::models::HttpConfig;
use crate::utils::url::resolve_location;

/// Create the shared asynchronous HTTP client.
///
/// Automatic redirects are disabled: the feed fetch and the poster cache
/// follow redirects themselves with an explicit hop limit.
pub fn create_async_client(config: &HttpConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    Ok(client)
}

/// Whether `status` is a redirect that carries a `Location` to follow.
pub fn is_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

/// GET `url`, following at most `max_redirects` redirects.
///
/// Returns the final response only when it is a 200. A redirect without a
/// usable `Location` header is treated as a terminal non-200 response.
/// `timeout` overrides the client timeout for every hop.
pub async fn get_following_redirects(
    client: &Client,
    url: &str,
    max_redirects: usize,
    timeout: Option<Duration>,
) -> Result<Response> {
    let mut current = url.to_string();

    for hop in 0..=max_redirects {
        let mut request = client.get(&current);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;
        let status = response.status();

        if is_redirect(status) {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            if let Some(location) = location {
                let next = resolve_location(&current, &location)?;
                log::debug!("Redirect {} ({}): {} -> {}", hop + 1, status, current, next);
                current = next;
                continue;
            }
        }

        if status != StatusCode::OK {
            return Err(AppError::http_status(current, status.as_u16()));
        }
        return Ok(response);
    }

    Err(AppError::TooManyRedirects {
        url: url.to_string(),
        hops: max_redirects,
    })
}
