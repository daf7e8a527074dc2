// src/http.rs
//! Shared reqwest plumbing for the Oura and Notion clients: client builder,
//! bounded retries with exponential backoff, and status-to-error mapping.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::HttpPolicy;
use crate::error::SyncError;

const USER_AGENT: &str = concat!("oura-notion-sync/", env!("CARGO_PKG_VERSION"));

/// Longest response body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

pub fn build_client(policy: &HttpPolicy) -> Result<Client, SyncError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(policy.timeout)
        .timeout(policy.timeout)
        .build()
        .map_err(SyncError::HttpClient)
}

/// Whether a request may be sent again after an ambiguous failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retry {
    Transient,
    Never,
}

pub fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Send the request built by `build`, retrying transport errors, 429 and 5xx
/// up to `policy.retries` extra times. Non-success responses that are not
/// retried become `SyncError::Status` with the (truncated) body.
pub async fn send<F>(
    policy: &HttpPolicy,
    retry: Retry,
    service: &'static str,
    operation: &str,
    build: F,
) -> Result<Response, SyncError>
where
    F: Fn() -> RequestBuilder,
{
    let max_retries = match retry {
        Retry::Transient => policy.retries,
        Retry::Never => 0,
    };

    let mut attempt: u8 = 0;
    loop {
        match build().send().await {
            Ok(rsp) if rsp.status().is_success() => return Ok(rsp),
            Ok(rsp) => {
                let status = rsp.status();
                if is_transient(status) && attempt < max_retries {
                    attempt += 1;
                    tracing::warn!(
                        service,
                        operation,
                        status = status.as_u16(),
                        attempt,
                        "transient HTTP status, retrying"
                    );
                    tokio::time::sleep(policy.backoff_for(attempt)).await;
                    continue;
                }
                let body = rsp.text().await.unwrap_or_default();
                return Err(SyncError::Status {
                    service,
                    operation: operation.to_string(),
                    status: status.as_u16(),
                    body: truncate(body.trim()),
                });
            }
            Err(e) => {
                if attempt < max_retries {
                    attempt += 1;
                    tracing::warn!(
                        service,
                        operation,
                        error = %e,
                        attempt,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(policy.backoff_for(attempt)).await;
                    continue;
                }
                return Err(SyncError::Transport {
                    service,
                    operation: operation.to_string(),
                    source: e,
                });
            }
        }
    }
}

/// `send` followed by JSON decoding of the body.
pub async fn send_json<T, F>(
    policy: &HttpPolicy,
    retry: Retry,
    service: &'static str,
    operation: &str,
    build: F,
) -> Result<T, SyncError>
where
    T: DeserializeOwned,
    F: Fn() -> RequestBuilder,
{
    let rsp = send(policy, retry, service, operation, build).await?;
    rsp.json::<T>().await.map_err(|source| SyncError::Decode {
        service,
        operation: operation.to_string(),
        source,
    })
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_statuses() {
        assert!(is_transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient(StatusCode::BAD_GATEWAY));
        assert!(is_transient(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_transient(StatusCode::BAD_REQUEST));
        assert!(!is_transient(StatusCode::UNAUTHORIZED));
        assert!(!is_transient(StatusCode::NOT_FOUND));
    }

    #[test]
    fn long_bodies_are_cut_on_char_boundary() {
        let body = "é".repeat(400);
        let out = truncate(&body);
        assert!(out.ends_with('…'));
        assert!(out.len() <= MAX_ERROR_BODY + '…'.len_utf8());
        assert_eq!(truncate("short"), "short");
    }
}
