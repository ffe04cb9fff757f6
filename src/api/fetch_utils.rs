//! Request sending with status mapping, JSON decoding and retries for GETs

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

use crate::constants::retry::{INITIAL_BACKOFF_MS, MAX_RETRIES};
use crate::error::AppError;

/// Sends an idempotent request, retrying transient failures with exponential
/// backoff, then decodes the JSON body.
///
/// A failure is retried when [`AppError::is_retryable`] says so. `Retry-After`
/// is honoured when the server sends it. Requests whose body cannot be cloned
/// are sent once.
#[instrument(skip(request))]
pub(super) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    url: &str,
) -> Result<T, AppError> {
    let mut attempt = 0u32;
    let mut backoff = Duration::from_millis(INITIAL_BACKOFF_MS);

    loop {
        let Some(this_attempt) = request.try_clone() else {
            let response = check_status(send(request, url).await?, url)?;
            return read_json(response, url).await;
        };

        let (result, server_wait) = match this_attempt.send().await {
            Ok(resp) => {
                let wait = retry_after(&resp);
                (check_status(resp, url), wait)
            }
            Err(e) => (Err(map_send_error(e, url)), None),
        };

        match result {
            Ok(response) => return read_json(response, url).await,
            Err(e) if e.is_retryable() && attempt < MAX_RETRIES => {
                let wait = server_wait.unwrap_or(backoff);
                warn!(
                    "{}. Retrying in {:?} (attempt {}/{})",
                    e,
                    wait,
                    attempt + 1,
                    MAX_RETRIES
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
                backoff = backoff.saturating_mul(2);
            }
            Err(e) => return Err(e),
        }
    }
}

/// Sends a non-idempotent request exactly once and decodes the JSON body.
#[instrument(skip(request))]
pub(super) async fn post_json<T: DeserializeOwned>(
    request: RequestBuilder,
    url: &str,
) -> Result<T, AppError> {
    let response = check_status(send(request, url).await?, url)?;
    read_json(response, url).await
}

async fn send(request: RequestBuilder, url: &str) -> Result<Response, AppError> {
    request.send().await.map_err(|e| map_send_error(e, url))
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn map_send_error(e: reqwest::Error, url: &str) -> AppError {
    warn!("Request failed for URL {}: {}", url, e);
    if e.is_timeout() {
        AppError::network_timeout(url)
    } else if e.is_connect() {
        AppError::network_connection(url, e.to_string())
    } else {
        AppError::ApiFetch(e)
    }
}

fn check_status(response: Response, url: &str) -> Result<Response, AppError> {
    let status = response.status();
    debug!("Response status: {status}");
    if status.is_success() {
        Ok(response)
    } else {
        warn!("HTTP {} (URL: {})", status, url);
        Err(error_for_status(status, url))
    }
}

async fn read_json<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, AppError> {
    let body = response.text().await.map_err(|e| {
        error!("Failed to read response text from URL {}: {}", url, e);
        AppError::ApiFetch(e)
    })?;
    debug!("Response length: {} bytes", body.len());

    parse_body(&body, url)
}

/// Maps a non-success HTTP status to a specific error type.
pub(super) fn error_for_status(status: StatusCode, url: &str) -> AppError {
    let status_code = status.as_u16();
    let reason = status.canonical_reason().unwrap_or("Unknown error");

    match status_code {
        404 => AppError::api_not_found(url),
        429 => AppError::api_rate_limit(reason, url),
        400..=499 => AppError::api_client_error(status_code, reason, url),
        502 | 503 => AppError::api_service_unavailable(status_code, reason, url),
        _ => AppError::api_server_error(status_code, reason, url),
    }
}

/// Decodes a response body, telling empty bodies, non-JSON and unexpected shapes apart.
pub(super) fn parse_body<T: DeserializeOwned>(body: &str, url: &str) -> Result<T, AppError> {
    serde_json::from_str::<T>(body).map_err(|e| {
        error!("Failed to parse API response: {} (URL: {})", e, url);
        let trimmed = body.trim_start();
        if trimmed.is_empty() {
            AppError::api_no_data("Response body is empty", url)
        } else if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
            AppError::api_malformed_json("Response is not valid JSON", url)
        } else {
            AppError::api_unexpected_structure(e.to_string(), url)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;
    use serde::Deserialize;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    #[derive(Debug, Deserialize)]
    struct Payload {
        id: u64,
    }

    const URL: &str = "https://api.example.com/thing";

    #[test]
    fn test_error_for_status_mapping() {
        assert!(matches!(
            error_for_status(StatusCode::NOT_FOUND, URL),
            AppError::ApiNotFound { .. }
        ));
        assert!(matches!(
            error_for_status(StatusCode::TOO_MANY_REQUESTS, URL),
            AppError::ApiRateLimit { .. }
        ));
        assert!(matches!(
            error_for_status(StatusCode::FORBIDDEN, URL),
            AppError::ApiClientError { status: 403, .. }
        ));
        assert!(matches!(
            error_for_status(StatusCode::BAD_GATEWAY, URL),
            AppError::ApiServiceUnavailable { status: 502, .. }
        ));
        assert!(matches!(
            error_for_status(StatusCode::INTERNAL_SERVER_ERROR, URL),
            AppError::ApiServerError { status: 500, .. }
        ));
    }

    #[test]
    fn test_parse_body_success() {
        let payload: Payload = parse_body(r#"{"id": 42}"#, URL).unwrap();
        assert_eq!(payload.id, 42);
    }

    #[test]
    fn test_parse_body_classifies_failures() {
        assert!(matches!(
            parse_body::<Payload>("   ", URL),
            Err(AppError::ApiNoData { .. })
        ));
        assert!(matches!(
            parse_body::<Payload>("<html>Bad Gateway</html>", URL),
            Err(AppError::ApiMalformedJson { .. })
        ));
        assert!(matches!(
            parse_body::<Payload>(r#"{"name": "poll"}"#, URL),
            Err(AppError::ApiUnexpectedStructure { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_json_retries_after_rate_limit() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/thing"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/thing"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id": 7}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/thing", mock_server.uri());
        let payload: Payload = get_json(Client::new().get(&url), &url).await.unwrap();

        assert_eq!(payload.id, 7);
    }

    #[tokio::test]
    async fn test_get_json_gives_up_after_max_retries() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/thing"))
            .respond_with(ResponseTemplate::new(503).insert_header("Retry-After", "0"))
            .expect(u64::from(MAX_RETRIES) + 1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/thing", mock_server.uri());
        let result = get_json::<Payload>(Client::new().get(&url), &url).await;

        assert!(matches!(
            result,
            Err(AppError::ApiServiceUnavailable { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_get_json_does_not_retry_client_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/thing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/thing", mock_server.uri());
        let result = get_json::<Payload>(Client::new().get(&url), &url).await;

        assert!(matches!(result, Err(AppError::ApiNotFound { .. })));
    }

    #[tokio::test]
    async fn test_post_json_is_sent_once() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/thing"))
            .respond_with(ResponseTemplate::new(503).insert_header("Retry-After", "0"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/thing", mock_server.uri());
        let result = post_json::<Payload>(Client::new().post(&url).body("{}"), &url).await;

        assert!(matches!(
            result,
            Err(AppError::ApiServiceUnavailable { status: 503, .. })
        ));
    }
}
