//! HTTP fetcher for the source page.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while fetching the source page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(e)
        }
    }
}

/// Build the HTTP client used for scraping
pub fn build_client(timeout_secs: u64, user_agent: &str) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .build()
}

/// Fetch page HTML. No retries: a failure ends the refresh.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus(status.as_u16()));
    }

    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> reqwest::Client {
        build_client(5, "release-radar-test").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wiki/2024_in_video_games"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&mock_server)
            .await;

        let url = format!("{}/wiki/2024_in_video_games", mock_server.uri());
        let html = fetch_page(&client(), &url).await.unwrap();
        assert_eq!(html, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_fetch_http_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let result = fetch_page(&client(), &mock_server.uri()).await;
        assert!(matches!(result, Err(FetchError::HttpStatus(404))));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&mock_server)
            .await;

        let client = build_client(1, "release-radar-test").unwrap();
        let result = fetch_page(&client, &mock_server.uri()).await;
        assert!(matches!(result, Err(FetchError::Timeout)));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let result = fetch_page(&client(), "http://127.0.0.1:9/").await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }
}
