// src/net/client.rs
// =============================================================================
// Fetches pages and assets over HTTP.
//
// Key functionality:
// - One shared reqwest Client (connection pooling, fixed timeout)
// - Immutable per-request headers via RequestOptions
// - Sorts transport failures into a typed FetchError (timeout, DNS, HTTP status)
//
// A non-2xx status is an error for fetch_text / fetch_bytes. Callers that
// need the status of a failing response (uptime checks, benchmarks) use
// send() instead.
// =============================================================================

use reqwest::{Client, Response};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a single request failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("too many redirects")]
    TooManyRedirects,
    #[error("could not resolve hostname")]
    Dns,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for FetchError {
    // DNS failures surface as connect errors mentioning "dns"
    fn from(error: reqwest::Error) -> Self {
        let error_string = error.to_string();

        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_redirect() {
            FetchError::TooManyRedirects
        } else if error.is_connect() {
            if error_string.contains("dns") {
                FetchError::Dns
            } else {
                FetchError::Connect(error_string)
            }
        } else if let Some(status) = error.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Other(error_string)
        }
    }
}

/// Headers and limits for one request.
///
/// Headers live here, never on the shared client.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    user_agent: String,
    headers: Vec<(&'static str, String)>,
    timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    /// Adds one extra header to this request
    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Tightens the timeout below the client-wide one
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

/// The process-wide HTTP client
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let inner = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { inner })
    }

    /// Sends a GET and returns the response whatever its status
    pub async fn send(&self, url: &Url, options: &RequestOptions) -> Result<Response, FetchError> {
        let mut request = self
            .inner
            .get(url.clone())
            .header(reqwest::header::USER_AGENT, options.user_agent.as_str());

        for (name, value) in &options.headers {
            request = request.header(*name, value.as_str());
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        Ok(request.send().await?)
    }

    /// GET a page as text; non-2xx is an error
    pub async fn fetch_text(&self, url: &Url, options: &RequestOptions) -> Result<String, FetchError> {
        let response = self.send_checked(url, options).await?;
        Ok(response.text().await?)
    }

    /// GET raw bytes (assets); non-2xx is an error
    pub async fn fetch_bytes(&self, url: &Url, options: &RequestOptions) -> Result<Vec<u8>, FetchError> {
        let response = self.send_checked(url, options).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn send_checked(&self, url: &Url, options: &RequestOptions) -> Result<Response, FetchError> {
        let response = self.send(url, options).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> HttpClient {
        HttpClient::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_text_sends_per_request_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("user-agent", "sentry-test"))
            .and(header("pragma", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
        let options = RequestOptions::new("sentry-test").with_header("Pragma", "no-cache");
        let body = client().fetch_text(&url, &options).await.unwrap();
        assert_eq!(body, "hello");
    }

    #[tokio::test]
    async fn test_fetch_bytes_reports_status() {
        let server = MockServer::start().await;
        let url = Url::parse(&format!("{}/missing.js", server.uri())).unwrap();

        let result = client().fetch_bytes(&url, &RequestOptions::new("ua")).await;
        assert!(matches!(result, Err(FetchError::Status(404))));
    }

    #[tokio::test]
    async fn test_send_returns_failing_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let response = client().send(&url, &RequestOptions::new("ua")).await.unwrap();
        assert_eq!(response.status().as_u16(), 503);
    }

    #[test]
    fn test_options_do_not_share_headers() {
        let base = RequestOptions::new("ua");
        let tuned = base.clone().with_header("Cache-Control", "no-cache");
        assert!(base.headers.is_empty());
        assert_eq!(tuned.headers.len(), 1);
        assert_eq!(tuned.user_agent(), "ua");
    }
}
