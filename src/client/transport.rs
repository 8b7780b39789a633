use crate::client::HttpClientConfig;
use crate::resilience::TimeoutExt;
use crate::{Error, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// A fully read HTTP response
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,
    /// Status code of the final response
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Whether the publisher refused or lost the resource outright
    #[must_use]
    pub const fn is_not_found_or_forbidden(&self) -> bool {
        matches!(self.status, 403 | 404)
    }

    /// Body decoded as text, replacing invalid sequences
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Something that can issue a redirect-following GET with the batch's
/// shared header set.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchedPage>;
}

impl std::fmt::Debug for dyn Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Transport")
    }
}

/// `reqwest` backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    request_timeout: Duration,
}

impl HttpTransport {
    /// Create a transport with the given configuration
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value("user_agent", &config.user_agent)?);
        headers.insert(ACCEPT, header_value("accept", &config.accept)?);
        headers.insert(
            ACCEPT_LANGUAGE,
            header_value("accept_language", &config.accept_language)?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            request_timeout: config.request_timeout(),
        })
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::from_request(url, e))?;

        let final_url = response.url().to_string();
        let status = response.status().as_u16();
        let headers = response.headers().clone();

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::from_request(url, e))?;
            body.extend_from_slice(&chunk);
        }

        debug!(
            "GET {} -> {} ({} bytes from {})",
            url,
            status,
            body.len(),
            final_url
        );

        Ok(FetchedPage {
            url: final_url,
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<FetchedPage> {
        self.fetch(url)
            .with_timeout_duration(self.request_timeout)
            .await?
    }
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| Error::InvalidInput {
        field: field.to_string(),
        reason: format!("invalid header value: {e}"),
    })
}
