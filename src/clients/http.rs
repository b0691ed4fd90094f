use async_trait::async_trait;
use http::StatusCode;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use rquest::{Client, RequestBuilder, Response};
use rquest_util::Emulation;
use std::time::Duration;
use tracing::{debug, error};

use crate::clients::PageFetcher;
use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::utils::retry_with_backoff;

const EMULATION_NAMES: [&str; 4] = ["chrome", "firefox", "safari", "edge"];

fn emulation_for(name: &str) -> Result<Emulation> {
    match name.trim().to_ascii_lowercase().as_str() {
        "chrome" => Ok(Emulation::Chrome133),
        "firefox" => Ok(Emulation::Firefox136),
        "safari" => Ok(Emulation::Safari18_3),
        "edge" => Ok(Emulation::Edge134),
        _ => Err(Error::Validation {
            parameter: "emulation",
            value: name.to_string(),
            allowed: EMULATION_NAMES.join(", "),
        }),
    }
}

/// rquest-backed fetcher for listing and detail pages.
pub struct HttpClient {
    client: Client,
    headers: HeaderMap,
    timeout: Duration,
    max_retries: u32,
    retry_base_delay_ms: u64,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();

        for (key, value) in config.headers.iter() {
            if let (Ok(header_name), Ok(header_value)) = (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(header_name, header_value);
                debug!(header_key = key, header_value = value, "Adding header");
            } else {
                error!(header_key = key, header_value = value, "Invalid header value");
            }
        }

        let emulation = emulation_for(&config.emulation)?;
        debug!(emulation = ?emulation, "Creating client with emulation");

        let client = Client::builder().emulation(emulation).build()?;

        Ok(Self {
            client,
            headers,
            timeout: config.timeout(),
            max_retries: config.max_retries,
            retry_base_delay_ms: config.retry_base_delay_ms,
        })
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let mut request = self.client.get(url);
        for (key, value) in self.headers.iter() {
            request = request.header(key, value);
        }
        request
    }

    async fn send(&self, url: &str) -> Result<Response> {
        let response = tokio::time::timeout(self.timeout, self.get(url).send())
            .await
            .map_err(|_| Error::Timeout(self.timeout.as_secs()))??;

        debug!(status = response.status().as_u16(), url = url, "Response received");

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimit),
            StatusCode::FORBIDDEN => Err(Error::Forbidden),
            status if !status.is_success() => Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }),
            _ => Ok(response),
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        let response = self.send(url).await?;
        let body = tokio::time::timeout(self.timeout, response.text())
            .await
            .map_err(|_| Error::Timeout(self.timeout.as_secs()))??;
        Ok(body)
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<String> {
        retry_with_backoff(self.max_retries, self.retry_base_delay_ms, || async {
            self.fetch_once(url).await
        })
        .await
    }
}
