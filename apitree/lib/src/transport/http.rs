//! `reqwest`-backed transport.

use std::time::Duration;

use apitree_define::RestMethod;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::Transport;
use crate::error::TransportError;
use crate::request::RequestDescriptor;
use crate::response::RawResponse;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Builder for configuring an [`HttpTransport`].
#[derive(Debug)]
pub struct HttpTransportBuilder {
    timeout: Duration,
    default_headers: HeaderMap,
    pool_max_idle_per_host: usize,
}

impl HttpTransportBuilder {
    fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_headers: HeaderMap::new(),
            pool_max_idle_per_host: 10,
        }
    }

    /// Sets the request timeout.
    ///
    /// ## Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use apitree::HttpTransport;
    ///
    /// let transport = HttpTransport::builder()
    ///     .timeout(Duration::from_secs(60))
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a header sent with every request, below any composed header.
    ///
    /// ## Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, TransportError> {
        let (name, value) = header_pair(name.as_ref(), value.as_ref())?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Caps idle pooled connections per host.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Builds the [`HttpTransport`].
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<HttpTransport, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(self.default_headers)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .build()?;

        Ok(HttpTransport { client })
    }
}

/// HTTP transport over a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::new()
    }

    /// Creates a transport with default settings.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, TransportError> {
        Self::builder().build()
    }

    /// The underlying client, for fetching descriptions.
    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError> {
        let mut headers = HeaderMap::new();
        for (name, value) in request.headers() {
            let (name, value) = header_pair(name, value)?;
            headers.insert(name, value);
        }

        let mut builder = self
            .client
            .request(to_reqwest(request.method()), request.url().clone())
            .headers(headers);
        if let Some(body) = request.body() {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await?;

        Ok(RawResponse::new(status, headers, body))
    }
}

fn to_reqwest(method: RestMethod) -> reqwest::Method {
    match method {
        RestMethod::Get => reqwest::Method::GET,
        RestMethod::Head => reqwest::Method::HEAD,
        RestMethod::Post => reqwest::Method::POST,
        RestMethod::Put => reqwest::Method::PUT,
        RestMethod::Patch => reqwest::Method::PATCH,
        RestMethod::Delete => reqwest::Method::DELETE,
        RestMethod::Options => reqwest::Method::OPTIONS,
    }
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), TransportError> {
    let header_name =
        HeaderName::try_from(name).map_err(|e| TransportError::InvalidHeader {
            name: name.to_string(),
            message: e.to_string(),
        })?;
    let header_value =
        HeaderValue::try_from(value).map_err(|e| TransportError::InvalidHeader {
            name: name.to_string(),
            message: e.to_string(),
        })?;
    Ok((header_name, header_value))
}
