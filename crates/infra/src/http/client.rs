use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use optiq_core::Transport;
use optiq_domain::constants::{CONTENT_TYPE_JSON, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_USER_AGENT};
use optiq_domain::{FetchError, HttpSettings, Method, OptiqError, RequestDescriptor};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client as ReqwestClient, Url};
use serde_json::Value;
use tracing::debug;

use crate::errors::{client_build_error, IntoFetchError};

/// JSON-over-HTTP transport backed by reqwest.
///
/// Performs exactly one attempt per [`Transport::send`]; the coordinator
/// owns retries and per-attempt timeouts.
#[derive(Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
    base_url: Option<Url>,
    default_headers: HeaderMap,
}

impl HttpTransport {
    /// Start building a new HTTP transport.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, OptiqError> {
        Self::builder().build()
    }

    /// Transport configured from the `[http]` config section.
    pub fn from_settings(settings: &HttpSettings) -> Result<Self, OptiqError> {
        let mut builder = Self::builder()
            .connect_timeout(settings.connect_timeout)
            .user_agent(settings.user_agent.clone())
            .default_headers(settings.default_headers.clone());
        if let Some(base_url) = &settings.base_url {
            builder = builder.base_url(base_url.clone());
        }
        builder.build()
    }

    /// Absolute URL for `url`, joined onto the base URL when relative.
    pub fn resolve_url(&self, url: &str) -> Result<Url, FetchError> {
        if let Ok(absolute) = Url::parse(url) {
            return Ok(absolute);
        }

        let Some(base) = &self.base_url else {
            return Err(FetchError::network(format!(
                "Relative URL '{url}' requires a configured base_url"
            )));
        };

        let joined =
            format!("{}/{}", base.as_str().trim_end_matches('/'), url.trim_start_matches('/'));
        Url::parse(&joined)
            .map_err(|err| FetchError::network(format!("Invalid request URL '{joined}': {err}")))
    }

    fn headers_for(&self, request: &RequestDescriptor) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        for (name, value) in &self.default_headers {
            headers.insert(name.clone(), value.clone());
        }
        for (name, value) in &request.headers {
            let (name, value) = parse_header(name, value).map_err(FetchError::network)?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("default_headers", &self.default_headers.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<Value, FetchError> {
        let url = self.resolve_url(&request.url)?;
        let method = to_reqwest_method(request.method);
        let headers = self.headers_for(request)?;

        let mut builder = self.client.request(method.clone(), url.clone()).headers(headers);
        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body)
                .map_err(|err| FetchError::decode(format!("Failed to encode request body: {err}")))?;
            builder = builder.body(bytes);
        }

        debug!(%method, %url, "sending HTTP request");
        let response = builder.send().await.map_err(|err| {
            debug!(%method, %url, error = %err, "HTTP request failed");
            err.into_fetch_error()
        })?;

        let status = response.status();
        debug!(%method, %url, %status, "received HTTP response");

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown");
            return Err(FetchError::http_status(status.as_u16(), reason));
        }

        let bytes = response.bytes().await.map_err(IntoFetchError::into_fetch_error)?;
        decode_body(&bytes)
    }
}

/// Decode a success body; an empty body decodes to `null`.
fn decode_body(bytes: &[u8]) -> Result<Value, FetchError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes)
        .map_err(|err| FetchError::decode(format!("Invalid JSON response: {err}")))
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), String> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|err| format!("Invalid header name '{name}': {err}"))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|err| format!("Invalid value for header '{name}': {err}"))?;
    Ok((header_name, header_value))
}

/// Builder for [`HttpTransport`].
#[derive(Debug)]
pub struct HttpTransportBuilder {
    base_url: Option<String>,
    connect_timeout: Duration,
    user_agent: String,
    default_headers: BTreeMap<String, String>,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_headers: BTreeMap::new(),
        }
    }
}

impl HttpTransportBuilder {
    /// Prefix for relative request URLs.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Headers sent with every request; per-request headers win.
    pub fn default_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.default_headers = headers;
        self
    }

    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> Result<HttpTransport, OptiqError> {
        let base_url = self
            .base_url
            .map(|raw| {
                Url::parse(&raw)
                    .map_err(|err| OptiqError::Config(format!("Invalid base_url '{raw}': {err}")))
            })
            .transpose()?;

        let mut default_headers = HeaderMap::new();
        for (name, value) in &self.default_headers {
            let (name, value) = parse_header(name, value).map_err(OptiqError::Config)?;
            default_headers.insert(name, value);
        }

        let client = ReqwestClient::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent)
            .no_proxy()
            .build()
            .map_err(|err| client_build_error(&err))?;

        Ok(HttpTransport { client, base_url, default_headers })
    }
}
