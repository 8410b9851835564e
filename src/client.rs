use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, header};
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::responder::Responder;
use crate::types::{ChatRequest, ChatResponse, Message, Reply};

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://loreal.bbarnet6.workers.dev/";

/// HTTP responder that POSTs the transcript to a fixed endpoint.
///
/// No timeout applies unless one is configured; the transport's own behavior
/// decides how long a request may take.
#[derive(Clone)]
pub struct Relay {
    client: ReqwestClient,
    endpoint: Url,
    timeout: Option<Duration>,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl Relay {
    /// Create a relay for the given endpoint.
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_options(endpoint, None)
    }

    /// Create a relay with an optional request timeout.
    pub fn with_options(endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::validation(
                format!("unsupported endpoint scheme: {}", endpoint.scheme()),
                Some("endpoint".to_string()),
            ));
        }

        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;

        Ok(Self {
            client,
            endpoint,
            timeout,
            logger: None,
        })
    }

    /// Attach a diagnostic logger.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The configured request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Send the transcript and parse the response body.
    ///
    /// Non-success status codes and network failures are transport errors.
    /// The response is returned unclassified; see [`ChatResponse::into_reply`].
    pub async fn send(&self, messages: &[Message]) -> Result<ChatResponse> {
        CLIENT_REQUESTS.click();
        if let Some(logger) = &self.logger {
            logger.log_request(self.endpoint.as_str(), messages);
        }

        let start = Instant::now();
        let result = self.exchange(messages).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if let Err(err) = &result {
            if err.is_transport() {
                CLIENT_REQUEST_ERRORS.click();
            }
        }
        result
    }

    async fn exchange(&self, messages: &[Message]) -> Result<ChatResponse> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(self.default_headers())
            .json(&ChatRequest::new(messages))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    let message = match self.timeout {
                        Some(timeout) => {
                            format!("request timed out after {} seconds", timeout.as_secs_f64())
                        }
                        None => "request timed out".to_string(),
                    };
                    Error::transport(message, Some(Box::new(e)))
                } else if e.is_connect() {
                    Error::transport(format!("connection error: {}", e), Some(Box::new(e)))
                } else {
                    Error::transport(format!("request failed: {}", e), Some(Box::new(e)))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            Error::transport(
                format!("failed to read response body: {}", e),
                Some(Box::new(e)),
            )
        })?;

        if !status.is_success() {
            return Err(Error::status(status.as_u16(), body));
        }

        let parsed = ChatResponse::parse(&body)?;
        if let Some(logger) = &self.logger {
            logger.log_response(status.as_u16(), &parsed);
        }
        Ok(parsed)
    }
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

#[async_trait::async_trait]
impl Responder for Relay {
    async fn respond(&self, messages: &[Message]) -> Result<Reply> {
        self.send(messages).await?.into_reply()
    }
}
