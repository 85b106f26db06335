use crate::error::CatalogError;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Whether cookies may travel with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialsMode {
    /// Strip any `Cookie` header before sending.
    #[default]
    Omit,
    /// Forward caller-supplied `Cookie` headers.
    Include,
}

/// A request to the catalog service, independent of the HTTP library.
#[derive(Debug, Clone)]
pub struct CatalogRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
    pub credentials: CredentialsMode,
}

impl CatalogRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            credentials: CredentialsMode::Omit,
        }
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: HeaderMap::new(),
            body: Some(body),
            credentials: CredentialsMode::Omit,
        }
    }

    pub fn with_header(mut self, name: reqwest::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_credentials(mut self, credentials: CredentialsMode) -> Self {
        self.credentials = credentials;
        self
    }

    /// Headers that actually go on the wire for this request.
    pub fn outgoing_headers(&self) -> HeaderMap {
        let mut headers = self.headers.clone();
        if self.credentials == CredentialsMode::Omit {
            headers.remove(COOKIE);
        }
        headers
    }
}

/// Status and raw body of a catalog response.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogResponse {
    pub status: StatusCode,
    pub body: String,
}

impl CatalogResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decodes the body as JSON; `name` identifies the lookup in the error.
    pub fn json<T: DeserializeOwned>(&self, name: &str) -> Result<T, CatalogError> {
        serde_json::from_str(&self.body).map_err(|e| CatalogError::Decode {
            name: name.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    /// Performs one request. Non-success statuses are returned, not raised.
    async fn execute(&self, request: &CatalogRequest) -> Result<CatalogResponse, CatalogError>;
}

#[async_trait::async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn execute(&self, request: &CatalogRequest) -> Result<CatalogResponse, CatalogError> {
        (**self).execute(request).await
    }
}

/// `HttpTransport` backed by reqwest. The client keeps no cookie store.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Transport {
                url: String::new(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &CatalogRequest) -> Result<CatalogResponse, CatalogError> {
        let transport_error = |e: reqwest::Error| CatalogError::Transport {
            url: request.url.clone(),
            message: e.to_string(),
        };

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.outgoing_headers());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        Ok(CatalogResponse { status, body })
    }
}
