use crate::catalog::credentials::TokenStore;
use crate::catalog::traits::{DefinitionSource, LoginHandler};
use crate::catalog::transport::{
    CatalogRequest, CatalogResponse, CredentialsMode, HttpTransport, ReqwestTransport,
};
use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::model::{
    AccountPage, DefinitionKind, ExecuteOutcome, ExecuteRequest, VersionInfo,
    MAX_ACCOUNT_PAGE_LIMIT,
};
use log::{debug, warn};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use std::sync::Arc;
use std::time::Duration;

/// Appends percent-encoded path segments to a base URL, so a segment
/// containing `/`, `?` or `#` stays a single segment.
pub(crate) fn segment_url(base_url: &str, segments: &[&str]) -> Result<Url, CatalogError> {
    let mut url = Url::parse(base_url).map_err(|e| {
        CatalogError::InvalidInput(format!("Invalid catalog URL '{}': {}", base_url, e))
    })?;

    url.path_segments_mut()
        .map_err(|_| {
            CatalogError::InvalidInput(format!("Catalog URL '{}' cannot have a path", base_url))
        })?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// Client for the catalog and execution service.
///
/// Every request goes through [`CatalogClient::send`], which attaches the
/// bearer token and performs at most one retry after a successful login.
pub struct CatalogClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    base_url: String,
    tokens: TokenStore,
    login: Option<Arc<dyn LoginHandler>>,
    credentials: CredentialsMode,
}

impl CatalogClient<ReqwestTransport> {
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.timeout_secs))?;
        let tokens = match &config.access_token {
            Some(token) => TokenStore::with_token(token.clone()),
            None => TokenStore::new(),
        };

        let credentials = if config.include_cookies {
            CredentialsMode::Include
        } else {
            CredentialsMode::Omit
        };

        Ok(Self::new(transport, config.base_url.clone(), tokens).with_credentials(credentials))
    }
}

impl<T: HttpTransport> CatalogClient<T> {
    pub fn new(transport: T, base_url: impl Into<String>, tokens: TokenStore) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            tokens,
            login: None,
            credentials: CredentialsMode::Omit,
        }
    }

    pub fn with_login_handler(mut self, login: Arc<dyn LoginHandler>) -> Self {
        self.login = Some(login);
        self
    }

    /// Cookie policy applied to the requests built by this client's helpers.
    pub fn with_credentials(mut self, credentials: CredentialsMode) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Absolute URL of an endpoint below the base URL.
    pub fn endpoint(&self, segments: &[&str]) -> Result<String, CatalogError> {
        segment_url(&self.base_url, segments).map(String::from)
    }

    /// Sends a request with the current bearer token.
    ///
    /// On 401 the login handler (if any) runs once; when it reports a fresh
    /// token the request is repeated once and that response is returned as
    /// is. Otherwise the original 401 is returned.
    pub async fn send(&self, request: CatalogRequest) -> Result<CatalogResponse, CatalogError> {
        let response = self.transport.execute(&self.authorize(&request)).await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(login) = &self.login else {
            return Ok(response);
        };

        warn!("{} {} returned 401, attempting login", request.method, request.url);
        if !login.attempt_login().await {
            warn!("Login failed, returning original 401 for {}", request.url);
            return Ok(response);
        }

        debug!("Login succeeded, retrying {} {}", request.method, request.url);
        self.transport.execute(&self.authorize(&request)).await
    }

    fn authorize(&self, request: &CatalogRequest) -> CatalogRequest {
        let mut request = request.clone();
        if let Some(token) = self.tokens.get() {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    request.headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("Stored access token is not a valid header value, sending without it"),
            }
        }
        request
    }

    fn get(&self, segments: &[&str]) -> Result<CatalogRequest, CatalogError> {
        Ok(CatalogRequest::get(self.endpoint(segments)?).with_credentials(self.credentials))
    }

    /// `GET /{kind}/{name}` or `GET /{kind}/{name}/{address}`.
    pub async fn fetch_definition(
        &self,
        kind: DefinitionKind,
        name: &str,
        address: Option<&str>,
    ) -> Result<serde_json::Value, CatalogError> {
        if name.trim().is_empty() {
            return Err(CatalogError::InvalidInput(format!("{} name is required", kind)));
        }

        let request = match address.map(str::trim).filter(|a| !a.is_empty()) {
            Some(address) => self.get(&[kind.endpoint(), name, address])?,
            None => self.get(&[kind.endpoint(), name])?,
        };

        debug!("Fetching {} {}", kind, name);
        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(CatalogError::Status {
                name: name.to_string(),
                status: response.status.as_u16(),
            });
        }

        response.json(name)
    }

    /// Number of entries in a feature's `dimensions` array.
    pub async fn fetch_dimension_count(&self, feature_name: &str) -> Result<usize, CatalogError> {
        let feature = self
            .fetch_definition(DefinitionKind::Feature, feature_name, None)
            .await?;

        Ok(feature
            .get("dimensions")
            .and_then(|d| d.as_array())
            .map(|dims| dims.len())
            .unwrap_or(0))
    }

    /// `POST /execute`; any status is passed back to the caller.
    pub async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteOutcome, CatalogError> {
        let body = serde_json::to_value(request).map_err(|e| {
            CatalogError::InvalidInput(format!("Failed to encode execute request: {}", e))
        })?;

        let request = CatalogRequest::post_json(self.endpoint(&["execute"])?, body)
            .with_credentials(self.credentials);
        let response = self.send(request).await?;

        Ok(ExecuteOutcome::from_raw(
            response.status.as_u16(),
            response.body,
        ))
    }

    /// `GET /account/{address}?limit=&page=`, authenticated like every other call.
    pub async fn account_resources(
        &self,
        address: &str,
        limit: usize,
        page: usize,
    ) -> Result<AccountPage, CatalogError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(CatalogError::InvalidInput("Address is required".to_string()));
        }
        if !(1..=MAX_ACCOUNT_PAGE_LIMIT).contains(&limit) {
            return Err(CatalogError::InvalidInput(format!(
                "Page limit {} is outside 1..={}",
                limit, MAX_ACCOUNT_PAGE_LIMIT
            )));
        }

        let mut url = segment_url(&self.base_url, &["account", address])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("page", &page.to_string());

        debug!("Listing resources of {} (page {}, limit {})", address, page, limit);
        let request = CatalogRequest::get(url).with_credentials(self.credentials);
        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(CatalogError::Status {
                name: address.to_string(),
                status: response.status.as_u16(),
            });
        }

        response.json(address)
    }

    /// `GET /version`.
    pub async fn version(&self) -> Result<VersionInfo, CatalogError> {
        let response = self.send(self.get(&["version"])?).await?;
        if !response.is_success() {
            return Err(CatalogError::Status {
                name: "version".to_string(),
                status: response.status.as_u16(),
            });
        }

        response.json("version")
    }
}

#[async_trait::async_trait]
impl<T: HttpTransport> DefinitionSource for CatalogClient<T> {
    async fn fetch_definition(
        &self,
        kind: DefinitionKind,
        name: &str,
        address: Option<&str>,
    ) -> Result<serde_json::Value, CatalogError> {
        CatalogClient::fetch_definition(self, kind, name, address).await
    }

    async fn fetch_dimension_count(&self, feature_name: &str) -> Result<usize, CatalogError> {
        CatalogClient::fetch_dimension_count(self, feature_name).await
    }
}
