//! Test doubles for the catalog seams.

use crate::catalog::credentials::TokenStore;
use crate::catalog::traits::{DefinitionSource, LoginHandler};
use crate::catalog::transport::{CatalogRequest, CatalogResponse, HttpTransport};
use crate::error::CatalogError;
use crate::model::DefinitionKind;
use parking_lot::Mutex;
use reqwest::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Replays canned `(status, body)` pairs and records every request.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<(u16, String)>>,
    requests: Mutex<Vec<CatalogRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<(u16, &str)>) -> Self {
        Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|(status, body)| (status, body.to_string()))
                    .collect(),
            ),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CatalogRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait::async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: &CatalogRequest) -> Result<CatalogResponse, CatalogError> {
        self.requests.lock().push(CatalogRequest {
            headers: request.outgoing_headers(),
            ..request.clone()
        });

        let Some((status, body)) = self.responses.lock().pop_front() else {
            return Err(CatalogError::Transport {
                url: request.url.clone(),
                message: "no scripted response left".to_string(),
            });
        };

        let status = StatusCode::from_u16(status).map_err(|e| CatalogError::Transport {
            url: request.url.clone(),
            message: e.to_string(),
        })?;
        Ok(CatalogResponse::new(status, body))
    }
}

/// Login handler that either stores a fixed token or refuses.
pub struct StaticLogin {
    grant: Option<(TokenStore, String)>,
    calls: AtomicUsize,
}

impl StaticLogin {
    pub fn granting(tokens: TokenStore, token: &str) -> Self {
        Self {
            grant: Some((tokens, token.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn refusing() -> Self {
        Self {
            grant: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LoginHandler for StaticLogin {
    async fn attempt_login(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.grant {
            Some((tokens, token)) => {
                tokens.set(token.clone());
                true
            }
            None => false,
        }
    }
}

/// Definitions held in memory, keyed by name, with a log of every lookup.
#[derive(Default)]
pub struct InMemoryCatalog {
    definitions: HashMap<String, serde_json::Value>,
    dimensions: HashMap<String, usize>,
    definition_fetches: Mutex<Vec<String>>,
    dimension_fetches: Mutex<Vec<String>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, definition: serde_json::Value) -> Self {
        self.definitions.insert(name.to_string(), definition);
        self
    }

    pub fn with_feature(mut self, name: &str, dimensions: usize) -> Self {
        self.dimensions.insert(name.to_string(), dimensions);
        self
    }

    pub fn definition_fetches(&self) -> Vec<String> {
        self.definition_fetches.lock().clone()
    }

    pub fn dimension_fetches(&self) -> Vec<String> {
        self.dimension_fetches.lock().clone()
    }
}

#[async_trait::async_trait]
impl DefinitionSource for InMemoryCatalog {
    async fn fetch_definition(
        &self,
        _kind: DefinitionKind,
        name: &str,
        _address: Option<&str>,
    ) -> Result<serde_json::Value, CatalogError> {
        self.definition_fetches.lock().push(name.to_string());
        self.definitions
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::Status {
                name: name.to_string(),
                status: 404,
            })
    }

    async fn fetch_dimension_count(&self, feature_name: &str) -> Result<usize, CatalogError> {
        self.dimension_fetches.lock().push(feature_name.to_string());
        self.dimensions
            .get(feature_name)
            .copied()
            .ok_or_else(|| CatalogError::Status {
                name: feature_name.to_string(),
                status: 404,
            })
    }
}
