use crate::error::CatalogError;
use crate::model::DefinitionKind;
use std::sync::Arc;

/// Where the resolver reads remote definitions from.
#[async_trait::async_trait]
pub trait DefinitionSource: Send + Sync {
    /// Fetch the JSON definition of `name`, optionally scoped to an owner address
    async fn fetch_definition(
        &self,
        kind: DefinitionKind,
        name: &str,
        address: Option<&str>,
    ) -> Result<serde_json::Value, CatalogError>;
    /// Number of dimensions declared by a feature
    async fn fetch_dimension_count(&self, feature_name: &str) -> Result<usize, CatalogError>;
}

#[async_trait::async_trait]
impl<S: DefinitionSource + ?Sized> DefinitionSource for Arc<S> {
    async fn fetch_definition(
        &self,
        kind: DefinitionKind,
        name: &str,
        address: Option<&str>,
    ) -> Result<serde_json::Value, CatalogError> {
        (**self).fetch_definition(kind, name, address).await
    }

    async fn fetch_dimension_count(&self, feature_name: &str) -> Result<usize, CatalogError> {
        (**self).fetch_dimension_count(feature_name).await
    }
}

/// Capability invoked by the client after a 401.
///
/// Returns `true` only when a fresh token is now available in the client's
/// `TokenStore`.
#[async_trait::async_trait]
pub trait LoginHandler: Send + Sync {
    async fn attempt_login(&self) -> bool;
}

/// Wallet-side signing used by the nonce login flow.
#[async_trait::async_trait]
pub trait MessageSigner: Send + Sync {
    fn address(&self) -> String;
    async fn sign(&self, message: &str) -> anyhow::Result<String>;
}
