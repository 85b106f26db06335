pub mod catalog;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;

// Export catalog types
pub use catalog::{
    CatalogClient, CatalogRequest, CatalogResponse, CredentialsMode, DefinitionSource,
    HttpTransport, LoginHandler, MessageSigner, NonceLogin, ReqwestTransport, TokenStore,
};

// Export error types
pub use error::{CatalogError, ResolveError};

// Export logic types
pub use logic::{
    extract_composite_names, is_scalar, CompositeRefs, ExecutionPlanner,
    FeatureDimensionCache, ResolvedTree, ResolverOptions, RunningInstanceStore, TreeResolver,
};

// Export all model types
pub use model::*;

/// Builds a planner backed by the reqwest transport from loaded configuration.
pub fn build_planner(config: &crate::config::AppConfig) -> anyhow::Result<ExecutionPlanner> {
    use anyhow::Context;
    use std::sync::Arc;

    let client = CatalogClient::from_config(&config.catalog)
        .context("Failed to create catalog client")?;

    Ok(ExecutionPlanner::new(
        Arc::new(client),
        config.resolver.options(),
    ))
}
