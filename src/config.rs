use crate::logic::ResolverOptions;
use crate::model::DefinitionKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub access_token: Option<String>,
    pub include_cookies: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub kind: DefinitionKind,
    pub address: Option<String>,
    pub detect_cycles: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_secs: 30,
            access_token: None,
            include_cookies: false,
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            kind: DefinitionKind::Particle,
            address: None,
            detect_cycles: true,
        }
    }
}

impl ResolverConfig {
    pub fn options(&self) -> ResolverOptions {
        ResolverOptions {
            kind: self.kind,
            address: self
                .address
                .clone()
                .filter(|address| !address.trim().is_empty()),
            detect_cycles: self.detect_cycles,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional config file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("particle-resolver").required(false));

        // Add environment variables with prefix "PTR_", nested keys split on "__"
        config = config.add_source(
            config::Environment::with_prefix("PTR")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }
}
