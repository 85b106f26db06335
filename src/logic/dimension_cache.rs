use crate::catalog::DefinitionSource;
use crate::error::CatalogError;
use log::debug;
use std::collections::HashMap;

/// Per-pass memo of feature dimension counts, keyed by feature name.
#[derive(Debug, Default)]
pub struct FeatureDimensionCache {
    entries: HashMap<String, usize>,
}

impl FeatureDimensionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimension count of `feature_name`, fetched at most once per name.
    ///
    /// A missing or blank name is `0` and never touches the source or the
    /// cache. A failed fetch leaves the cache unchanged.
    pub async fn dimensions_of<S: DefinitionSource + ?Sized>(
        &mut self,
        source: &S,
        feature_name: Option<&str>,
    ) -> Result<usize, CatalogError> {
        let Some(feature_name) = feature_name.map(str::trim).filter(|name| !name.is_empty()) else {
            return Ok(0);
        };

        if let Some(count) = self.entries.get(feature_name) {
            return Ok(*count);
        }

        let count = source.fetch_dimension_count(feature_name).await?;
        debug!("Feature {} has {} dimensions", feature_name, count);
        self.entries.insert(feature_name.to_string(), count);
        Ok(count)
    }

    pub fn get(&self, feature_name: &str) -> Option<usize> {
        self.entries.get(feature_name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
