use serde::{Deserialize, Serialize};

/// Largest page size `GET /account/{address}` accepts.
pub const MAX_ACCOUNT_PAGE_LIMIT: usize = 256;

pub const DEFAULT_ACCOUNT_PAGE_LIMIT: usize = 10;

/// One page of the resources owned by an address.
///
/// Every category is paged with the same `page`/`limit`, so the lists can
/// run out at different pages. Totals count the whole category.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccountPage {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub owned_features: Vec<String>,
    #[serde(default)]
    pub owned_transformations: Vec<String>,
    #[serde(default)]
    pub owned_conditions: Vec<String>,
    #[serde(default)]
    pub owned_particles: Vec<String>,
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub total_features: usize,
    #[serde(default)]
    pub total_transformations: usize,
    #[serde(default)]
    pub total_conditions: usize,
    #[serde(default)]
    pub total_particles: usize,
}

impl AccountPage {
    /// Pages needed to list the largest category.
    pub fn total_pages(&self) -> usize {
        if self.limit == 0 {
            return 0;
        }

        [
            self.total_features,
            self.total_transformations,
            self.total_conditions,
            self.total_particles,
        ]
        .into_iter()
        .map(|total| total.div_ceil(self.limit))
        .max()
        .unwrap_or(0)
    }

    pub fn has_next_page(&self) -> bool {
        self.page + 1 < self.total_pages()
    }

    pub fn is_empty(&self) -> bool {
        self.owned_features.is_empty()
            && self.owned_transformations.is_empty()
            && self.owned_conditions.is_empty()
            && self.owned_particles.is_empty()
    }
}
