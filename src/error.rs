use thiserror::Error;

/// Failures raised while talking to the catalog service.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Failed to fetch {name}: HTTP {status}")]
    Status { name: String, status: u16 },

    #[error("Invalid response for {name}: {message}")]
    Decode { name: String, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}

/// Failures raised by a resolution pass or by edits on a resolved tree.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Error fetching {name}: {source}")]
    Fetch {
        name: String,
        #[source]
        source: CatalogError,
    },

    #[error("Root name is required")]
    EmptyRootName,

    #[error("Reference cycle detected: {chain}")]
    Cycle { name: String, chain: String },

    #[error("Resolution of {root} was cancelled")]
    Cancelled { root: String },

    #[error("No node with id {0}")]
    UnknownNode(usize),

    #[error("Invalid samples count '{0}': expected an integer between 0 and {max}", max = crate::model::MAX_SAMPLES_COUNT)]
    InvalidSamplesCount(String),

    #[error("No resolved tree is loaded")]
    NothingLoaded,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ResolveError {
    /// Wraps a catalog failure with the name that was being fetched.
    pub fn fetch(name: impl Into<String>, source: CatalogError) -> Self {
        Self::Fetch {
            name: name.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
