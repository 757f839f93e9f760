use thiserror::Error;

/// Result type for resolver operations
pub type Result<T> = std::result::Result<T, ResolverError>;

/// Failures that escape the resolver; everything else is reported as data.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// The asset root itself cannot be listed
    #[error("Asset root is not accessible: {0}")]
    AssetRoot(#[source] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Tree layer error
    #[error(transparent)]
    Tree(#[from] jobfiles_tree::TreeError),
}

impl ResolverError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
