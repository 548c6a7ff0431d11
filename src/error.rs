/// Unified error type for configuration, registry, and driver operations
///
/// Driver errors pass through unchanged via the `Mongo` variant; everything
/// else is a failure of this crate's own glue (configuration parsing,
/// registry bookkeeping, connection verification).
#[derive(Debug, thiserror::Error)]
pub enum MongoError {
    /// Errors raised by the underlying driver
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// Connection could not be verified
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Required environment variable is not set
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    /// A configuration value could not be parsed or is unsupported
    #[error("Invalid configuration value for '{key}': {details}")]
    InvalidConfig { key: String, details: String },

    /// A client with the same name was already registered
    #[error("A client named '{0}' is already registered")]
    DuplicateClient(String),

    /// No client registered under the requested name
    #[error("No client named '{0}' is registered")]
    UnknownClient(String),
}

/// Result type alias for all operations in this crate
pub type MongoResult<T> = Result<T, MongoError>;
