use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AlexandriaError>;

/// Error taxonomy for the discovery core.
///
/// Client-recoverable errors (`Validation`, `NotFound`, `InvalidArgument`)
/// carry a structured rejection back to the caller; `IndexUnavailable` and
/// `SchemaDrift` abort the request without crashing the process and are never
/// retried automatically.
#[derive(Debug, Error)]
pub enum AlexandriaError {
    /// An ingestion payload failed validation before any write was attempted.
    #[error("validation failed for field '{field}': {message}")]
    Validation { field: String, message: String },

    /// A lookup (profile or document) missed.
    #[error("not found: {0}")]
    NotFound(String),

    /// The catalog index could not be reached or is not initialized.
    #[error("catalog index unavailable: {0}")]
    IndexUnavailable(String),

    /// A search hit was missing an expected field. Surfaced loudly so
    /// ingestion bugs show up at the first read instead of being papered
    /// over.
    #[error("schema drift: hit '{id}' has no usable field '{field}'")]
    SchemaDrift { id: String, field: String },

    /// A malformed request argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// An internal invariant was broken.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AlexandriaError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AlexandriaError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AlexandriaError::NotFound(message.into())
    }

    pub fn index_unavailable(message: impl Into<String>) -> Self {
        AlexandriaError::IndexUnavailable(message.into())
    }

    pub fn schema_drift(id: impl Into<String>, field: impl Into<String>) -> Self {
        AlexandriaError::SchemaDrift {
            id: id.into(),
            field: field.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        AlexandriaError::InvalidArgument(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        AlexandriaError::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AlexandriaError::Internal(message.into())
    }

    /// True for errors the caller can fix by changing the request.
    ///
    /// Lets an outer layer map outcomes to "request rejected" versus
    /// "service error" without matching every variant.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AlexandriaError::Validation { .. }
                | AlexandriaError::NotFound(_)
                | AlexandriaError::InvalidArgument(_)
        )
    }
}
