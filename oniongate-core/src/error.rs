//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Malformed or disallowed input
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Uniqueness violation (domain name, proxy address)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Ownership token failed signature verification
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Missing or mismatched ownership token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Domain name not found (or soft-deleted)
    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    /// Record not found
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// Proxy not found
    #[error("Proxy not found: {0}")]
    ProxyNotFound(String),

    /// Per-domain record cap reached
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Seed template is not valid zone-file text
    #[error("Template parse error in zone {zone}: {message}")]
    TemplateParseError { zone: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Filesystem error (templates, zone output)
    #[error("IO error: {0}")]
    IoError(String),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.) is used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added. **
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::ValidationError(_)
            | Self::Conflict(_)
            | Self::InvalidSignature(_)
            | Self::Unauthorized(_)
            | Self::DomainNotFound(_)
            | Self::RecordNotFound(_)
            | Self::ProxyNotFound(_)
            | Self::QuotaExceeded(_)
            | Self::TemplateParseError { .. } => true,
            Self::ConfigError(_)
            | Self::SerializationError(_)
            | Self::StorageError(_)
            | Self::IoError(_) => false,
        }
    }

    /// Stable machine-readable code, matching the serialized `code` tag.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => "ValidationError",
            Self::Conflict(_) => "Conflict",
            Self::InvalidSignature(_) => "InvalidSignature",
            Self::Unauthorized(_) => "Unauthorized",
            Self::DomainNotFound(_) => "DomainNotFound",
            Self::RecordNotFound(_) => "RecordNotFound",
            Self::ProxyNotFound(_) => "ProxyNotFound",
            Self::QuotaExceeded(_) => "QuotaExceeded",
            Self::TemplateParseError { .. } => "TemplateParseError",
            Self::ConfigError(_) => "ConfigError",
            Self::SerializationError(_) => "SerializationError",
            Self::StorageError(_) => "StorageError",
            Self::IoError(_) => "IoError",
        }
    }

    /// Whether this is one of the not-found kinds.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::DomainNotFound(_) | Self::RecordNotFound(_) | Self::ProxyNotFound(_)
        )
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
