use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Unknown availability: {0}")]
    UnknownAvailability(String),

    #[error("Missing pricing: {0}")]
    MissingPricing(String),

    #[error("Invalid usage: {field}={value}")]
    InvalidUsage { field: &'static str, value: String },

    #[error("Unknown modifier kind: {0}")]
    UnknownModifierKind(String),

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Modifier source: {0}")]
    Source(String),
}

impl DomainError {
    /// Configuration problems (unknown codes, incomplete rate tables) as
    /// opposed to bad usage data or modifier retrieval failures.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DomainError::UnknownCurrency(_)
                | DomainError::UnknownAvailability(_)
                | DomainError::MissingPricing(_)
        )
    }

    pub(crate) fn invalid_usage(field: &'static str, value: impl ToString) -> Self {
        DomainError::InvalidUsage {
            field,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Infra(#[from] InfraError),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Infra(InfraError::Io(err))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Infra(InfraError::Toml(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Infra(InfraError::Serialization(err))
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

// ── Tests ──────────────────────────────────────────────────────
