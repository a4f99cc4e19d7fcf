use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Workbook decode failed: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("CSV decode failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Precondition not met: {message}")]
    Precondition { message: String },

    #[error("Unresolved {entity} reference: legacy code {legacy_code} has no migrated id")]
    UnresolvedReference {
        entity: &'static str,
        legacy_code: i64,
    },

    #[error("Store rejected batch insert (HTTP {status}): {message}")]
    Store { status: u16, message: String },

    #[error("Store request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl MigrateError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;
