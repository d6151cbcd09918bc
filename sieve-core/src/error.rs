// Error types for rule evaluation and validation passes

use thiserror::Error;

/// Fault raised by a rule that could not evaluate its value at all.
///
/// This is distinct from a rejection: a rejection is reported as failure
/// messages and recorded in the error map, a fault aborts the pass.
#[derive(Error, Debug)]
pub enum RuleFault {
    #[error("Rule '{rule}' failed: {message}")]
    Internal { rule: String, message: String },

    #[error("Rule '{rule}' is misconfigured: {message}")]
    Misconfigured { rule: String, message: String },

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl RuleFault {
    pub fn internal(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Internal {
            rule: rule.into(),
            message: message.into(),
        }
    }

    pub fn misconfigured(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Misconfigured {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

/// Error returned when a validation pass cannot complete.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Rule fault at '{path}': {source}")]
    RuleFault {
        path: String,
        #[source]
        source: RuleFault,
    },
}

impl ValidationError {
    /// Dotted path of the rule that aborted the pass.
    pub fn path(&self) -> &str {
        match self {
            ValidationError::RuleFault { path, .. } => path,
        }
    }
}

/// Errors raised while loading message catalogs.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog entry '{0}' is not a string")]
    InvalidEntry(String),
}

pub type Result<T> = std::result::Result<T, ValidationError>;
