//! Error types for the phenotype legend
//!
//! Provides error handling for:
//! - Identifier validation (re-exported from `phenotype-term`)
//! - Terminology lookups (never propagated past the resolution worker)
//! - Legend configuration

use phenotype_term::TermError;

/// Errors reported by a terminology resolver
///
/// The worker logs these; a failed lookup leaves the term unresolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Terminology source could not be reached
    #[error("terminology source unavailable: {0}")]
    Unavailable(String),

    /// Terminology source returned data that could not be read
    #[error("malformed terminology data: {0}")]
    Malformed(String),
}

/// Errors in legend configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Configuration text could not be parsed
    #[error("failed to parse legend config: {0}")]
    Parse(String),

    /// A configured value is out of bounds
    #[error("invalid legend config field '{field}': {message}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        message: String,
    },
}

impl ConfigError {
    /// Create invalid field error
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Combined legend error
#[derive(Debug, thiserror::Error)]
pub enum LegendError {
    /// Identifier could not be normalized
    #[error("term error: {0}")]
    Term(#[from] TermError),

    /// Configuration rejected
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl LegendError {
    /// Check if the caller supplied a malformed identifier
    #[inline]
    #[must_use]
    pub fn is_invalid_identifier(&self) -> bool {
        matches!(self, Self::Term(TermError::InvalidIdentifier { .. }))
    }
}

/// Result type alias for legend operations
pub type LegendResult<T> = Result<T, LegendError>;
