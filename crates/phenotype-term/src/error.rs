//! Error types for term identities
//!
//! Only synchronous input validation is surfaced as an error. Anything that
//! happens after a placeholder is handed out (late or missing names) is not
//! an error at this layer.

use crate::id::TermType;

/// Errors raised while turning caller input into a canonical identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TermError {
    /// Raw identifier does not match the rules of its term type
    #[error("invalid {term_type} identifier '{raw}': {reason}")]
    InvalidIdentifier {
        /// Term type the identifier was normalized for
        term_type: TermType,
        /// Raw input as supplied by the caller
        raw: String,
        /// Which rule was violated
        reason: String,
    },
}

impl TermError {
    /// Create invalid identifier error
    pub fn invalid(term_type: TermType, raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            term_type,
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// Raw input that failed validation
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::InvalidIdentifier { raw, .. } => raw,
        }
    }
}

/// Result type alias for term operations
pub type TermResult<T> = Result<T, TermError>;
